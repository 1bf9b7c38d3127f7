pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::http::ReqwestTransport;
pub use crate::adapters::wordpress::{ArticleQuery, UrlBuilder, WordpressApi};
pub use crate::config::BlogConfig;
pub use crate::core::fetch::{fetch_all, fetch_all_blocking, fetch_all_with, DEFAULT_TIMEOUT};
pub use crate::core::views::BlogViews;
pub use crate::domain::model::{
    Context, FetchErrorKind, FetchRequest, FetchResponse, FetchResult, PageMetadata, ResultSet,
};
pub use crate::utils::error::{BlogError, Result};
