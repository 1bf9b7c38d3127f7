pub mod context;
pub mod fetch;
pub mod logic;
pub mod views;

pub use crate::domain::model::{
    Context, FetchErrorKind, FetchRequest, FetchResponse, FetchResult, PageMetadata, ResultSet,
};
pub use crate::domain::ports::{ConfigProvider, HttpSession, Transport};
pub use crate::utils::error::Result;
