use crate::domain::model::{FetchErrorKind, FetchResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One connection pool, shared by every request of a single batch.
#[async_trait]
pub trait HttpSession: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<FetchResponse, FetchErrorKind>;
}

/// Opens a fresh session per batch. Dropping the session releases its connections.
pub trait Transport: Send + Sync {
    type Session: HttpSession;

    fn open_session(&self, timeout: Duration) -> Result<Self::Session>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn blog_title(&self) -> &str;
    fn tag_ids(&self) -> &[i64];
    fn excluded_tags(&self) -> &[i64];
    fn upcoming_category_ids(&self) -> &[i64];
}
