use crate::domain::model::{FetchErrorKind, FetchResponse};
use crate::domain::ports::{HttpSession, Transport};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("blog-views/", env!("CARGO_PKG_VERSION"));

/// Builds one `reqwest::Client` (and so one connection pool) per batch.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

pub struct ReqwestSession {
    client: Client,
}

impl Transport for ReqwestTransport {
    type Session = ReqwestSession;

    fn open_session(&self, timeout: Duration) -> Result<ReqwestSession> {
        // 每個請求的連線與讀取都受 client timeout 限制
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(ReqwestSession { client })
    }
}

#[async_trait]
impl HttpSession for ReqwestSession {
    async fn get(&self, url: &str) -> std::result::Result<FetchResponse, FetchErrorKind> {
        let parsed = Url::parse(url).map_err(|e| FetchErrorKind::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        tracing::debug!("GET {} -> {}", url, status);

        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Timeout
    } else if err.is_builder() {
        FetchErrorKind::InvalidUrl(err.to_string())
    } else {
        FetchErrorKind::Connection(err.to_string())
    }
}
