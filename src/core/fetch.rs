//! Concurrent fetch aggregator.
//!
//! Every URL of a batch is requested at once over one shared session, and the
//! caller resumes only when all of them have settled. Failures stay in their
//! own slot; the returned [`ResultSet`] is index-aligned with the input.

use crate::adapters::http::ReqwestTransport;
use crate::core::{FetchErrorKind, FetchRequest, FetchResult, HttpSession, ResultSet, Transport};
use crate::utils::error::{BlogError, Result};
use futures::future::join_all;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch every URL concurrently with the reqwest transport.
pub async fn fetch_all<I>(urls: I, timeout: Duration) -> Result<ResultSet>
where
    I: IntoIterator,
    I::Item: Into<FetchRequest>,
{
    fetch_all_with(&ReqwestTransport::default(), urls, timeout).await
}

/// Same as [`fetch_all`] for callers outside an async runtime.
///
/// Runs on a private current-thread runtime that is torn down before
/// returning. Called from inside a tokio runtime it returns a
/// [`BlogError::ValidationError`]; async callers use [`fetch_all`].
pub fn fetch_all_blocking<I>(urls: I, timeout: Duration) -> Result<ResultSet>
where
    I: IntoIterator,
    I::Item: Into<FetchRequest>,
{
    // 已在 runtime 內時 block_on 會 panic
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(BlogError::ValidationError {
            message: "fetch_all_blocking cannot run inside an async runtime; use fetch_all"
                .to_string(),
        });
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(fetch_all(urls, timeout))
}

pub async fn fetch_all_with<T, I>(transport: &T, urls: I, timeout: Duration) -> Result<ResultSet>
where
    T: Transport,
    I: IntoIterator,
    I::Item: Into<FetchRequest>,
{
    let requests: Vec<FetchRequest> = urls.into_iter().map(Into::into).collect();
    // 空輸入不開 session
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    if timeout.is_zero() {
        return Err(BlogError::InvalidConfigValueError {
            field: "timeout".to_string(),
            value: format!("{:?}", timeout),
            reason: "Timeout must be greater than zero".to_string(),
        });
    }

    let started = Instant::now();
    tracing::debug!("Fetching {} URLs concurrently", requests.len());

    // 一批請求共用一個 session，回傳前釋放
    let session = transport.open_session(timeout)?;
    let results = join_all(
        requests
            .iter()
            .map(|request| fetch_one(&session, request, timeout)),
    )
    .await;
    drop(session);

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    tracing::debug!(
        "Fetched {} URLs in {:?} ({} failed)",
        results.len(),
        started.elapsed(),
        failed
    );

    Ok(results)
}

async fn fetch_one<S: HttpSession>(
    session: &S,
    request: &FetchRequest,
    timeout: Duration,
) -> FetchResult {
    let outcome = match tokio::time::timeout(timeout, session.get(&request.url)).await {
        Ok(Ok(response)) if (200..300).contains(&response.status) => Ok(response),
        Ok(Ok(response)) => Err(FetchErrorKind::HttpStatus(response.status)),
        Ok(Err(kind)) => Err(kind),
        Err(_) => Err(FetchErrorKind::Timeout),
    };

    if let Err(kind) = &outcome {
        tracing::warn!("GET {} failed: {}", request.url, kind);
    }

    FetchResult {
        url: request.url.clone(),
        outcome,
    }
}
