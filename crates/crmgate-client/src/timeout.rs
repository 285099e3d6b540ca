//! Request-level timeout handling

use crate::error::{ClientError, ClientResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Run one backend request under `limit`, classifying transport failures
pub async fn execute_with_timeout<F, T>(limit: Duration, operation: F) -> ClientResult<T>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    match timeout(limit, operation).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) if e.is_timeout() => Err(ClientError::Timeout(limit.as_millis() as u64)),
        Ok(Err(e)) if e.is_connect() => Err(ClientError::Connection(e.to_string())),
        Ok(Err(e)) => Err(ClientError::Http(e)),
        Err(_) => Err(ClientError::Timeout(limit.as_millis() as u64)),
    }
}
