use std::{future::Future, time::Duration};

/// Runs a data store call with an upper bound on how long it may take.
/// Running out of time is reported like any other store error.
pub async fn bounded<T, F>(limit: Duration, call: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("Data store call timed out after {:?}", limit)),
    }
}
