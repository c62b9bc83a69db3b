//! Cancellation plumbing
//!
//! Every wallet prompt and HTTP request of a linking flow runs through
//! `with_cancel`, so a cancelled token stops the flow at its next
//! suspension point instead of letting it finish in the background.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Race `fut` against `cancel`; a fired token wins and yields `Cancelled`.
pub async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> ExchangeResult<T>
where
    F: Future<Output = ExchangeResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(ExchangeError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExchangeError::Cancelled),
        result = fut => result,
    }
}
