use std::future::Future;

use futures::future::join_all;
use thiserror::Error;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("the operation was cancelled")]
    Cancelled,
    #[error("the operation timed out")]
    TimedOut,
}

/// Runs a future until it completes, the token is cancelled or the deadline passes, whichever
///  happens first. Cancellation is checked first so that a cancelled operation never reports
///  a timeout.
pub async fn bounded<F: Future>(future: F, cancel: &CancellationToken, deadline: Option<Instant>) -> Result<F::Output, Interrupted> {
    let expired = async {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted::Cancelled),
        _ = expired => Err(Interrupted::TimedOut),
        output = future => Ok(output),
    }
}

/// Starts all futures concurrently and waits until each of them has an outcome. A future that
///  runs into the deadline yields `TimedOut` in its slot without affecting the others.
///
/// Cancellation affects all outstanding futures and fails the whole fan-out.
pub async fn fan_out<F, T>(futures: impl IntoIterator<Item = F>, cancel: &CancellationToken, deadline: Option<Instant>) -> Result<Vec<Result<T, Interrupted>>, Interrupted>
    where F: Future<Output = T>
{
    let results = join_all(futures.into_iter()
        .map(|f| bounded(f, cancel, deadline))
    ).await;

    if cancel.is_cancelled() {
        return Err(Interrupted::Cancelled);
    }
    Ok(results)
}
