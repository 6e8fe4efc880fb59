//! Timeout enforcement.
//!
//! Every control-plane call runs under a deadline. A call that outlives it is
//! abandoned and reported as [`DeadlineExceeded`], distinct from transport
//! errors so the retry layer can treat it as transient.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {}ms exceeded", .0.as_millis())]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` under `deadline`.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
