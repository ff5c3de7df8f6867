use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::error::Result;

/// Outcome of one poll attempt.
pub enum PollState<T> {
    Ready(T),
    Pending,
}

/// Fixed-interval poll with an overall deadline.
///
/// `op` decides what one attempt means: `Ready` stops the loop,
/// `Pending` waits one interval, and an error is terminal and
/// propagates immediately. Transient failures the caller wants to
/// survive must be mapped to `Pending` inside `op`. Returns `Ok(None)`
/// when the deadline passes without a terminal outcome, so each caller
/// picks its own timeout error.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut op: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match op().await? {
            PollState::Ready(value) => return Ok(Some(value)),
            PollState::Pending => {}
        }
        if Instant::now() + interval > deadline {
            return Ok(None);
        }
        sleep(interval).await;
    }
}
