//! Single-resolution result of one decode.
//!
//! A [`DecodeHandle`] is the receiving half of a `tokio::sync::oneshot`
//! channel whose sender is owned by a [`StreamAdapter`](crate::StreamAdapter).
//! The adapter sends at most once; if it is dropped without sending, the
//! handle resolves to `Error::UnterminatedBody`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::warn;

use formstream_core::{Error, Part, Result};

pub(crate) type ResultSender = oneshot::Sender<Result<Vec<Part>>>;

/// Future resolving to the parts of one body, or the failure that ended it
///
/// # Example
///
/// ```
/// use formstream_core::Boundary;
/// use formstream_transport::StreamAdapter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut adapter, handle) = StreamAdapter::new(Boundary::new("B").unwrap());
/// adapter.on_chunk(b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--");
///
/// let parts = handle.await.unwrap();
/// assert_eq!(parts[0].text(), Some("hi"));
/// # }
/// ```
#[derive(Debug)]
pub struct DecodeHandle {
    rx: oneshot::Receiver<Result<Vec<Part>>>,

    /// Set once `try_result` has handed out the result
    taken: bool,
}

impl DecodeHandle {
    pub(crate) fn channel() -> (ResultSender, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, taken: false })
    }

    /// Wait for the result, failing with `Error::Timeout` if it takes longer
    /// than `timeout`
    ///
    /// A producer that never signals completion leaves the decode pending
    /// forever; this bounds the wait.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<Vec<Part>> {
        match tokio::time::timeout(timeout, self).await {
            Ok(result) => result,
            Err(_) => {
                let millis = timeout_millis(timeout);
                warn!("Decode timeout after {}ms", millis);
                Err(Error::Timeout(millis))
            }
        }
    }

    /// Take the result if it has already been settled
    ///
    /// Returns `None` while the decode is still running, and on every call
    /// after the result has been taken.
    pub fn try_result(&mut self) -> Option<Result<Vec<Part>>> {
        if self.taken {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.taken = true;
                Some(result)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(Error::UnterminatedBody)),
        }
    }
}

/// Whole milliseconds in `timeout`, saturating at `u64::MAX`
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl Future for DecodeHandle {
    type Output = Result<Vec<Part>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Error::UnterminatedBody)))
    }
}
