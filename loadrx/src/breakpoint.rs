use crate::LoaderError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Call counter of one listener slot.
///
/// Every dispatch of the slot's trigger advances the epoch and cancels the
/// token handed to the previous call, so only the latest call can get past
/// a breakpoint.
#[derive(Debug, Default)]
pub(crate) struct CallEpoch {
    counter: Arc<AtomicU64>,
    current: Mutex<CancellationToken>,
}

impl CallEpoch {
    pub(crate) fn advance(&self) -> Breakpoint {
        let token = CancellationToken::new();
        let previous = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, token.clone())
        };
        let epoch = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        previous.cancel();
        Breakpoint {
            counter: self.counter.clone(),
            epoch,
            token,
        }
    }
}

/// Cooperative suspension and cancellation checkpoint handed to every loader.
///
/// A loader that never calls into its breakpoint cannot be interrupted.
#[derive(Debug, Clone)]
pub struct Breakpoint {
    counter: Arc<AtomicU64>,
    epoch: u64,
    token: CancellationToken,
}

impl Breakpoint {
    /// A breakpoint that is never superseded. Useful to call loaders directly.
    pub fn detached() -> Self {
        CallEpoch::default().advance()
    }

    pub fn is_superseded(&self) -> bool {
        self.counter.load(Ordering::SeqCst) != self.epoch
    }

    /// Synchronous checkpoint.
    pub fn check(&self) -> Result<(), LoaderError> {
        if self.is_superseded() {
            Err(LoaderError::Breakpoint)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `delay` (if any) and checks the epoch before and after.
    /// Without a delay it resolves immediately.
    ///
    /// A newer call cancels the sleep right away.
    pub async fn wait(&self, delay: Option<Duration>) -> Result<(), LoaderError> {
        self.check()?;
        if let Some(delay) = delay {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(LoaderError::Breakpoint),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.check()
    }

    pub async fn delay(&self, delay: Duration) -> Result<(), LoaderError> {
        self.wait(Some(delay)).await
    }
}
