//! Single-slot cancelable one-shot timer.
//!
//! DESIGN
//! ======
//! At most one task is pending per `Watchdog`. `arm` aborts whatever was
//! armed before spawning the replacement, so a superseded deadline can never
//! fire. Dropping the watchdog aborts the pending task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct Watchdog {
    slot: Option<Armed>,
}

#[derive(Debug)]
struct Armed {
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl Watchdog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer, then schedule `on_fire` after `delay`.
    ///
    /// A zero delay fires on the next scheduler turn. Must be called from
    /// within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire();
        });
        self.slot = Some(Armed { deadline, handle });
    }

    /// Abort the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(armed) => {
                let pending = !armed.handle.is_finished();
                armed.handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Forget the slot without aborting it. Used by the firing task itself.
    pub(crate) fn release(&mut self) {
        self.slot = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.slot.as_ref().is_some_and(|armed| !armed.handle.is_finished())
    }

    /// Instant the pending timer will fire at, if one is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.slot
            .as_ref()
            .filter(|armed| !armed.handle.is_finished())
            .map(|armed| armed.deadline)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "watchdog_test.rs"]
mod tests;
