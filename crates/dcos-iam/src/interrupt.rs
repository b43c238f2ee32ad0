//! Ctrl-C routing.
//!
//! Once `tokio::signal::ctrl_c` has been awaited, tokio keeps its SIGINT
//! handler for the rest of the process and the default "terminate"
//! behaviour never comes back. A single watcher therefore owns the signal:
//! while an operation is armed it cancels that operation, otherwise it
//! ends the process the way an unhandled SIGINT would.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::exit_code;

/// Shared slot for the token of the operation currently running.
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    armed: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    /// Take over SIGINT for the rest of the process.
    pub fn watch(&self) {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupts.interrupt() {
                    eprintln!();
                    std::process::exit(exit_code::INTERRUPTED);
                }
            }
        });
    }

    /// Route interrupts to `token` until the guard is dropped.
    pub fn arm(&self, token: CancellationToken) -> Armed<'_> {
        *self.slot() = Some(token);
        Armed { owner: self }
    }

    /// Cancel the armed operation. `false` when nothing was running.
    pub fn interrupt(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                warn!("interrupt received, cancelling");
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Disarms on drop.
pub struct Armed<'a> {
    owner: &'a Interrupts,
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        *self.owner.slot() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_with_nothing_armed_is_not_handled() {
        assert!(!Interrupts::default().interrupt());
    }

    #[test]
    fn interrupt_cancels_only_while_armed() {
        let interrupts = Interrupts::default();
        let token = CancellationToken::new();
        {
            let _armed = interrupts.arm(token.clone());
            assert!(interrupts.interrupt());
        }
        assert!(token.is_cancelled());
        assert!(!interrupts.interrupt());
    }
}
