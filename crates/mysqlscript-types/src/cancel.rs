//! Cooperative cancellation token.
//!
//! Long-running loops call [`Cancellation::checkpoint`] (or poll
//! [`Cancellation::is_cancelled`]) at statement boundaries; another thread
//! holding a clone raises the flag with [`Cancellation::cancel`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mysqlscript_error::{Result, ScriptError};

#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that every holder of this token stops at its next checkpoint.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can drive another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Returns `Err(ScriptError::Cancelled)` once the flag is raised.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ScriptError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = Cancellation::new();
        let remote = token.clone();
        assert!(token.checkpoint().is_ok());

        remote.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.checkpoint(), Err(ScriptError::Cancelled)));

        token.reset();
        assert!(!remote.is_cancelled());
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = Cancellation::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .expect("cancel thread panicked");
        assert!(token.is_cancelled());
    }
}
