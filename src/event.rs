use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::ServoError;

// Flag the signal handler stores to. Set once per process by
// `Termination::install_signal_handlers`.
static SIGNAL_TARGET: OnceLock<Arc<AtomicBool>> = OnceLock::new();

const TERMINATION_SIGNALS: [libc::c_int; 2] = [libc::SIGINT, libc::SIGTERM];

/// Cooperative termination request shared between the PWM loop and
/// whatever asks it to stop (a signal handler, or a test).
#[derive(Debug, Clone, Default)]
pub struct Termination {
    flag: Arc<AtomicBool>,
}

impl Termination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        log::debug!("Termination::request");
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Routes SIGINT and SIGTERM to this termination flag.
    ///
    /// The handler only performs an atomic store. Only the first
    /// `Termination` installed in a process receives signals.
    pub fn install_signal_handlers(&self) -> Result<(), ServoError> {
        let target = SIGNAL_TARGET.get_or_init(|| self.flag.clone());
        if !Arc::ptr_eq(target, &self.flag) {
            log::warn!("Signal handlers already routed to another termination flag");
        }
        for signal in TERMINATION_SIGNALS {
            let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            let previous = unsafe { libc::signal(signal, handler) };
            if previous == libc::SIG_ERR {
                return Err(ServoError::Signal {
                    signal,
                    source: std::io::Error::last_os_error(),
                });
            }
        }
        log::debug!("Termination handlers installed for {:?}", TERMINATION_SIGNALS);
        Ok(())
    }
}

extern "C" fn on_signal(_signal: libc::c_int) {
    if let Some(flag) = SIGNAL_TARGET.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_request() {
        let termination = Termination::new();
        let observer = termination.clone();
        assert!(!observer.is_requested());
        termination.request();
        assert!(observer.is_requested());
    }

    #[test]
    fn sigterm_requests_termination() {
        let termination = Termination::new();
        termination.install_signal_handlers().unwrap();
        assert!(!termination.is_requested());

        assert_eq!(unsafe { libc::raise(libc::SIGTERM) }, 0);
        assert!(termination.is_requested());
    }
}
