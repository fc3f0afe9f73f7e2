//! Catches SIGINT while ssh is asking for a password.
//!
//! The handler is only installed for the lifetime of an [`InterruptGuard`]. Children spawned
//! meanwhile get the default disposition back on exec, so the terminal interrupt still stops
//! them, but the controller survives to clean up.

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn note_interrupt(_: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub struct InterruptGuard {
    previous: SigAction,
}

impl InterruptGuard {
    /// Installs the handler, remembering the previous one.
    ///
    /// # Errors
    /// See [`sigaction`].
    pub fn install() -> nix::Result<Self> {
        INTERRUPTED.store(false, Ordering::SeqCst);
        let action = SigAction::new(
            SigHandler::Handler(note_interrupt),
            SaFlags::empty(),
            SigSet::empty(),
        );
        // SAFETY: the handler only touches an atomic.
        let previous = unsafe { sigaction(Signal::SIGINT, &action) }?;
        Ok(Self { previous })
    }

    /// Whether SIGINT arrived since [`InterruptGuard::install`].
    pub fn triggered(&self) -> bool {
        INTERRUPTED.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: restores whatever was installed before.
        if unsafe { sigaction(Signal::SIGINT, &self.previous) }.is_err() {
            log::warn!("failed to restore the SIGINT handler");
        }
    }
}

/// Held by tests that change the SIGINT disposition, they would undo each other otherwise.
#[cfg(test)]
pub(crate) static SIGINT_TESTS: std::sync::Mutex<()> = std::sync::Mutex::new(());
