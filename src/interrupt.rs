//! @acp:module "Interrupts"
//! @acp:summary "Ctrl-C handling shared by the engine and commands"
//! @acp:domain cli
//! @acp:layer io
//!
//! Interrupt handling
//!
//! The first Ctrl-C marks the process as interrupted; the engine checks the
//! mark between jobs and long-running commands poll it. A second Ctrl-C
//! exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the Ctrl-C handler; call once at startup
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
    })
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Mark the process as interrupted without a signal
pub fn trigger() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}
