#![doc(test(attr(deny(warnings))))]

//! Signup Core holds the validation rules and the two-step sign-up wizard
//! behind the admin dashboard's authentication pages, plus a line-oriented
//! shell that drives the wizard from a terminal.

pub mod cli;
pub mod config;
pub mod errors;
pub mod forms;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Signup Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
