//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize logging for tests; safe to call from every test
pub fn try_init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
