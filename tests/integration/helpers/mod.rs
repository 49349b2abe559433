//! Helper utilities for integration tests.

pub mod assertions;
pub mod record_generator;

pub use assertions::*;
pub use record_generator::*;

/// Routes library logging to the test harness; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}
