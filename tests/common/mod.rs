#![allow(dead_code)]

pub mod scorers;
pub mod synthetic;

/// Route library logs to the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
