//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with `level` as the default filter.
///
/// `RUST_LOG` still overrides the default. Calling this twice is harmless,
/// which keeps tests that share a process from failing.
pub fn init(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
