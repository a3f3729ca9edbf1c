//! Logger setup for the native binary

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects debug output and
/// the default is info.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // `try_init` only fails when a logger is already installed (tests,
    // embedding hosts); keep that one.
    if let Err(err) = Builder::from_env(env).format_timestamp_millis().try_init() {
        log::debug!("Keeping existing logger: {err}");
    }
}
