//! Log output for the `repofetch` binary.
//!
//! Events are written to stderr, leaving stdout to the command's own output
//! (`repofetch resolve` prints URLs and JSON there).

use std::io;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding filter directives, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "REPOFETCH_LOG";

/// Install the global subscriber. Returns `false` if one was already set.
///
/// Filtering comes from `REPOFETCH_LOG`, then `RUST_LOG`, then
/// [`default_directives`] for `level`.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let json_lines = json.then(|| fmt::layer().with_writer(io::stderr).json());
    let plain = (!json).then(|| fmt::layer().with_writer(io::stderr).compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(json_lines)
        .with(plain)
        .try_init()
        .is_ok()
}

/// `level` for the repofetch crates, warnings only for dependencies.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,repofetch={level},repofetch_core={level}")
}
