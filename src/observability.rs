//! Logging hooks for the codec.
//!
//! All diagnostics go through the `log` facade, so the library stays silent
//! unless the host application installs a logger. `enable_verbose_logging`
//! installs an `env_logger` for callers that have none of their own.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::Result;

/// Logs a structured `key=value` metric line at debug level.
///
/// # Example
/// ```
/// use huffpack::log_metric;
/// let symbols = 3;
/// log_metric!("event" = "tree_built", "distinct_symbols" = symbols);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts: Vec<String> = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            $crate::__log::debug!("HUFFPACK_METRIC: {}", parts.join(" "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide `env_logger` at info level. Only the first call has
/// any effect; later calls return `Ok(())` without touching the logger or the
/// file system.
///
/// If `log_file` cannot be opened the logger falls back to stderr and the open
/// error is returned.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<()> {
    let mut outcome = Ok(());

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Just the level and the message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });

        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => outcome = Err(e.into()),
            }
        }

        let _ = builder.try_init();
    });
    outcome
}
