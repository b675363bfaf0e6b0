//! Diagnostics for the dispatch and encoding paths.
//!
//! The crate logs through the `log` facade. `log_metric!` emits a structured
//! key/value line at debug level and is compiled out of release builds.
//! `enable_verbose_logging` installs an `env_logger` backend for callers that
//! have not set up their own.

use crate::error::Result;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

/// Logs a structured key-value metric line, only in debug builds.
///
/// # Example
/// ```
/// use tabula::log_metric;
/// let uniques = 4;
/// log_metric!("event"="factorize", "uniques"=&uniques);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("TABULA_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an info-level logger printing `[LEVEL] message` lines, appended
/// to `log_file` when given. Only the first call has any effect.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<()> {
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });
        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        let _ = builder.try_init();
    });
    Ok(())
}
