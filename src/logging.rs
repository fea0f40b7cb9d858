use std::io;

use time::macros::format_description;
use time::UtcOffset;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the stderr logger.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
///
/// Calling this more than once (e.g. from several tests) is not an error.
pub fn init_logger(no_color: bool, log_level: Option<&str>) -> io::Result<()> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer)
        .with_ansi(!no_color)
        .with_filter(filter);

    match tracing_subscriber::registry().with(stderr_layer).try_init() {
        Ok(()) => Ok(()),
        // Ignore errors due to the subscriber or logger already being set
        Err(e)
            if e.to_string().contains("already been set")
                || e.to_string().contains("SetLoggerError") =>
        {
            Ok(())
        }
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}
