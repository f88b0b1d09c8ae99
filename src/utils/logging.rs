use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "DOCDEX_LOG";

/// Install a stderr fmt subscriber.
///
/// `DOCDEX_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init_logging(verbosity: u8) {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| default_filter(verbosity).to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "docdex=warn",
        1 => "docdex=info",
        _ => "docdex=debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "docdex=warn");
        assert_eq!(default_filter(1), "docdex=info");
        assert_eq!(default_filter(7), "docdex=debug");
    }
}
