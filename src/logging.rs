use tracing_subscriber::{fmt, EnvFilter};

/// Crate events at `info`, dependencies only when they warn.
pub const DEFAULT_FILTER: &str = "warn,deficard=info";

/// Install the stderr subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`];
/// `DEFICARD_LOG_JSON=1` switches to JSON lines.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let use_json = std::env::var("DEFICARD_LOG_JSON")
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
