//! Telemetry helpers for applications embedding `crosschart`.
//!
//! Registry mutations, broadcasts and pipeline stages emit `tracing` events.
//! Hosts either call `init_default_tracing` or install their own subscriber.

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER_DIRECTIVE: &str = "crosschart=info";

/// Installs a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Returns `false` when the feature is disabled or the host already set a
/// global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER_DIRECTIVE));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "telemetry"))]
    #[test]
    fn init_is_noop_without_feature() {
        assert!(!init_default_tracing());
    }

    #[test]
    fn default_directive_targets_this_crate() {
        assert!(DEFAULT_FILTER_DIRECTIVE.starts_with("crosschart"));
    }
}
