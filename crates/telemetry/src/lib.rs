//! Tracing subscriber bootstrap.

use tracing_subscriber::{fmt, EnvFilter};
use voyage_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `telemetry.filter`. Calling this twice is harmless: the
/// second call leaves the first subscriber in place and returns `Ok(false)`.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<bool> {
    let filter = env_filter(&settings.filter)?;

    let installed = match settings.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .try_init(),
    }
    .is_ok();

    if installed {
        tracing::debug!(
            target: "voyage-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }
    Ok(installed)
}

fn env_filter(fallback: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .map_err(|err| anyhow::anyhow!("invalid telemetry filter '{}': {}", fallback, err)),
    }
}
