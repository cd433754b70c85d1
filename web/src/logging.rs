//! Structured logging handle passed to the request handlers.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{Span, info, info_span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_ENV_VAR: &str = "GEOLOCWEB_LOG";

/// The logger for one running service. It is created once at startup with
/// [Logger::init], handed to the handlers through the shared state and
/// explicitly shut down when the server stops.
#[derive(Debug, Clone)]
pub struct Logger {
    service: &'static str,
}

impl Logger {
    /// Installs the global subscriber. `GEOLOCWEB_LOG` overrides the configured level.
    pub fn init(service: &'static str, config: &LogConfig) -> Result<Self> {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_new(&config.level))
            .with_context(|| format!("Invalid log filter '{}'", config.level))?;

        let installed = if config.json {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init()
        };
        installed.with_context(|| "Failed to install the log subscriber")?;

        info!(
            service,
            filter = %config.level,
            json = config.json,
            "Logging initialized"
        );
        Ok(Self { service })
    }

    /// A logger for tests. It installs nothing; events reach whatever
    /// subscriber is already in place.
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self { service: "test" }
    }

    /// Opens the span that a handler runs its operation in. The span is a
    /// child of the current span, i.e. the request span inside a handler.
    pub fn operation(&self, operation: &'static str) -> Span {
        info_span!("operation", service = self.service, op = operation)
    }

    /// Logs the shutdown and flushes buffered output
    pub fn shutdown(self) {
        info!(service = self.service, "Shutting down");
        if let Err(e) = std::io::stdout().flush() {
            warn!("Failed to flush log output: {e}");
        }
    }
}
