//! Service configuration
//!
//! Read from the process environment (after `.env`, if one exists).

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub listen: SocketAddr,
    /// `service.name` reported to the collector
    pub service_name: String,
    /// OTLP gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Export traces and metrics. Logging to stdout happens either way.
    pub telemetry_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3001)),
            service_name: "survey-intake".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
            telemetry_enabled: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(listen) = lookup("SURVEY_LISTEN") {
            config.listen = listen
                .trim()
                .parse()
                .with_context(|| format!("invalid SURVEY_LISTEN address '{}'", listen))?;
        }
        if let Some(name) = lookup("OTEL_SERVICE_NAME").filter(|v| !v.trim().is_empty()) {
            config.service_name = name;
        }
        if let Some(endpoint) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            config.otlp_endpoint = endpoint;
        }
        if let Some(flag) = lookup("SURVEY_TELEMETRY") {
            config.telemetry_enabled = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }

        Ok(config)
    }
}
