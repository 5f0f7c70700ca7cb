//! Temperature sources.
//!
//! A [`TemperatureSource`] produces one [`TemperatureReading`] per call. Two
//! implementations exist: [`SimulatedSource`], a bounded random walk kept in
//! process, and [`DaemonSource`], which proxies to the external temperature
//! daemon over HTTP. The API layer only sees the trait object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use utoipa::ToSchema;

use crate::config::{Config, SourceMode};
use crate::error::Result;

pub mod daemon;
pub mod simulated;

pub use daemon::{DaemonError, DaemonSource};
pub use simulated::SimulatedSource;

/// A single temperature reading as served by `GET /temperature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureReading {
    /// Degrees Celsius, rounded to two decimal places
    #[schema(example = 22.31)]
    pub value_c: f64,
    /// ISO-8601 UTC time of the reading
    #[schema(example = "2024-01-01T00:00:00Z")]
    pub timestamp: String,
}

impl TemperatureReading {
    /// Reading stamped with the current time.
    pub fn now(value_c: f64) -> Self {
        Self::at(value_c, utc_timestamp())
    }

    /// Reading with a caller-supplied timestamp.
    pub fn at(value_c: f64, timestamp: impl Into<String>) -> Self {
        Self {
            value_c: round_centi(value_c),
            timestamp: timestamp.into(),
        }
    }
}

/// Something that can be asked for the current temperature.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Take one reading.
    async fn read(&self) -> std::result::Result<TemperatureReading, DaemonError>;

    /// Which variant this is, for logging.
    fn mode(&self) -> SourceMode;
}

/// Build the source selected by `config.source`.
pub fn from_config(config: &Config) -> Result<Arc<dyn TemperatureSource>> {
    Ok(match config.source {
        SourceMode::Simulated => Arc::new(SimulatedSource::new()),
        SourceMode::Daemon => Arc::new(DaemonSource::new(
            config.daemon.url.clone(),
            config.daemon.timeout,
        )?),
    })
}

/// Round to two decimal places.
///
/// Values too large to scale are returned unchanged; they carry no
/// fractional digits anyway.
pub fn round_centi(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Current UTC time in RFC 3339 (an ISO-8601 profile).
pub fn utc_timestamp() -> String {
    // Only fails for years outside 0..=9999.
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
