//! Edge device control API.
//!
//! Serves power-state toggling and temperature readings over HTTP. Readings
//! come either from a local simulation or from an external temperature
//! daemon, selected at start-up by [`config::Config`].

pub mod api;
pub mod api_client;
pub mod config;
pub mod error;
pub mod temperature;
pub mod tracing;
