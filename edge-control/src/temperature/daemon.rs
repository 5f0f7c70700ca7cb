//! Temperature daemon proxy.
//!
//! Readings are fetched from `GET {base_url}/read` on the external sensor
//! daemon. The daemon answers with JSON of the form
//!
//! ```json
//! {"status": "ok", "temp_c": 21.5, "timestamp": "2024-01-01T00:00:00Z"}
//! {"status": "error", "error": "sensor fault", "timestamp": "..."}
//! ```
//!
//! Extra fields (humidity, Fahrenheit value, raw status byte) are ignored.
//! Every request is bounded by a fixed timeout and is never retried.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::{utc_timestamp, TemperatureReading, TemperatureSource};
use crate::config::SourceMode;
use crate::error::Result;
use crate::tracing::prelude::*;

/// Ways a daemon read can fail.
///
/// The API layer reports all three the same way (HTTP 502); only the
/// message differs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaemonError {
    /// Connection failure, timeout, or non-2xx status
    #[error("daemon unavailable: {0}")]
    Unavailable(String),

    /// Daemon answered but reported a non-ok status
    #[error("daemon error: {0}")]
    RemoteError(String),

    /// Payload was malformed or incomplete
    #[error("bad daemon response: {0}")]
    BadResponse(String),
}

/// Body of `GET /read`, as far as we care about it.
#[derive(Debug, Deserialize)]
struct DaemonResponse {
    status: Option<Value>,
    temp_c: Option<Value>,
    error: Option<Value>,
    timestamp: Option<Value>,
}

impl DaemonResponse {
    fn is_ok(&self) -> bool {
        matches!(&self.status, Some(Value::String(s)) if s == "ok")
    }

    // Non-string messages are reported as their JSON text.
    fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    // Only a non-empty string counts as a timestamp.
    fn timestamp(&self) -> Option<String> {
        match &self.timestamp {
            Some(Value::String(ts)) if !ts.is_empty() => Some(ts.clone()),
            _ => None,
        }
    }
}

/// Proxies reads to the temperature daemon.
pub struct DaemonSource {
    client: reqwest::Client,
    read_url: String,
    timeout: Duration,
}

impl DaemonSource {
    /// Create a source for the daemon at `base_url`.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            read_url: format!("{}/read", base_url.as_ref().trim_end_matches('/')),
            timeout,
        })
    }

    /// Full URL this source reads from.
    pub fn read_url(&self) -> &str {
        &self.read_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and translate one reading.
    pub async fn fetch(&self) -> std::result::Result<TemperatureReading, DaemonError> {
        let response = self
            .client
            .get(&self.read_url)
            .send()
            .await
            .map_err(|e| DaemonError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DaemonError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            // The daemon reports sensor faults with a 500 and an error body;
            // keep its message so the client sees why.
            let detail = serde_json::from_slice::<DaemonResponse>(&body)
                .ok()
                .and_then(|r| r.error_message());
            return Err(DaemonError::Unavailable(match detail {
                Some(detail) => format!("HTTP {status} ({detail})"),
                None => format!("HTTP {status}"),
            }));
        }

        interpret(&body)
    }
}

#[async_trait]
impl TemperatureSource for DaemonSource {
    async fn read(&self) -> std::result::Result<TemperatureReading, DaemonError> {
        match self.fetch().await {
            Ok(reading) => {
                debug!(
                    url = %self.read_url,
                    value_c = reading.value_c,
                    "Daemon temperature read"
                );
                Ok(reading)
            }
            Err(e) => {
                warn!(url = %self.read_url, error = %e, "Daemon temperature read failed");
                Err(e)
            }
        }
    }

    fn mode(&self) -> SourceMode {
        SourceMode::Daemon
    }
}

/// Validate a successful `/read` body and turn it into a reading.
pub fn interpret(body: &[u8]) -> std::result::Result<TemperatureReading, DaemonError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DaemonError::BadResponse(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(DaemonError::BadResponse(format!(
            "expected a JSON object, got {value}"
        )));
    }
    // Every field is an optional raw value, so an object always fits.
    let response: DaemonResponse = serde_json::from_value(value)
        .map_err(|e| DaemonError::BadResponse(e.to_string()))?;

    if !response.is_ok() {
        return Err(DaemonError::RemoteError(
            response
                .error_message()
                .unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    let temp_c = match &response.temp_c {
        None | Some(Value::Null) => {
            return Err(DaemonError::BadResponse("missing temp_c".to_string()))
        }
        Some(raw) => to_celsius(raw)?,
    };

    let timestamp = response.timestamp().unwrap_or_else(utc_timestamp);

    Ok(TemperatureReading::at(temp_c, timestamp))
}

fn to_celsius(raw: &Value) -> std::result::Result<f64, DaemonError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| DaemonError::BadResponse(format!("temp_c is not a number: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::time::Instant;
    use test_case::test_case;
    use tokio::net::TcpListener;

    // Serve a fixed `/read` response on an ephemeral port.
    async fn fake_daemon(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/read",
            get(move || async move {
                (
                    status,
                    [(axum::http::header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn source(base_url: &str) -> DaemonSource {
        DaemonSource::new(base_url, Duration::from_millis(1500)).unwrap()
    }

    #[test]
    fn test_read_url_joins_base() {
        let s = source("http://localhost:7070");
        assert_eq!(s.read_url(), "http://localhost:7070/read");
        let s = source("http://localhost:7070/");
        assert_eq!(s.read_url(), "http://localhost:7070/read");
        assert_eq!(s.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_ok_without_timestamp_gets_fresh_one() {
        let reading = interpret(br#"{"status":"ok","temp_c":21.5}"#).unwrap();
        assert_eq!(reading.value_c, 21.5);
        assert!(!reading.timestamp.is_empty());
        assert!(reading.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_ok_keeps_daemon_timestamp() {
        let reading =
            interpret(br#"{"status":"ok","temp_c":21.5,"timestamp":"2024-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(reading.value_c, 21.5);
        assert_eq!(reading.timestamp, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_empty_timestamp_is_replaced() {
        let reading = interpret(br#"{"status":"ok","temp_c":21.5,"timestamp":""}"#).unwrap();
        assert_ne!(reading.timestamp, "");
    }

    #[test_case(br#"{"status":"ok","temp_c":21.5,"timestamp":123}"# ; "numeric timestamp")]
    #[test_case(br#"{"status":"ok","temp_c":21.5,"timestamp":null}"# ; "null timestamp")]
    #[test_case(br#"{"status":"ok","temp_c":21.5,"timestamp":{"t":1}}"# ; "object timestamp")]
    fn test_ok_non_string_timestamp_is_replaced(body: &[u8]) {
        let reading = interpret(body).unwrap();
        assert_eq!(reading.value_c, 21.5);
        assert!(reading.timestamp.ends_with('Z'), "{}", reading.timestamp);
    }

    #[test]
    fn test_ignores_extra_fields() {
        let body = br#"{"status":"ok","timestamp":"2024-01-01T00:00:00Z","temp_c":23.41,
            "temp_f":74.14,"humidity":41.20,"busy":false,"status_byte":24}"#;
        let reading = interpret(body).unwrap();
        assert_eq!(reading.value_c, 23.41);
    }

    #[test_case(br#"{"status":"ok","temp_c":21.456}"#, 21.46 ; "rounds to two places")]
    #[test_case(br#"{"status":"ok","temp_c":"19.5"}"#, 19.5 ; "numeric string")]
    #[test_case(br#"{"status":"ok","temp_c":-4}"#, -4.0 ; "integer")]
    #[test_case(br#"{"status":"ok","temp_c":1e307}"#, 1e307 ; "huge value stays finite")]
    fn test_value_conversion(body: &[u8], expected: f64) {
        assert_eq!(interpret(body).unwrap().value_c, expected);
    }

    #[test_case(br#"{"status":"error","error":"sensor fault"}"#, "sensor fault" ; "remote error carries message")]
    #[test_case(br#"{"status":"error"}"#, "unknown" ; "remote error defaults to unknown")]
    #[test_case(br#"{"temp_c":21.5}"#, "unknown" ; "missing status is not ok")]
    #[test_case(br#"{"status":true,"temp_c":21.5}"#, "unknown" ; "non string status is not ok")]
    #[test_case(br#"{"status":"error","error":{"code":5}}"#, r#"{"code":5}"# ; "object error is stringified")]
    #[test_case(br#"{"status":"error","error":42}"#, "42" ; "numeric error is stringified")]
    #[test_case(br#"{"status":"error","error":null}"#, "unknown" ; "null error defaults to unknown")]
    fn test_remote_error(body: &[u8], message: &str) {
        let err = interpret(body).unwrap_err();
        assert!(matches!(err, DaemonError::RemoteError(_)), "{err:?}");
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test_case(br#"{"status":"ok"}"#, "missing temp_c" ; "missing temp_c")]
    #[test_case(br#"{"status":"ok","temp_c":null}"#, "missing temp_c" ; "null temp_c")]
    #[test_case(br#"{"status":"ok","temp_c":"warm"}"#, "not a number" ; "non numeric string")]
    #[test_case(br#"{"status":"ok","temp_c":[21.5]}"#, "not a number" ; "array temp_c")]
    #[test_case(b"<html>oops</html>", "invalid JSON" ; "not json")]
    #[test_case(b"[1, 2, 3, 4]", "expected a JSON object" ; "json array")]
    #[test_case(b"21.5", "expected a JSON object" ; "bare number")]
    fn test_bad_response(body: &[u8], message: &str) {
        let err = interpret(body).unwrap_err();
        assert!(matches!(err, DaemonError::BadResponse(_)), "{err:?}");
        assert!(err.to_string().contains(message), "{err}");
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = fake_daemon(
            StatusCode::OK,
            r#"{"status":"ok","temp_c":21.5,"timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .await;
        let reading = source(&url).read().await.unwrap();
        assert_eq!(
            reading,
            TemperatureReading::at(21.5, "2024-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_fetch_remote_error() {
        let url = fake_daemon(StatusCode::OK, r#"{"status":"error","error":"sensor fault"}"#).await;
        let err = source(&url).read().await.unwrap_err();
        assert_eq!(err, DaemonError::RemoteError("sensor fault".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_unavailable() {
        let url = fake_daemon(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"status":"error","error":"i2c read failed"}"#,
        )
        .await;
        let err = source(&url).read().await.unwrap_err();
        assert!(matches!(err, DaemonError::Unavailable(_)), "{err:?}");
        let msg = err.to_string();
        assert!(msg.contains("unavailable"), "{msg}");
        assert!(msg.contains("500"), "{msg}");
        assert!(msg.contains("i2c read failed"), "{msg}");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Grab a free port, then close it again.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{addr}")).read().await.unwrap_err();
        assert!(matches!(err, DaemonError::Unavailable(_)), "{err:?}");
        assert!(err.to_string().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        // Accept connections but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let timeout = Duration::from_millis(200);
        let source = DaemonSource::new(format!("http://{addr}"), timeout).unwrap();
        let started = Instant::now();
        let err = source.read().await.unwrap_err();

        assert!(matches!(err, DaemonError::Unavailable(_)), "{err:?}");
        assert!(err.to_string().contains("unavailable"));
        assert!(started.elapsed() < timeout + Duration::from_secs(1));
    }
}
