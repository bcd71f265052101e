//! Network transport seam for JSON-RPC
//!
//! Everything above this module speaks `serde_json::Value`; the transport
//! only moves one request body to one URL and hands back the parsed JSON.
//! `HttpTransport` is the production implementation, tests script their own.

use crate::config::RpcConfig;
use crate::errors::{HolderWorldError, HolderWorldResult, NetworkError};
use crate::rpc::endpoints::endpoint_host;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Longest response body kept in HTTP status errors
const MAX_ERROR_BODY_CHARS: usize = 256;

#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// POST a JSON body to `url` and return the decoded JSON response
    async fn post_json(&self, url: &str, body: &Value) -> HolderWorldResult<Value>;
}

/// reqwest-backed transport with per-request timeouts
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &RpcConfig) -> HolderWorldResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs.max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| NetworkError::Generic {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> HolderWorldResult<Value> {
        let host = endpoint_host(url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&host, &e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(&host, &e, self.timeout))?;

        if !status.is_success() {
            return Err(NetworkError::HttpStatusError {
                endpoint: host,
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }
            .into());
        }

        serde_json::from_str(&text).map_err(|e| {
            HolderWorldError::malformed(host, format!("response is not valid JSON: {}", e))
        })
    }
}

/// Concatenate an error and all of its sources
fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Classify a reqwest failure into a network error variant
pub fn map_reqwest_error(host: &str, err: &reqwest::Error, timeout: Duration) -> NetworkError {
    let detail = error_chain_text(err);
    classify_transport_failure(host, &detail, err.is_timeout(), err.is_connect(), timeout)
}

fn classify_transport_failure(
    host: &str,
    detail: &str,
    is_timeout: bool,
    is_connect: bool,
    timeout: Duration,
) -> NetworkError {
    let lower = detail.to_lowercase();

    if is_timeout || lower.contains("timed out") {
        return NetworkError::ConnectionTimeout {
            endpoint: host.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };
    }
    if lower.contains("dns error") || lower.contains("failed to lookup address") {
        return NetworkError::DnsResolutionFailed {
            hostname: host.to_string(),
            error: detail.to_string(),
        };
    }
    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return NetworkError::TlsHandshakeFailed {
            endpoint: host.to_string(),
            error: detail.to_string(),
        };
    }
    if lower.contains("connection reset") || lower.contains("connection closed") {
        return NetworkError::ConnectionReset {
            endpoint: host.to_string(),
            reason: detail.to_string(),
        };
    }
    if is_connect || lower.contains("error sending request") {
        return NetworkError::ConnectionFailed {
            endpoint: host.to_string(),
            reason: detail.to_string(),
        };
    }

    NetworkError::Generic {
        message: format!("{}: {}", host, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(detail: &str, is_timeout: bool, is_connect: bool) -> NetworkError {
        classify_transport_failure(
            "rpc.example.com",
            detail,
            is_timeout,
            is_connect,
            Duration::from_secs(15),
        )
    }

    #[test]
    fn test_classification_of_transport_failures() {
        assert_eq!(
            classify("operation timed out", false, false),
            NetworkError::ConnectionTimeout {
                endpoint: "rpc.example.com".to_string(),
                timeout_ms: 15_000
            }
        );
        assert!(matches!(
            classify("error sending request: dns error: failed to lookup address", false, true),
            NetworkError::DnsResolutionFailed { .. }
        ));
        assert!(matches!(
            classify("invalid peer certificate: UnknownIssuer", false, true),
            NetworkError::TlsHandshakeFailed { .. }
        ));
        assert!(matches!(
            classify("connection reset by peer", false, false),
            NetworkError::ConnectionReset { .. }
        ));
        assert!(matches!(
            classify("tcp connect error: Connection refused", false, true),
            NetworkError::ConnectionFailed { .. }
        ));
        assert!(matches!(
            classify("builder error", false, false),
            NetworkError::Generic { .. }
        ));
    }

    #[test]
    fn test_every_transport_failure_but_generic_is_retryable() {
        assert!(classify("connection reset by peer", false, false).is_retryable());
        assert!(classify("anything", true, false).is_retryable());
        assert!(!classify("builder error", false, false).is_retryable());
    }
}
