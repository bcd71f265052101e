/// Response helpers shared by all route handlers
use crate::errors::HolderWorldError;
use crate::logger::{self, LogTag};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// 200 with the value as the JSON body
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Structured error body: `{"error": {code, message, details, timestamp}}`
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<Value>,
) -> Response {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
            "details": details,
            "timestamp": Utc::now().to_rfc3339(),
        }
    });
    (status, Json(body)).into_response()
}

/// HTTP status for a pipeline error, judged by its root cause
pub fn status_for_error(err: &HolderWorldError) -> StatusCode {
    match err.root_cause() {
        HolderWorldError::InvalidMint { .. } | HolderWorldError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        HolderWorldError::MintNotFound { .. } => StatusCode::NOT_FOUND,
        HolderWorldError::UnsupportedProgram { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        HolderWorldError::Network(_)
        | HolderWorldError::Rpc { .. }
        | HolderWorldError::MalformedResponse { .. }
        | HolderWorldError::Decode(_) => StatusCode::BAD_GATEWAY,
        HolderWorldError::Configuration(_)
        | HolderWorldError::Store(_)
        | HolderWorldError::Task(_)
        | HolderWorldError::HolderFetch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log and convert a pipeline error into an error response
pub fn holder_world_error_response(context: &str, err: &HolderWorldError) -> Response {
    let status = status_for_error(err);
    if status.is_server_error() {
        logger::error(LogTag::Webserver, &format!("{}: {}", context, err));
    } else {
        logger::warning(LogTag::Webserver, &format!("{}: {}", context, err));
    }

    let mut details = json!({ "kind": err.root_cause().kind() });
    if let HolderWorldError::HolderFetch { host, attempts, .. } = err {
        details["host"] = json!(host);
        details["attempts"] = json!(attempts);
    }

    error_response(status, err.kind(), &err.to_string(), Some(details))
}

/// 400 INVALID_PARAMETERS for a bad query value
pub fn invalid_parameter(field: &str, value: &str, reason: &str) -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        "INVALID_PARAMETERS",
        "Invalid parameters",
        Some(json!({ "field": field, "value": value, "reason": reason })),
    )
}

/// Parse an optional query value, falling back to `default` when absent or blank
pub fn parse_param<T: FromStr>(field: &str, raw: Option<&str>, default: T) -> Result<T, Response>
where
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|e| invalid_parameter(field, value, &e.to_string())),
    }
}

/// Parse a non-negative finite threshold
pub fn parse_min(raw: Option<&str>, default: f64) -> Result<f64, Response> {
    let min = parse_param("min", raw, default)?;
    if !min.is_finite() || min < 0.0 {
        return Err(invalid_parameter(
            "min",
            raw.unwrap_or_default(),
            "must be a non-negative number",
        ));
    }
    Ok(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConfigurationError, NetworkError};

    #[test]
    fn test_status_mapping_uses_root_cause() {
        let wrapped = |source: HolderWorldError| HolderWorldError::HolderFetch {
            host: "rpc.example.com".to_string(),
            attempts: 1,
            source: Box::new(source),
        };

        assert_eq!(
            status_for_error(&wrapped(HolderWorldError::MintNotFound { mint: "m".into() })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for_error(&wrapped(HolderWorldError::UnsupportedProgram {
                mint: "m".into(),
                program_id: "p".into()
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for_error(&wrapped(HolderWorldError::Network(NetworkError::Generic {
                message: "fetch failed".into()
            }))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for_error(&HolderWorldError::Configuration(
                ConfigurationError::StoreNotConfigured
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for_error(&HolderWorldError::InvalidMint {
                mint: "x".into(),
                reason: "bad".into()
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parse_param_defaults_and_errors() {
        assert_eq!(parse_param::<u32>("charCount", None, 3).unwrap(), 3);
        assert_eq!(parse_param::<u32>("charCount", Some(" "), 3).unwrap(), 3);
        assert_eq!(parse_param::<u32>("charCount", Some("5"), 3).unwrap(), 5);
        assert!(parse_param::<u32>("charCount", Some("five"), 3).is_err());

        assert_eq!(parse_min(Some("250.5"), 10.0).unwrap(), 250.5);
        assert!(parse_min(Some("-1"), 10.0).is_err());
        assert!(parse_min(Some("NaN"), 10.0).is_err());
    }
}
