/// Error taxonomy for HolderWorld
///
/// One top-level enum covers every failure the pipeline can surface. Each
/// variant carries a machine-readable kind (for API consumers) and knows
/// whether it is worth retrying against another RPC endpoint.
use thiserror::Error;

/// Message fragments that mark a failure as network-class
///
/// Matched case-insensitively against error text for failures that only
/// reach us as strings (JSON-RPC error objects, opaque transport errors).
const NETWORK_ERROR_PATTERNS: &[&str] = &[
    "econnreset",
    "enotfound",
    "eai_again",
    "fetch failed",
    "socket",
    "ssl",
    "tlsv1",
    "connection reset",
    "connection closed",
    "timed out",
    "dns error",
];

/// Returns true when an error message looks like a transient network failure
pub fn is_network_error_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    NETWORK_ERROR_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Error, Debug)]
pub enum HolderWorldError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid mint address '{mint}': {reason}")]
    InvalidMint { mint: String, reason: String },

    #[error("Mint account not found: {mint}")]
    MintNotFound { mint: String },

    #[error("Unsupported mint owner program: {program_id}")]
    UnsupportedProgram { mint: String, program_id: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("RPC error from {endpoint} (code {code}): {message}")]
    Rpc {
        endpoint: String,
        code: i64,
        message: String,
    },

    #[error("Malformed RPC response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Failed to fetch holders from {host} after {attempts} endpoint(s): {source}")]
    HolderFetch {
        host: String,
        attempts: usize,
        #[source]
        source: Box<HolderWorldError>,
    },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Task join error: {0}")]
    Task(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type HolderWorldResult<T> = Result<T, HolderWorldError>;

impl HolderWorldError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            HolderWorldError::Configuration(_) => "CONFIGURATION_ERROR",
            HolderWorldError::Decode(_) => "DECODE_ERROR",
            HolderWorldError::InvalidMint { .. } => "INVALID_MINT",
            HolderWorldError::MintNotFound { .. } => "MINT_NOT_FOUND",
            HolderWorldError::UnsupportedProgram { .. } => "UNSUPPORTED_PROGRAM",
            HolderWorldError::Network(_) => "NETWORK_ERROR",
            HolderWorldError::Rpc { .. } => "RPC_ERROR",
            HolderWorldError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            HolderWorldError::HolderFetch { .. } => "HOLDER_FETCH_ERROR",
            HolderWorldError::Store(_) => "STORE_ERROR",
            HolderWorldError::Task(_) => "TASK_ERROR",
            HolderWorldError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// Whether another RPC endpoint could plausibly succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        match self {
            HolderWorldError::Network(err) => err.is_retryable(),
            HolderWorldError::Rpc { message, .. } => is_network_error_message(message),
            HolderWorldError::HolderFetch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Innermost cause, unwrapping any `HolderFetch` layers
    pub fn root_cause(&self) -> &HolderWorldError {
        match self {
            HolderWorldError::HolderFetch { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        HolderWorldError::InvalidRequest(message.into())
    }

    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        HolderWorldError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{field} is not set")]
    MissingConfig { field: String },

    #[error("{field} is invalid ('{url}'): {reason}")]
    InvalidUrl {
        field: String,
        url: String,
        reason: String,
    },

    #[error("Invalid config field '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("No persistent assignment store is configured")]
    StoreNotConfigured,

    #[error("{0}")]
    Generic(String),
}

// =============================================================================
// DECODE ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{account_type} data has wrong length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        account_type: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to unpack {account_type}: {reason}")]
    Unpack {
        account_type: &'static str,
        reason: String,
    },
}

// =============================================================================
// NETWORK ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Connection timeout to {endpoint} after {timeout_ms}ms")]
    ConnectionTimeout { endpoint: String, timeout_ms: u64 },

    #[error("Connection to {endpoint} failed: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Connection to {endpoint} was reset: {reason}")]
    ConnectionReset { endpoint: String, reason: String },

    #[error("DNS resolution failed for {hostname}: {error}")]
    DnsResolutionFailed { hostname: String, error: String },

    #[error("TLS handshake with {endpoint} failed: {error}")]
    TlsHandshakeFailed { endpoint: String, error: String },

    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatusError {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{message}")]
    Generic { message: String },
}

impl NetworkError {
    /// Rate limits and server-side failures are transient; other 4xx are not
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::HttpStatusError { status, .. } => *status == 429 || *status >= 500,
            NetworkError::Generic { message } => is_network_error_message(message),
            _ => true,
        }
    }
}
