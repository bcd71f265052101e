//! RPC endpoint resolution
//!
//! Builds the ordered candidate list used by the holder fetch cascade:
//! primary, primary's mirror host, configured fallbacks, public fallback.
//! The list is rebuilt on every fetch so configuration changes apply
//! without a restart.

use crate::config::RpcConfig;
use crate::constants::{MIRRORED_RPC_HOSTS, PUBLIC_FALLBACK_RPC_URL};
use crate::errors::ConfigurationError;
use crate::logger::{self, LogTag};
use url::Url;

const PRIMARY_FIELD: &str = "HELIUS_RPC_URL";

/// Candidate endpoint list builder
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    primary: Option<String>,
    fallbacks: Vec<String>,
}

impl EndpointResolver {
    pub fn new(primary: Option<String>, fallbacks: Vec<String>) -> Self {
        Self { primary, fallbacks }
    }

    pub fn from_config(config: &RpcConfig) -> Self {
        let primary = if config.primary_url.trim().is_empty() {
            None
        } else {
            Some(config.primary_url.clone())
        };
        Self::new(primary, config.fallback_urls.clone())
    }

    /// Produce the ordered, duplicate-free candidate list
    ///
    /// Fails only when the primary URL is missing or invalid. Invalid
    /// fallbacks are dropped.
    pub fn resolve(&self) -> Result<Vec<String>, ConfigurationError> {
        let raw_primary = self
            .primary
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingConfig {
                field: PRIMARY_FIELD.to_string(),
            })?;

        let primary = normalize_rpc_url(raw_primary, PRIMARY_FIELD)?;
        let mut urls = vec![primary.clone()];

        if let Some(mirror) = mirror_url(&primary) {
            urls.push(mirror);
        }

        let candidates = self
            .fallbacks
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(PUBLIC_FALLBACK_RPC_URL));

        for raw in candidates {
            if raw.trim().is_empty() {
                continue;
            }
            match normalize_rpc_url(raw, "RPC fallback URL") {
                Ok(url) => urls.push(url),
                Err(e) => logger::debug(LogTag::Rpc, &format!("Skipping fallback: {}", e)),
            }
        }

        let mut seen = std::collections::HashSet::new();
        urls.retain(|url| seen.insert(url.clone()));
        Ok(urls)
    }
}

/// Trim, strip surrounding quotes and all whitespace, then validate as http(s)
pub fn normalize_rpc_url(raw: &str, field: &str) -> Result<String, ConfigurationError> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix(|c: char| c == '"' || c == '\'')
        .unwrap_or(trimmed);
    let unquoted = unquoted
        .strip_suffix(|c: char| c == '"' || c == '\'')
        .unwrap_or(unquoted);
    let sanitized: String = unquoted.chars().filter(|c| !c.is_whitespace()).collect();

    let invalid = |reason: &str| ConfigurationError::InvalidUrl {
        field: field.to_string(),
        url: sanitized.clone(),
        reason: reason.to_string(),
    };

    if !sanitized.starts_with("https://") && !sanitized.starts_with("http://") {
        return Err(invalid("must start with https://"));
    }

    let url = Url::parse(&sanitized).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(invalid("missing host"));
    }

    Ok(url.to_string())
}

/// The same URL on the other known mirror host, if the host is mirrored
pub fn mirror_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    let (a, b) = MIRRORED_RPC_HOSTS;
    let other = if host == a {
        b
    } else if host == b {
        a
    } else {
        return None;
    };

    parsed.set_host(Some(other)).ok()?;
    Some(parsed.to_string())
}

/// Host part of an endpoint, safe to log (API keys live in the query string)
pub fn endpoint_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(primary: &str, fallbacks: &[&str]) -> EndpointResolver {
        EndpointResolver::new(
            Some(primary.to_string()),
            fallbacks.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_missing_primary_is_configuration_error() {
        let err = EndpointResolver::new(None, vec![]).resolve().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingConfig {
                field: "HELIUS_RPC_URL".to_string()
            }
        );

        assert!(resolver("   ", &[]).resolve().is_err());
    }

    #[test]
    fn test_invalid_primary_is_rejected() {
        assert!(matches!(
            resolver("ftp://rpc.example.com", &[]).resolve(),
            Err(ConfigurationError::InvalidUrl { .. })
        ));
        assert!(resolver("https://", &[]).resolve().is_err());
    }

    #[test]
    fn test_primary_only_gets_public_fallback() {
        let urls = resolver("https://rpc.example.com", &[]).resolve().unwrap();
        assert_eq!(
            urls,
            vec![
                "https://rpc.example.com/".to_string(),
                "https://api.mainnet-beta.solana.com/".to_string(),
            ]
        );
    }

    #[test]
    fn test_mirror_and_order() {
        let urls = resolver(
            " \"https://mainnet.helius-rpc.com/?api-key=abc\" ",
            &["https://backup.example.com", "not a url", "https://second.example.com"],
        )
        .resolve()
        .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://mainnet.helius-rpc.com/?api-key=abc".to_string(),
                "https://rpc.helius.xyz/?api-key=abc".to_string(),
                "https://backup.example.com/".to_string(),
                "https://second.example.com/".to_string(),
                "https://api.mainnet-beta.solana.com/".to_string(),
            ]
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let urls = resolver(
            "https://api.mainnet-beta.solana.com",
            &["https://api.mainnet-beta.solana.com/", "https://api.mainnet-beta.solana.com"],
        )
        .resolve()
        .unwrap();
        assert_eq!(urls, vec!["https://api.mainnet-beta.solana.com/".to_string()]);
    }

    #[test]
    fn test_whitespace_inside_url_is_stripped() {
        let url = normalize_rpc_url("https://rpc.exa mple.com/\n", "test").unwrap();
        assert_eq!(url, "https://rpc.example.com/");
    }

    #[test]
    fn test_endpoint_host_hides_query() {
        assert_eq!(
            endpoint_host("https://mainnet.helius-rpc.com/?api-key=secret"),
            "mainnet.helius-rpc.com"
        );
        assert_eq!(endpoint_host("garbage"), "unknown-host");
    }
}
