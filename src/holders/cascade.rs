//! Holder fetch across the RPC candidate list
//!
//! Candidates are tried in order. A retryable (network-class) failure moves
//! on to the next candidate; anything else, or running out of candidates,
//! ends the fetch with `HolderFetch` wrapping the last cause.

use super::scanner::scan;
use super::types::Holder;
use crate::config::RpcConfig;
use crate::errors::{ConfigurationError, HolderWorldError, HolderWorldResult};
use crate::logger::{self, LogTag};
use crate::rpc::{EndpointResolver, HttpTransport, RpcConnection, RpcTransport};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

pub struct HolderFetcher {
    resolver: EndpointResolver,
    transport: Arc<dyn RpcTransport>,
    commitment: String,
}

impl HolderFetcher {
    pub fn new(resolver: EndpointResolver, transport: Arc<dyn RpcTransport>, commitment: &str) -> Self {
        Self {
            resolver,
            transport,
            commitment: commitment.to_string(),
        }
    }

    /// Production fetcher over HTTP
    pub fn from_config(config: &RpcConfig) -> HolderWorldResult<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            EndpointResolver::from_config(config),
            Arc::new(transport),
            &config.commitment,
        ))
    }

    /// Current holders of `mint` with a UI balance of at least `min`
    pub async fn fetch_holders(&self, mint: &str, min: f64) -> HolderWorldResult<Vec<Holder>> {
        let mint_pubkey = parse_mint(mint)?;
        if !min.is_finite() || min < 0.0 {
            return Err(HolderWorldError::invalid_request(format!(
                "min must be a non-negative number, got {}",
                min
            )));
        }

        let candidates = self.resolver.resolve()?;
        let total = candidates.len();

        for (index, url) in candidates.iter().enumerate() {
            let attempt = index + 1;
            let conn = RpcConnection::new(url, &self.commitment, self.transport.clone());

            logger::debug(
                LogTag::Rpc,
                &format!("Fetching holders of {} via {} ({}/{})", mint, conn.host(), attempt, total),
            );

            match scan(&conn, &mint_pubkey, min).await {
                Ok(holders) => {
                    logger::info(
                        LogTag::Holders,
                        &format!("Fetched {} holders of {} from {}", holders.len(), mint, conn.host()),
                    );
                    return Ok(holders);
                }
                Err(e) if e.is_retryable() && attempt < total => {
                    logger::warning(
                        LogTag::Rpc,
                        &format!(
                            "Retryable failure on {} ({}/{}), trying next endpoint: {}",
                            conn.host(),
                            attempt,
                            total,
                            e
                        ),
                    );
                }
                Err(e) => {
                    logger::error(
                        LogTag::Rpc,
                        &format!("Error fetching holders from {}: {}", conn.host(), e),
                    );
                    return Err(HolderWorldError::HolderFetch {
                        host: conn.host().to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
            }
        }

        Err(ConfigurationError::Generic("no RPC endpoints available".to_string()).into())
    }
}

/// Parse a base58 mint address
pub fn parse_mint(mint: &str) -> HolderWorldResult<Pubkey> {
    let trimmed = mint.trim();
    if trimmed.is_empty() {
        return Err(HolderWorldError::InvalidMint {
            mint: String::new(),
            reason: "mint address is empty".to_string(),
        });
    }
    Pubkey::from_str(trimmed).map_err(|e| HolderWorldError::InvalidMint {
        mint: trimmed.to_string(),
        reason: e.to_string(),
    })
}
