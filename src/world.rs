//! World snapshot: live holders enriched with character assignments

use crate::assignments::{hashed_characters, AssignmentStore, HolderBalance, WorldCharacter};
use crate::config::WorldConfig;
use crate::errors::HolderWorldResult;
use crate::holders::{parse_mint, Holder, HolderFetcher};
use crate::logger::{self, LogTag};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub characters: Vec<WorldCharacter>,
}

pub struct WorldBuilder {
    fetcher: Arc<HolderFetcher>,
    store: Arc<AssignmentStore>,
    config: WorldConfig,
}

impl WorldBuilder {
    pub fn new(fetcher: Arc<HolderFetcher>, store: Arc<AssignmentStore>, config: WorldConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<AssignmentStore> {
        &self.store
    }

    pub fn fetcher(&self) -> &Arc<HolderFetcher> {
        &self.fetcher
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Mint to use when a request does not name one
    ///
    /// Explicit value, then the stored `tokenMint` setting, then config.
    pub async fn resolve_mint(&self, requested: Option<&str>) -> HolderWorldResult<Option<String>> {
        if let Some(mint) = requested.map(str::trim).filter(|m| !m.is_empty()) {
            return Ok(Some(mint.to_string()));
        }
        if self.store.is_persistent() {
            let stored = self
                .store
                .clone()
                .run_blocking(|store| store.token_mint_setting())
                .await?;
            if let Some(mint) = stored {
                return Ok(Some(mint));
            }
        }
        let configured = self.config.token_mint.trim();
        Ok((!configured.is_empty()).then(|| configured.to_string()))
    }

    /// Put the configured test wallet at the front unless it already holds
    pub fn inject_test_wallet(&self, holders: &mut Vec<Holder>) {
        if !self.config.test_wallet_enabled || self.config.test_wallet.trim().is_empty() {
            return;
        }
        let wallet = self.config.test_wallet.trim();
        if holders.iter().any(|h| h.owner == wallet) {
            return;
        }

        let balance = self.config.test_wallet_balance;
        holders.insert(
            0,
            Holder {
                owner: wallet.to_string(),
                amount: format!("{:.0}", balance),
                ui_amount: balance,
            },
        );
        logger::debug(LogTag::World, &format!("Added test wallet {} to holders", wallet));
    }

    /// Snapshot of `mint` holders at or above `min`
    pub async fn build(&self, mint: &str, min: f64, char_count: u32) -> HolderWorldResult<WorldSnapshot> {
        let mut holders = self.fetcher.fetch_holders(mint, min).await?;
        self.inject_test_wallet(&mut holders);

        let characters = if self.store.is_persistent() {
            self.refresh_assignments(mint, &holders, min, char_count).await?
        } else {
            hashed_characters(&holders, min, char_count)
        };

        logger::info(
            LogTag::World,
            &format!(
                "World for {}: {} characters from {} holders ({} mode)",
                mint,
                characters.len(),
                holders.len(),
                self.store.mode()
            ),
        );

        Ok(WorldSnapshot { characters })
    }

    /// Stored assignments of `mint` after refreshing them from live holders
    ///
    /// Uses the configured character count; no test wallet is added.
    pub async fn assignments(&self, mint: &str, min: f64) -> HolderWorldResult<Vec<WorldCharacter>> {
        let holders = self.fetcher.fetch_holders(mint, min).await?;

        if !self.store.is_persistent() {
            return Ok(hashed_characters(&holders, min, self.config.char_count));
        }

        self.refresh_assignments(mint, &holders, min, self.config.char_count)
            .await
    }

    /// Upsert `holders` and read back the stored assignments of `mint`
    async fn refresh_assignments(
        &self,
        mint: &str,
        holders: &[Holder],
        min: f64,
        char_count: u32,
    ) -> HolderWorldResult<Vec<WorldCharacter>> {
        let balances: Vec<HolderBalance> = holders.iter().map(HolderBalance::from).collect();
        let mint = mint.trim().to_string();
        self.store
            .clone()
            .run_blocking(move |store| {
                store.upsert_batch(&mint, &balances, char_count)?;
                store.characters_for(&mint, min)
            })
            .await
    }

    /// Validate and persist the default token mint
    pub async fn set_token_mint(&self, mint: &str) -> HolderWorldResult<String> {
        let parsed = parse_mint(mint)?.to_string();
        let stored = parsed.clone();
        self.store
            .clone()
            .run_blocking(move |store| store.set_token_mint(&stored))
            .await?;
        Ok(parsed)
    }
}
