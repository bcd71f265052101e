//! Character assignment store
//!
//! Persistent mode keeps one row per wallet in SQLite: the character id is
//! written once on first sight, the balance on every observation. Hashed
//! mode has no storage and derives the id from the address.

use super::database::{Assignment, AssignmentsDatabase};
use super::hashing::{capped_char_count, hashed_char_id};
use crate::config::{StoreBackend, StoreConfig};
use crate::constants::TOKEN_MINT_SETTING_KEY;
use crate::errors::{ConfigurationError, HolderWorldError, HolderWorldResult};
use crate::holders::Holder;
use crate::logger::{self, LogTag};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Wallet balance as submitted for assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderBalance {
    pub owner: String,
    #[serde(rename = "uiAmount")]
    pub ui_amount: f64,
}

impl From<&Holder> for HolderBalance {
    fn from(holder: &Holder) -> Self {
        Self {
            owner: holder.owner.clone(),
            ui_amount: holder.ui_amount,
        }
    }
}

/// Counts reported by a batch upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertResult {
    /// Wallets that already had an assignment
    pub matched: usize,
    /// Existing assignments whose balance row was rewritten
    pub modified: usize,
    /// Wallets seen for the first time
    pub upserted: usize,
}

/// One entry of the world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldCharacter {
    pub owner: String,
    #[serde(rename = "charId")]
    pub char_id: u32,
    pub balance: f64,
}

impl From<Assignment> for WorldCharacter {
    fn from(assignment: Assignment) -> Self {
        Self {
            owner: assignment.owner,
            char_id: assignment.char_id,
            balance: assignment.balance,
        }
    }
}

pub enum AssignmentStore {
    Persistent(AssignmentsDatabase),
    Hashed,
}

impl AssignmentStore {
    /// Build the store selected by `database_url`
    pub fn from_config(config: &StoreConfig) -> HolderWorldResult<Self> {
        let store = match config.backend()? {
            StoreBackend::Hashed => {
                logger::info(
                    LogTag::Store,
                    "No DATABASE_URL configured, using hashed character assignment",
                );
                AssignmentStore::Hashed
            }
            StoreBackend::Memory => {
                AssignmentStore::Persistent(AssignmentsDatabase::open_in_memory()?)
            }
            StoreBackend::Sqlite(path) => {
                AssignmentStore::Persistent(AssignmentsDatabase::open(&path)?)
            }
        };
        Ok(store)
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, AssignmentStore::Persistent(_))
    }

    /// Short mode name for health output
    pub fn mode(&self) -> &'static str {
        match self {
            AssignmentStore::Persistent(_) => "sqlite",
            AssignmentStore::Hashed => "hashed",
        }
    }

    fn database(&self) -> HolderWorldResult<&AssignmentsDatabase> {
        match self {
            AssignmentStore::Persistent(db) => Ok(db),
            AssignmentStore::Hashed => Err(ConfigurationError::StoreNotConfigured.into()),
        }
    }

    /// Insert-once character ids, refresh balances
    ///
    /// Each wallet is written independently; a failure stops the batch and
    /// leaves earlier writes in place.
    pub fn upsert_batch(
        &self,
        mint: &str,
        holders: &[HolderBalance],
        char_count: u32,
    ) -> HolderWorldResult<UpsertResult> {
        let db = self.database()?;
        let max_id = capped_char_count(char_count);
        let mut rng = rand::thread_rng();
        let mut result = UpsertResult::default();

        for holder in holders {
            let now = Utc::now();
            let candidate = Assignment {
                owner: holder.owner.clone(),
                mint: mint.to_string(),
                char_id: rng.gen_range(1..=max_id),
                balance: holder.ui_amount,
                updated_at: now,
            };

            if db.insert_if_absent(&candidate)? {
                result.upserted += 1;
                continue;
            }

            let changed = db.update_balance(&holder.owner, holder.ui_amount, now)?;
            result.matched += 1;
            result.modified += changed;
        }

        logger::info(
            LogTag::Store,
            &format!(
                "Upserted {} holders of {}: {} new, {} matched, {} modified",
                holders.len(),
                mint,
                result.upserted,
                result.matched,
                result.modified
            ),
        );

        Ok(result)
    }

    /// Stored assignments of `mint` with balance >= `min`
    pub fn characters_for(&self, mint: &str, min: f64) -> HolderWorldResult<Vec<WorldCharacter>> {
        let assignments = self.database()?.list_for_mint(mint, min)?;
        Ok(assignments.into_iter().map(WorldCharacter::from).collect())
    }

    pub fn get_assignment(&self, owner: &str) -> HolderWorldResult<Option<Assignment>> {
        self.database()?.get_assignment(owner)
    }

    /// Administrative wipe of every assignment
    pub fn reset(&self) -> HolderWorldResult<usize> {
        let deleted = self.database()?.delete_all()?;
        logger::warning(
            LogTag::Store,
            &format!("Reset removed {} assignments", deleted),
        );
        Ok(deleted)
    }

    /// Token mint stored in the settings table, if any
    pub fn token_mint_setting(&self) -> HolderWorldResult<Option<String>> {
        match self {
            AssignmentStore::Hashed => Ok(None),
            AssignmentStore::Persistent(db) => Ok(db
                .get_setting(TOKEN_MINT_SETTING_KEY)?
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())),
        }
    }

    pub fn set_token_mint(&self, mint: &str) -> HolderWorldResult<()> {
        let db = self.database()?;
        db.set_setting(TOKEN_MINT_SETTING_KEY, mint.trim())?;
        logger::info(LogTag::Store, &format!("Token mint set to {}", mint.trim()));
        Ok(())
    }

    /// Run `op` against the store on the blocking thread pool
    ///
    /// Async callers use this for every SQLite access: a locked database
    /// file can hold a call for up to the busy timeout.
    pub async fn run_blocking<T, F>(self: Arc<Self>, op: F) -> HolderWorldResult<T>
    where
        F: FnOnce(&AssignmentStore) -> HolderWorldResult<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::task::spawn_blocking(move || op(&self)).await {
            Ok(result) => result,
            Err(e) => Err(HolderWorldError::Task(e.to_string())),
        }
    }

    /// Release the database connection
    pub fn close(&self) -> HolderWorldResult<()> {
        match self {
            AssignmentStore::Persistent(db) => db.close(),
            AssignmentStore::Hashed => Ok(()),
        }
    }
}

/// World entries computed from the address hash, in holder order
pub fn hashed_characters(holders: &[Holder], min: f64, char_count: u32) -> Vec<WorldCharacter> {
    holders
        .iter()
        .filter(|holder| holder.ui_amount >= min)
        .map(|holder| WorldCharacter {
            owner: holder.owner.clone(),
            char_id: hashed_char_id(&holder.owner, char_count),
            balance: holder.ui_amount,
        })
        .collect()
}

impl std::fmt::Debug for AssignmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStore::Persistent(db) => write!(f, "AssignmentStore::Persistent({})", db.location()),
            AssignmentStore::Hashed => write!(f, "AssignmentStore::Hashed"),
        }
    }
}

impl From<AssignmentsDatabase> for AssignmentStore {
    fn from(db: AssignmentsDatabase) -> Self {
        AssignmentStore::Persistent(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> AssignmentStore {
        AssignmentsDatabase::open_in_memory().unwrap().into()
    }

    fn balances(entries: &[(&str, f64)]) -> Vec<HolderBalance> {
        entries
            .iter()
            .map(|(owner, ui_amount)| HolderBalance {
                owner: owner.to_string(),
                ui_amount: *ui_amount,
            })
            .collect()
    }

    #[test]
    fn test_char_id_never_changes() {
        let store = memory_store();
        store
            .upsert_batch("MintA", &balances(&[("W1", 100.0), ("W2", 200.0)]), 3)
            .unwrap();
        let first = store.get_assignment("W1").unwrap().unwrap().char_id;

        for (round, count) in [1u32, 2, 3, 50, 1].iter().enumerate() {
            let result = store
                .upsert_batch("MintA", &balances(&[("W1", 300.0 + round as f64)]), *count)
                .unwrap();
            assert_eq!(result.upserted, 0);
            assert_eq!(result.matched, 1);
            assert_eq!(result.modified, 1);
        }

        let stored = store.get_assignment("W1").unwrap().unwrap();
        assert_eq!(stored.char_id, first);
        assert_eq!(stored.balance, 304.0);
    }

    #[test]
    fn test_char_id_capped_at_two() {
        let store = memory_store();
        let owners: Vec<String> = (0..200).map(|i| format!("wallet-{}", i)).collect();
        let holders: Vec<HolderBalance> = owners
            .iter()
            .map(|owner| HolderBalance {
                owner: owner.clone(),
                ui_amount: 1.0,
            })
            .collect();

        let result = store.upsert_batch("MintA", &holders, 100).unwrap();
        assert_eq!(result.upserted, 200);

        for character in store.characters_for("MintA", 0.0).unwrap() {
            assert!((1..=2).contains(&character.char_id));
        }
    }

    #[test]
    fn test_concurrent_refreshes_assign_once() {
        const WRITERS: usize = 8;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.db");
        AssignmentsDatabase::open(&path).unwrap().close().unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(WRITERS));
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let path = path.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let store = AssignmentStore::from(AssignmentsDatabase::open(&path).unwrap());
                    barrier.wait();
                    let result = store
                        .upsert_batch("MintA", &balances(&[("Shared", 100.0 + i as f64)]), 2)
                        .unwrap();
                    let char_id = store.get_assignment("Shared").unwrap().unwrap().char_id;
                    store.close().unwrap();
                    (result, char_id)
                })
            })
            .collect();

        let outcomes: Vec<(UpsertResult, u32)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let upserted: usize = outcomes.iter().map(|(result, _)| result.upserted).sum();
        let matched: usize = outcomes.iter().map(|(result, _)| result.matched).sum();
        assert_eq!(upserted, 1);
        assert_eq!(matched, WRITERS - 1);

        let first = outcomes[0].1;
        assert!(outcomes.iter().all(|(_, char_id)| *char_id == first));

        let store = AssignmentStore::from(AssignmentsDatabase::open(&path).unwrap());
        assert_eq!(store.get_assignment("Shared").unwrap().unwrap().char_id, first);
    }

    #[tokio::test]
    async fn test_run_blocking_uses_store() {
        let store = Arc::new(memory_store());
        let result = store
            .clone()
            .run_blocking(|store| store.upsert_batch("MintA", &balances(&[("A", 1.0)]), 2))
            .await
            .unwrap();
        assert_eq!(result.upserted, 1);

        let deleted = store.clone().run_blocking(|store| store.reset()).await.unwrap();
        assert_eq!(deleted, 1);

        let err = Arc::new(AssignmentStore::Hashed)
            .run_blocking(|store| store.reset())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_single_character_pool() {
        let store = memory_store();
        store
            .upsert_batch("MintA", &balances(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]), 1)
            .unwrap();
        assert!(store
            .characters_for("MintA", 0.0)
            .unwrap()
            .iter()
            .all(|c| c.char_id == 1));
    }

    #[test]
    fn test_reset_counts_and_reassigns() {
        let store = memory_store();
        store
            .upsert_batch("MintA", &balances(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]), 2)
            .unwrap();
        assert_eq!(store.reset().unwrap(), 3);
        assert!(store.characters_for("MintA", 0.0).unwrap().is_empty());

        let result = store
            .upsert_batch("MintA", &balances(&[("A", 1.0)]), 2)
            .unwrap();
        assert_eq!(result.upserted, 1);
    }

    #[test]
    fn test_hashed_mode_rejects_writes() {
        let store = AssignmentStore::Hashed;
        assert!(!store.is_persistent());
        let err = store.reset().unwrap_err();
        assert!(matches!(
            err,
            HolderWorldError::Configuration(ConfigurationError::StoreNotConfigured)
        ));
        assert!(store.upsert_batch("MintA", &[], 2).is_err());
        assert_eq!(store.token_mint_setting().unwrap(), None);
    }

    #[test]
    fn test_token_mint_setting_trimmed() {
        let store = memory_store();
        assert_eq!(store.token_mint_setting().unwrap(), None);
        store.set_token_mint("  MintA ").unwrap();
        assert_eq!(store.token_mint_setting().unwrap(), Some("MintA".to_string()));
    }

    #[test]
    fn test_hashed_characters_filter_and_order() {
        let holders = vec![
            Holder::new("Z", 20_000, 0),
            Holder::new("Y", 5, 0),
            Holder::new("X", 30_000, 0),
        ];
        let characters = hashed_characters(&holders, 10_000.0, 3);
        let owners: Vec<&str> = characters.iter().map(|c| c.owner.as_str()).collect();
        assert_eq!(owners, vec!["Z", "X"]);
        assert_eq!(characters[0].char_id, hashed_char_id("Z", 3));
    }

    #[test]
    fn test_from_config_backends() {
        let hashed = AssignmentStore::from_config(&StoreConfig::default()).unwrap();
        assert_eq!(hashed.mode(), "hashed");

        let memory = AssignmentStore::from_config(&StoreConfig {
            database_url: "sqlite::memory:".to_string(),
        })
        .unwrap();
        assert!(memory.is_persistent());

        assert!(AssignmentStore::from_config(&StoreConfig {
            database_url: "postgres://localhost/world".to_string(),
        })
        .is_err());
    }
}
