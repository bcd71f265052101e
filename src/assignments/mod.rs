//! Wallet → character assignments: SQLite persistence and hashed fallback

pub mod database;
pub mod hashing;
pub mod store;

pub use database::{Assignment, AssignmentsDatabase};
pub use hashing::{capped_char_count, hashed_char_id, wallet_hash};
pub use store::{hashed_characters, AssignmentStore, HolderBalance, UpsertResult, WorldCharacter};
