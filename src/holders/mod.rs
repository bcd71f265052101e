//! Token holder retrieval: account decoding, single-endpoint scan and the
//! multi-endpoint fetch cascade

pub mod cascade;
pub mod decoder;
pub mod scanner;
pub mod types;

pub use cascade::{parse_mint, HolderFetcher};
pub use scanner::{collect_holders, scan, TokenProgram};
pub use types::Holder;
