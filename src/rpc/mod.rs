//! Solana JSON-RPC access: endpoint candidates, transport, connection

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::{parse_account_from_json, ProgramAccounts, RpcConnection, RpcFilterType};
pub use endpoints::{endpoint_host, mirror_url, normalize_rpc_url, EndpointResolver};
pub use transport::{HttpTransport, RpcTransport};
