//! JSON-RPC connection to one Solana endpoint
//!
//! Implements only the two reads the holder pipeline needs:
//! `getAccountInfo` and `getProgramAccounts`, both base64-encoded.

use crate::errors::{HolderWorldError, HolderWorldResult};
use crate::logger::{self, LogTag};
use crate::rpc::endpoints::endpoint_host;
use crate::rpc::transport::RpcTransport;
use base64::Engine;
use serde_json::{json, Value};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Filter type for getProgramAccounts
#[derive(Debug, Clone, PartialEq)]
pub enum RpcFilterType {
    /// Filter by data size
    DataSize(u64),
    /// Filter by memcmp - offset and base58 encoded bytes
    Memcmp { offset: usize, bytes: String },
}

impl RpcFilterType {
    fn to_json(&self) -> Value {
        match self {
            RpcFilterType::DataSize(size) => json!({ "dataSize": size }),
            RpcFilterType::Memcmp { offset, bytes } => json!({
                "memcmp": {
                    "offset": offset,
                    "bytes": bytes
                }
            }),
        }
    }
}

/// Result of a getProgramAccounts call
#[derive(Debug, Default)]
pub struct ProgramAccounts {
    pub accounts: Vec<(Pubkey, Account)>,
    /// Entries whose envelope could not be parsed (skipped, not fatal)
    pub unparsable: usize,
}

/// One endpoint, one transport, one commitment level
pub struct RpcConnection {
    url: String,
    host: String,
    commitment: String,
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl RpcConnection {
    pub fn new(url: &str, commitment: &str, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            url: url.to_string(),
            host: endpoint_host(url),
            commitment: commitment.to_string(),
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Loggable host of this connection
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Execute a raw JSON-RPC call and return its `result`
    pub async fn call(&self, method: &str, params: Value) -> HolderWorldResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        logger::verbose(
            LogTag::Rpc,
            &format!("{} -> {} (id {})", method, self.host, id),
        );

        let response = self.transport.post_json(&self.url, &request).await?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(HolderWorldError::Rpc {
                endpoint: self.host.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown JSON-RPC error")
                    .to_string(),
            });
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| HolderWorldError::malformed(&self.host, format!("{} response has no result", method)))
    }

    /// Fetch one account, `None` when it does not exist
    pub async fn get_account_info(&self, pubkey: &Pubkey) -> HolderWorldResult<Option<Account>> {
        let params = json!([
            pubkey.to_string(),
            {
                "encoding": "base64",
                "commitment": self.commitment
            }
        ]);

        let result = self.call("getAccountInfo", params).await?;
        let value = result.get("value").unwrap_or(&Value::Null);
        parse_account_from_json(value).map_err(|reason| HolderWorldError::malformed(&self.host, reason))
    }

    /// Fetch every account owned by `program_id` that matches all `filters`
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[RpcFilterType],
    ) -> HolderWorldResult<ProgramAccounts> {
        let mut config = serde_json::Map::new();
        config.insert("encoding".to_string(), json!("base64"));
        config.insert("commitment".to_string(), json!(self.commitment));
        if !filters.is_empty() {
            config.insert(
                "filters".to_string(),
                Value::Array(filters.iter().map(RpcFilterType::to_json).collect()),
            );
        }

        let params = json!([program_id.to_string(), Value::Object(config)]);
        let result = self.call("getProgramAccounts", params).await?;
        parse_program_accounts(&result).map_err(|reason| HolderWorldError::malformed(&self.host, reason))
    }
}

/// Parse a getProgramAccounts result (bare array or `{context, value}`)
fn parse_program_accounts(result: &Value) -> Result<ProgramAccounts, String> {
    let items = result
        .as_array()
        .or_else(|| result.get("value").and_then(Value::as_array))
        .ok_or("Invalid response: expected array of program accounts")?;

    let mut parsed = ProgramAccounts {
        accounts: Vec::with_capacity(items.len()),
        unparsable: 0,
    };

    for item in items {
        let entry = item
            .get("pubkey")
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing pubkey field".to_string())
            .and_then(|s| Pubkey::from_str(s).map_err(|e| format!("Invalid pubkey: {}", e)))
            .and_then(|pubkey| {
                let account = item.get("account").ok_or("Missing account field")?;
                match parse_account_from_json(account)? {
                    Some(account) => Ok((pubkey, account)),
                    None => Err("Null account".to_string()),
                }
            });

        match entry {
            Ok(entry) => parsed.accounts.push(entry),
            Err(reason) => {
                parsed.unparsable += 1;
                logger::debug(LogTag::Rpc, &format!("Skipping program account: {}", reason));
            }
        }
    }

    Ok(parsed)
}

/// Parse an account JSON object as returned with base64 encoding
pub fn parse_account_from_json(value: &Value) -> Result<Option<Account>, String> {
    if value.is_null() {
        return Ok(None);
    }

    let data = value.get("data").ok_or("Missing data field")?;

    let data_bytes = if let Some(arr) = data.as_array() {
        // [data_base64, encoding]
        let encoded = arr
            .first()
            .and_then(Value::as_str)
            .ok_or("Invalid data")?;
        let encoding = arr.get(1).and_then(Value::as_str).unwrap_or("base64");

        if encoding != "base64" {
            return Err(format!("Unsupported encoding: {}", encoding));
        }
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| format!("Failed to decode base64: {}", e))?
    } else if let Some(s) = data.as_str() {
        base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|e| format!("Failed to decode base64: {}", e))?
    } else {
        return Err("Invalid data format".to_string());
    };

    let lamports = value
        .get("lamports")
        .and_then(Value::as_u64)
        .ok_or("Missing lamports")?;

    let owner_str = value
        .get("owner")
        .and_then(Value::as_str)
        .ok_or("Missing owner")?;
    let owner =
        Pubkey::from_str(owner_str).map_err(|e| format!("Invalid owner pubkey: {}", e))?;

    let executable = value
        .get("executable")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let rent_epoch = value
        .get("rentEpoch")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(Some(Account {
        lamports,
        data: data_bytes,
        owner,
        executable,
        rent_epoch,
    }))
}
