//! Scripted RPC transport and account byte builders for unit tests

use crate::errors::{HolderWorldError, HolderWorldResult, NetworkError};
use crate::rpc::RpcTransport;
use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Scripted {
    Result(Value),
    RpcError(i64, String),
    Network(NetworkError),
}

#[derive(Default)]
struct MockState {
    scripts: HashMap<(String, String), Scripted>,
    calls: Vec<(String, String, Value)>,
}

/// Transport answering from per-(url, method) scripts and recording every call
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, url: &str, method: &str, scripted: Scripted) {
        self.state
            .lock()
            .scripts
            .insert((url.to_string(), method.to_string()), scripted);
    }

    pub fn respond(&self, url: &str, method: &str, result: Value) {
        self.script(url, method, Scripted::Result(result));
    }

    pub fn respond_error(&self, url: &str, method: &str, code: i64, message: &str) {
        self.script(url, method, Scripted::RpcError(code, message.to_string()));
    }

    /// Every method on `url` fails with `error`
    pub fn fail(&self, url: &str, error: NetworkError) {
        self.script(url, "*", Scripted::Network(error));
    }

    /// (url, method, params) of every call so far, in order
    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.state.lock().calls.clone()
    }

    pub fn urls_called(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for (url, _, _) in self.calls() {
            if urls.last() != Some(&url) {
                urls.push(url);
            }
        }
        urls
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn post_json(&self, url: &str, body: &Value) -> HolderWorldResult<Value> {
        let method = body["method"].as_str().unwrap_or_default().to_string();
        let scripted = {
            let mut state = self.state.lock();
            state
                .calls
                .push((url.to_string(), method.clone(), body["params"].clone()));
            state
                .scripts
                .get(&(url.to_string(), "*".to_string()))
                .or_else(|| state.scripts.get(&(url.to_string(), method.clone())))
                .cloned()
        };

        match scripted {
            Some(Scripted::Result(result)) => {
                Ok(json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }))
            }
            Some(Scripted::RpcError(code, message)) => Ok(json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "error": { "code": code, "message": message }
            })),
            Some(Scripted::Network(error)) => Err(error.into()),
            None => Err(HolderWorldError::invalid_request(format!(
                "no scripted response for {} {}",
                url, method
            ))),
        }
    }
}

pub fn reset_error(host: &str) -> NetworkError {
    NetworkError::ConnectionReset {
        endpoint: host.to_string(),
        reason: "read ECONNRESET".to_string(),
    }
}

/// 82-byte initialized mint with the given decimals
pub fn mint_account_bytes(decimals: u8) -> Vec<u8> {
    let mut data = vec![0u8; 82];
    data[36..44].copy_from_slice(&1_000_000_000u64.to_le_bytes());
    data[44] = decimals;
    data[45] = 1;
    data
}

/// 165-byte token account
pub fn token_account_bytes(mint: &Pubkey, owner: &Pubkey, amount: u64, state: u8) -> Vec<u8> {
    let mut data = vec![0u8; 165];
    data[0..32].copy_from_slice(mint.as_ref());
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    data[108] = state;
    data
}

/// Account JSON as returned by getAccountInfo / getProgramAccounts with base64 encoding
pub fn account_json(owner_program: &Pubkey, data: &[u8]) -> Value {
    json!({
        "data": [base64::engine::general_purpose::STANDARD.encode(data), "base64"],
        "executable": false,
        "lamports": 2_039_280u64,
        "owner": owner_program.to_string(),
        "rentEpoch": 0u64,
        "space": data.len(),
    })
}

/// getProgramAccounts entry for a token account
pub fn program_account_json(program: &Pubkey, data: &[u8]) -> Value {
    json!({
        "pubkey": Pubkey::new_unique().to_string(),
        "account": account_json(program, data),
    })
}

/// Script `url` to serve `mint` (owned by `program`) and the given token accounts
pub fn script_token(
    transport: &MockTransport,
    url: &str,
    program: &Pubkey,
    decimals: u8,
    accounts: Vec<Vec<u8>>,
) {
    transport.respond(
        url,
        "getAccountInfo",
        json!({
            "context": { "slot": 1 },
            "value": account_json(program, &mint_account_bytes(decimals)),
        }),
    );
    let entries: Vec<Value> = accounts
        .iter()
        .map(|data| program_account_json(program, data))
        .collect();
    transport.respond(url, "getProgramAccounts", Value::Array(entries));
}
