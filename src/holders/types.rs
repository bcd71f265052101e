use serde::{Deserialize, Serialize};

/// A wallet holding a positive balance of the token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    /// Wallet address (base58)
    pub owner: String,
    /// Raw integer amount as a decimal string
    pub amount: String,
    /// amount / 10^decimals
    #[serde(rename = "uiAmount")]
    pub ui_amount: f64,
}

impl Holder {
    pub fn new(owner: impl Into<String>, amount: u64, decimals: u8) -> Self {
        Self {
            owner: owner.into(),
            amount: amount.to_string(),
            ui_amount: ui_amount(amount, decimals),
        }
    }
}

/// Convert a raw token amount to UI units
pub fn ui_amount(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}
