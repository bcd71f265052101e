//! Holder scan against a single RPC connection
//!
//! mint account → owning program → decimals → filtered getProgramAccounts →
//! decode, drop ineligible accounts, apply the UI-amount threshold.

use super::decoder::{decode_mint, decode_token_account, TOKEN_ACCOUNT_LEN};
use super::types::{ui_amount, Holder};
use crate::errors::{HolderWorldError, HolderWorldResult};
use crate::logger::{self, LogTag};
use crate::rpc::{RpcConnection, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

/// The two token programs a mint may belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProgram {
    Legacy,
    Token2022,
}

impl TokenProgram {
    pub fn from_owner(owner: &Pubkey) -> Option<Self> {
        if *owner == spl_token::id() {
            Some(TokenProgram::Legacy)
        } else if *owner == spl_token_2022::id() {
            Some(TokenProgram::Token2022)
        } else {
            None
        }
    }

    pub fn program_id(&self) -> Pubkey {
        match self {
            TokenProgram::Legacy => spl_token::id(),
            TokenProgram::Token2022 => spl_token_2022::id(),
        }
    }

    /// Server-side filters selecting every token account of `mint`
    ///
    /// Token-2022 accounts vary in size with their extensions, so only the
    /// legacy program gets a dataSize filter.
    pub fn holder_filters(&self, mint: &Pubkey) -> Vec<RpcFilterType> {
        let memcmp = RpcFilterType::Memcmp {
            offset: 0,
            bytes: mint.to_string(),
        };
        match self {
            TokenProgram::Legacy => vec![RpcFilterType::DataSize(TOKEN_ACCOUNT_LEN as u64), memcmp],
            TokenProgram::Token2022 => vec![memcmp],
        }
    }
}

/// Holders plus the number of returned accounts that were left out
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub holders: Vec<Holder>,
    /// Undecodable, uninitialized, frozen, empty or foreign-mint accounts
    pub skipped: usize,
    /// Eligible accounts below the threshold
    pub below_min: usize,
}

/// Fetch the holder set of `mint` with a UI balance of at least `min`
pub async fn scan(conn: &RpcConnection, mint: &Pubkey, min: f64) -> HolderWorldResult<Vec<Holder>> {
    let mint_account = conn
        .get_account_info(mint)
        .await?
        .ok_or_else(|| HolderWorldError::MintNotFound {
            mint: mint.to_string(),
        })?;

    let program = TokenProgram::from_owner(&mint_account.owner).ok_or_else(|| {
        HolderWorldError::UnsupportedProgram {
            mint: mint.to_string(),
            program_id: mint_account.owner.to_string(),
        }
    })?;

    let decimals = decode_mint(program, &mint_account.data)?.decimals;

    let response = conn
        .get_program_accounts(&program.program_id(), &program.holder_filters(mint))
        .await?;

    let outcome = collect_holders(program, mint, &response.accounts, decimals, min);

    logger::debug(
        LogTag::Holders,
        &format!(
            "Scanned {} accounts of {} on {} ({:?}, decimals {}): {} holders, {} skipped, {} unparsable, {} below {}",
            response.accounts.len(),
            mint,
            conn.host(),
            program,
            decimals,
            outcome.holders.len(),
            outcome.skipped,
            response.unparsable,
            outcome.below_min,
            min
        ),
    );

    Ok(outcome.holders)
}

/// Decode token accounts and keep eligible holders at or above `min`
///
/// A malformed account only skips itself.
pub fn collect_holders(
    program: TokenProgram,
    mint: &Pubkey,
    accounts: &[(Pubkey, Account)],
    decimals: u8,
    min: f64,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for (address, account) in accounts {
        let info = match decode_token_account(program, &account.data) {
            Ok(info) => info,
            Err(e) => {
                logger::verbose(LogTag::Holders, &format!("Skipping {}: {}", address, e));
                outcome.skipped += 1;
                continue;
            }
        };

        if !info.is_eligible() || info.mint != *mint {
            outcome.skipped += 1;
            continue;
        }

        if ui_amount(info.amount, decimals) < min {
            outcome.below_min += 1;
            continue;
        }

        outcome
            .holders
            .push(Holder::new(info.owner.to_string(), info.amount, decimals));
    }

    outcome
}
