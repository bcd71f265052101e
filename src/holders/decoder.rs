//! SPL token mint and token account decoding
//!
//! Legacy accounts unpack with `spl_token`'s fixed layouts. Token-2022
//! accounts may carry extensions after the base layout and go through
//! `StateWithExtensions`, which only surfaces the base state.

use super::scanner::TokenProgram;
use crate::errors::DecodeError;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::extension::StateWithExtensions;

/// Base size of a mint account
pub const MINT_ACCOUNT_LEN: usize = spl_token::state::Mint::LEN;
/// Base size of a token account (also the legacy program's dataSize filter)
pub const TOKEN_ACCOUNT_LEN: usize = spl_token::state::Account::LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Uninitialized,
    Initialized,
    Frozen,
}

impl From<spl_token::state::AccountState> for AccountState {
    fn from(state: spl_token::state::AccountState) -> Self {
        match state {
            spl_token::state::AccountState::Uninitialized => AccountState::Uninitialized,
            spl_token::state::AccountState::Initialized => AccountState::Initialized,
            spl_token::state::AccountState::Frozen => AccountState::Frozen,
        }
    }
}

impl From<spl_token_2022::state::AccountState> for AccountState {
    fn from(state: spl_token_2022::state::AccountState) -> Self {
        match state {
            spl_token_2022::state::AccountState::Uninitialized => AccountState::Uninitialized,
            spl_token_2022::state::AccountState::Initialized => AccountState::Initialized,
            spl_token_2022::state::AccountState::Frozen => AccountState::Frozen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    pub decimals: u8,
    pub supply: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub state: AccountState,
}

impl TokenAccountInfo {
    /// Initialized with a positive balance
    pub fn is_eligible(&self) -> bool {
        self.state == AccountState::Initialized && self.amount > 0
    }
}

/// Legacy layouts are exact; Token-2022 only needs the base to be present
fn check_len(
    program: TokenProgram,
    account_type: &'static str,
    data: &[u8],
    expected: usize,
) -> Result<(), DecodeError> {
    let ok = match program {
        TokenProgram::Legacy => data.len() == expected,
        TokenProgram::Token2022 => data.len() >= expected,
    };
    if !ok {
        return Err(DecodeError::InvalidLength {
            account_type,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

fn unpack_error(account_type: &'static str, err: impl std::fmt::Display) -> DecodeError {
    DecodeError::Unpack {
        account_type,
        reason: err.to_string(),
    }
}

pub fn decode_mint(program: TokenProgram, data: &[u8]) -> Result<MintInfo, DecodeError> {
    check_len(program, "mint", data, MINT_ACCOUNT_LEN)?;

    match program {
        TokenProgram::Legacy => {
            let mint = spl_token::state::Mint::unpack(data).map_err(|e| unpack_error("mint", e))?;
            Ok(MintInfo {
                decimals: mint.decimals,
                supply: mint.supply,
            })
        }
        TokenProgram::Token2022 => {
            let mint = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(data)
                .map_err(|e| unpack_error("mint", e))?;
            Ok(MintInfo {
                decimals: mint.base.decimals,
                supply: mint.base.supply,
            })
        }
    }
}

/// Uninitialized accounts fail to unpack and surface as errors
pub fn decode_token_account(program: TokenProgram, data: &[u8]) -> Result<TokenAccountInfo, DecodeError> {
    check_len(program, "token account", data, TOKEN_ACCOUNT_LEN)?;

    match program {
        TokenProgram::Legacy => {
            let account = spl_token::state::Account::unpack(data)
                .map_err(|e| unpack_error("token account", e))?;
            Ok(TokenAccountInfo {
                mint: account.mint,
                owner: account.owner,
                amount: account.amount,
                state: account.state.into(),
            })
        }
        TokenProgram::Token2022 => {
            let account = StateWithExtensions::<spl_token_2022::state::Account>::unpack(data)
                .map_err(|e| unpack_error("token account", e))?;
            Ok(TokenAccountInfo {
                mint: account.base.mint,
                owner: account.base.owner,
                amount: account.base.amount,
                state: account.base.state.into(),
            })
        }
    }
}
