//! Errors surfaced by the external asset ledgers

use crate::address::Address;
use crate::Amount;
use thiserror::Error;

/// Failure reported by a balance ledger (multi-asset, fungible or native)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Insufficient balance for {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: Address,
        requested: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance from {owner} to {spender}: requested {requested}, approved {approved}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        requested: Amount,
        approved: Amount,
    },

    #[error("Invalid receiver: {0}")]
    InvalidReceiver(Address),

    #[error("Unknown token contract: {0}")]
    UnknownToken(Address),

    #[error("Arithmetic overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, AssetError>;
