//! Presale distributor error types

use fanledger_core::{Address, Amount, AssetError, OwnershipError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresaleError {
    #[error("Caller is not the owner: {caller}")]
    NotOwner { caller: Address },

    #[error("Address is zero")]
    InvalidAddress,

    #[error("Buyer address is zero")]
    InvalidRecipient,

    #[error("Out of token limit: {amount} (limit {limit})")]
    OutOfLimit { amount: Amount, limit: Amount },

    #[error("Presale limit exceeded: {distributed} distributed, {requested} requested, limit {limit}")]
    LimitExceeded {
        requested: Amount,
        distributed: Amount,
        limit: Amount,
    },

    #[error("Treasury allowance exceeded: requested {requested}, approved {approved}")]
    AllowanceExceeded { requested: Amount, approved: Amount },

    #[error("Token transfers are paused")]
    Paused,

    #[error("Token ledger error: {0}")]
    Token(#[from] AssetError),
}

impl From<OwnershipError> for PresaleError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::NotOwner { caller } => PresaleError::NotOwner { caller },
            OwnershipError::InvalidAddress => PresaleError::InvalidAddress,
        }
    }
}

pub type Result<T> = std::result::Result<T, PresaleError>;
