//! Issuance ledger error types

use fanledger_core::{Address, Amount, AssetError, ItemId, OwnershipError};
use thiserror::Error;

/// Every variant rejects the whole call; no partial state survives it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    #[error("Incorrect tokenId: {id} is outside 0..={max_id}")]
    InvalidIdentifier { id: ItemId, max_id: ItemId },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Max supply is exceeded for id {id}: minted {minted}, requested {requested}, cap {cap}")]
    SupplyExceeded {
        id: ItemId,
        minted: Amount,
        requested: Amount,
        cap: Amount,
    },

    #[error("Not enough native value: required {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    #[error("Payment token transfer failed: {0}")]
    PaymentTransferFailed(#[source] AssetError),

    #[error("Caller is not the owner: {caller}")]
    NotOwner { caller: Address },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Zero address supplied where a real address is required")]
    InvalidAddress,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Asset ledger error: {0}")]
    Ledger(#[from] AssetError),
}

impl From<OwnershipError> for IssuanceError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::NotOwner { caller } => IssuanceError::NotOwner { caller },
            OwnershipError::InvalidAddress => IssuanceError::InvalidAddress,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssuanceError>;
