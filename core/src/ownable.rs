//! Single-owner access control shared by both ledgers

use crate::address::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("Caller is not the owner: {caller}")]
    NotOwner { caller: Address },

    #[error("New owner is the zero address")]
    InvalidAddress,
}

/// The privileged identity of a ledger, compared by value on every
/// owner-gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, caller: &Address) -> Result<(), OwnershipError> {
        // A renounced ledger has the zero owner, which no caller can match
        if self.owner.is_zero() || *caller != self.owner {
            return Err(OwnershipError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    /// Hand the role to `new_owner`. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        new_owner: Address,
        caller: &Address,
    ) -> Result<Address, OwnershipError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(OwnershipError::InvalidAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }

    /// Give the role up for good. Returns the previous owner.
    pub fn renounce_ownership(&mut self, caller: &Address) -> Result<Address, OwnershipError> {
        self.ensure_owner(caller)?;
        let previous = self.owner;
        self.owner = Address::ZERO;
        Ok(previous)
    }
}
