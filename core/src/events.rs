//! Ledger event notifications
//!
//! Every ledger keeps an append-only journal of what it emitted so callers
//! (and tests) can inspect the exact notifications a call produced.

use crate::address::Address;
use crate::{Amount, ItemId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Units of one item moved; `from: None` marks an issuance
    TransferSingle {
        operator: Address,
        from: Option<Address>,
        to: Address,
        id: ItemId,
        amount: Amount,
    },
    /// Fungible units moved; `from: None` marks a mint
    Transfer {
        from: Option<Address>,
        to: Address,
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    CrowdsaleAddressSet {
        address: Address,
    },
    NativeWithdrawn {
        to: Address,
        amount: Amount,
    },
    TokenWithdrawn {
        token: Address,
        to: Address,
        amount: Amount,
    },
}

/// Append-only event log
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: RwLock<Vec<LedgerEvent>>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: LedgerEvent) {
        log::debug!("event: {:?}", event);
        self.entries.write().push(event);
    }

    /// Snapshot of every event recorded so far, oldest first
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn last(&self) -> Option<LedgerEvent> {
        self.entries.read().last().cloned()
    }

    /// JSON array of the journal, for audit exports
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.entries.read())
    }
}
