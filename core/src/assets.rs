//! Capabilities of the external balance ledgers
//!
//! The issuance and presale cores never keep balances themselves. They call
//! into these traits and propagate whatever failure the ledger reports.

use crate::address::Address;
use crate::error::{AssetError, Result};
use crate::{Amount, ItemId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Multi-identifier balance ledger holding the issued items
pub trait MultiAssetLedger: Send + Sync {
    /// Create `amount` new units of `id` in `owner`'s balance
    fn credit(&self, operator: &Address, id: ItemId, owner: &Address, amount: Amount) -> Result<()>;

    fn balance_of(&self, owner: &Address, id: ItemId) -> Amount;
}

/// Fungible token contract (payment token or presale token)
pub trait FungibleLedger: Send + Sync {
    fn balance_of(&self, owner: &Address) -> Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Push `amount` from `from` to `to`
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()>;

    /// Pull `amount` from `from` to `to` on behalf of `spender`,
    /// consuming the allowance `from` granted to `spender`
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()>;
}

/// Fungible ledger whose supply can be created, e.g. a fixed-supply token
/// minted once to its treasury
pub trait MintableLedger: FungibleLedger {
    fn mint(&self, to: &Address, amount: Amount) -> Result<()>;

    fn total_supply(&self) -> Amount;
}

/// The host's built-in value medium
pub trait NativeCurrency: Send + Sync {
    fn balance_of(&self, account: &Address) -> Amount;

    /// Release `amount` of value escrowed by the host to `to`
    fn send(&self, to: &Address, amount: Amount) -> Result<()>;
}

/// Deployed fungible contracts, looked up by address
#[derive(Clone, Default)]
pub struct TokenDirectory {
    tokens: Arc<RwLock<HashMap<Address, Arc<dyn FungibleLedger>>>>,
}

impl TokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, address: Address, token: Arc<dyn FungibleLedger>) {
        log::debug!("registered token contract {}", address);
        self.tokens.write().insert(address, token);
    }

    pub fn get(&self, address: &Address) -> Option<Arc<dyn FungibleLedger>> {
        self.tokens.read().get(address).cloned()
    }

    pub fn resolve(&self, address: &Address) -> Result<Arc<dyn FungibleLedger>> {
        self.get(address).ok_or(AssetError::UnknownToken(*address))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.read().contains_key(address)
    }
}

impl std::fmt::Debug for TokenDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tokens = self.tokens.read();
        f.debug_struct("TokenDirectory")
            .field("tokens", &tokens.keys().collect::<Vec<_>>())
            .finish()
    }
}
