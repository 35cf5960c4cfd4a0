//! Item issuance ledger
//!
//! Sells units of items `0..=max_id` up to a per-item cap, paid either with
//! native value attached to the call or by pulling a pre-approved payment
//! token. Every entry point holds the state lock from its first check to its
//! last mutation, so concurrent callers are serialized and the check that
//! admitted a call is still true when its effects land.

use crate::error::{IssuanceError, Result};
use fanledger_core::{
    Address, Amount, EventJournal, FungibleLedger, ItemId, LedgerEvent, MultiAssetLedger,
    NativeCurrency, Ownable, TokenDirectory,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Placeholder substituted in the metadata URI
pub const URI_ID_PLACEHOLDER: &str = "{id}";

/// Construction parameters, immutable once the ledger exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceParams {
    /// Largest valid item id (inclusive)
    pub max_id: ItemId,
    /// Cumulative units mintable per item
    pub cap_per_id: Amount,
    /// Native value per unit
    pub price_native: Amount,
    /// Payment token base units per unit
    pub price_payment_token: Amount,
    pub payment_token: Address,
    pub metadata_uri: String,
}

impl IssuanceParams {
    pub fn validate(&self) -> Result<()> {
        if self.cap_per_id == 0 {
            return Err(IssuanceError::InvalidParams(
                "cap_per_id must be positive".to_string(),
            ));
        }
        if self.payment_token.is_zero() {
            return Err(IssuanceError::InvalidParams(
                "payment token address is zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// External ledgers the issuance core calls into
#[derive(Clone)]
pub struct IssuanceHost {
    pub items: Arc<dyn MultiAssetLedger>,
    pub native: Arc<dyn NativeCurrency>,
    pub tokens: TokenDirectory,
}

#[derive(Debug)]
struct IssuanceState {
    ownable: Ownable,
    total_supply: HashMap<ItemId, Amount>,
    native_balance: Amount,
}

impl IssuanceState {
    fn supply_of(&self, id: ItemId) -> Amount {
        self.total_supply.get(&id).copied().unwrap_or(0)
    }
}

pub struct IssuanceLedger {
    address: Address,
    params: IssuanceParams,
    host: IssuanceHost,
    state: Mutex<IssuanceState>,
    journal: EventJournal,
}

impl IssuanceLedger {
    /// Deploy a ledger at `address`, owned by `owner`
    pub fn new(
        address: Address,
        owner: Address,
        params: IssuanceParams,
        host: IssuanceHost,
    ) -> Result<Self> {
        if address.is_zero() || owner.is_zero() {
            return Err(IssuanceError::InvalidAddress);
        }
        params.validate()?;

        log::info!(
            "issuance ledger {} deployed: ids 0..={}, cap {} per id, payment token {}",
            address,
            params.max_id,
            params.cap_per_id,
            params.payment_token
        );

        Ok(Self {
            address,
            params,
            host,
            state: Mutex::new(IssuanceState {
                ownable: Ownable::new(owner),
                total_supply: HashMap::new(),
                native_balance: 0,
            }),
            journal: EventJournal::new(),
        })
    }

    /// Mint `amount` units of `id` to `caller`, paid with `paid_value` of
    /// native value. Any excess over the exact price is kept.
    pub fn mint_native(
        &self,
        caller: &Address,
        id: ItemId,
        amount: Amount,
        paid_value: Amount,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let next_supply = self.check_mint(&state, id, amount)?;
        let required = self
            .params
            .price_native
            .checked_mul(amount)
            .ok_or(IssuanceError::Overflow)?;
        if paid_value < required {
            return Err(IssuanceError::InsufficientPayment {
                required,
                paid: paid_value,
            });
        }
        let native_balance = state
            .native_balance
            .checked_add(paid_value)
            .ok_or(IssuanceError::Overflow)?;

        self.host.items.credit(caller, id, caller, amount)?;

        state.total_supply.insert(id, next_supply);
        state.native_balance = native_balance;
        self.record_issuance(caller, id, amount);

        log::info!(
            "minted {} of id {} to {} for {} native (supply {}/{})",
            amount,
            id,
            caller,
            paid_value,
            next_supply,
            self.params.cap_per_id
        );
        Ok(())
    }

    /// Mint `amount` units of `id` to `caller`, pulling the price from the
    /// caller's payment token balance. The caller must have approved this
    /// ledger's address for at least the price beforehand.
    pub fn mint_with_payment_token(
        &self,
        caller: &Address,
        id: ItemId,
        amount: Amount,
    ) -> Result<()> {
        let mut state = self.state.lock();

        let next_supply = self.check_mint(&state, id, amount)?;
        let cost = self
            .params
            .price_payment_token
            .checked_mul(amount)
            .ok_or(IssuanceError::Overflow)?;

        let token = self
            .host
            .tokens
            .resolve(&self.params.payment_token)
            .map_err(IssuanceError::PaymentTransferFailed)?;
        let approved = token.allowance(caller, &self.address);
        token
            .transfer_from(&self.address, caller, &self.address, cost)
            .map_err(IssuanceError::PaymentTransferFailed)?;

        if let Err(err) = self.host.items.credit(caller, id, caller, amount) {
            // Hand back the payment and the allowance the pull consumed
            let refund = token
                .transfer(&self.address, caller, cost)
                .and_then(|_| token.approve(caller, &self.address, approved));
            if let Err(refund_err) = refund {
                log::error!(
                    "refund of {} payment token to {} failed: {}",
                    cost,
                    caller,
                    refund_err
                );
            }
            return Err(err.into());
        }

        state.total_supply.insert(id, next_supply);
        self.record_issuance(caller, id, amount);

        log::info!(
            "minted {} of id {} to {} for {} payment token (supply {}/{})",
            amount,
            id,
            caller,
            cost,
            next_supply,
            self.params.cap_per_id
        );
        Ok(())
    }

    /// Send `amount` of held native value to the owner
    pub fn withdraw_native(&self, caller: &Address, amount: Amount) -> Result<()> {
        let mut state = self.state.lock();
        let owner = self.authorize(&state, caller, "withdraw_native")?;

        if amount > state.native_balance {
            return Err(IssuanceError::InsufficientBalance {
                requested: amount,
                available: state.native_balance,
            });
        }

        self.host.native.send(&owner, amount)?;
        state.native_balance -= amount;

        self.journal.record(LedgerEvent::NativeWithdrawn { to: owner, amount });
        log::info!("withdrew {} native to owner {}", amount, owner);
        Ok(())
    }

    /// Send `amount` of any fungible token held by this ledger to the owner.
    /// Not limited to the configured payment token, so stray deposits of
    /// other tokens can be recovered.
    pub fn withdraw_payment_token(
        &self,
        caller: &Address,
        token_address: &Address,
        amount: Amount,
    ) -> Result<()> {
        let state = self.state.lock();
        let owner = self.authorize(&state, caller, "withdraw_payment_token")?;

        let token = self.host.tokens.resolve(token_address)?;
        let available = token.balance_of(&self.address);
        if amount > available {
            return Err(IssuanceError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        token.transfer(&self.address, &owner, amount)?;

        self.journal.record(LedgerEvent::TokenWithdrawn {
            token: *token_address,
            to: owner,
            amount,
        });
        log::info!(
            "withdrew {} of token {} to owner {}",
            amount,
            token_address,
            owner
        );
        Ok(())
    }

    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<()> {
        let mut state = self.state.lock();
        let previous = state.ownable.transfer_ownership(new_owner, caller)?;
        self.journal.record(LedgerEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        log::info!("ownership of {} moved from {} to {}", self.address, previous, new_owner);
        Ok(())
    }

    pub fn renounce_ownership(&self, caller: &Address) -> Result<()> {
        let mut state = self.state.lock();
        let previous = state.ownable.renounce_ownership(caller)?;
        self.journal.record(LedgerEvent::OwnershipTransferred {
            previous,
            new: Address::ZERO,
        });
        log::warn!("ownership of {} renounced by {}", self.address, previous);
        Ok(())
    }

    // Views

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.state.lock().ownable.owner()
    }

    pub fn params(&self) -> &IssuanceParams {
        &self.params
    }

    pub fn max_id(&self) -> ItemId {
        self.params.max_id
    }

    pub fn cap_per_id(&self) -> Amount {
        self.params.cap_per_id
    }

    pub fn price_native(&self) -> Amount {
        self.params.price_native
    }

    pub fn price_payment_token(&self) -> Amount {
        self.params.price_payment_token
    }

    pub fn payment_token(&self) -> Address {
        self.params.payment_token
    }

    /// Units minted so far for `id`; 0 for unminted or out-of-range ids
    pub fn total_supply(&self, id: ItemId) -> Amount {
        self.state.lock().supply_of(id)
    }

    pub fn exists(&self, id: ItemId) -> bool {
        self.total_supply(id) > 0
    }

    pub fn balance_of(&self, owner: &Address, id: ItemId) -> Amount {
        self.host.items.balance_of(owner, id)
    }

    /// Native value currently held
    pub fn native_balance(&self) -> Amount {
        self.state.lock().native_balance
    }

    /// Metadata URI for `id`, with `{id}` expanded to 64 lowercase hex digits
    pub fn uri(&self, id: ItemId) -> String {
        self.params
            .metadata_uri
            .replace(URI_ID_PLACEHOLDER, &format!("{:064x}", id))
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.journal.events()
    }

    /// Shared mint preconditions. Returns the supply `id` will have after
    /// the mint.
    fn check_mint(&self, state: &IssuanceState, id: ItemId, amount: Amount) -> Result<Amount> {
        if id > self.params.max_id {
            return Err(IssuanceError::InvalidIdentifier {
                id,
                max_id: self.params.max_id,
            });
        }
        if amount == 0 {
            return Err(IssuanceError::InvalidAmount(
                "mint amount must be positive".to_string(),
            ));
        }

        let minted = state.supply_of(id);
        match minted.checked_add(amount) {
            Some(next) if next <= self.params.cap_per_id => Ok(next),
            _ => Err(IssuanceError::SupplyExceeded {
                id,
                minted,
                requested: amount,
                cap: self.params.cap_per_id,
            }),
        }
    }

    fn authorize(&self, state: &IssuanceState, caller: &Address, action: &str) -> Result<Address> {
        if let Err(err) = state.ownable.ensure_owner(caller) {
            log::warn!("{} rejected: {} is not the owner of {}", action, caller, self.address);
            return Err(err.into());
        }
        Ok(state.ownable.owner())
    }

    fn record_issuance(&self, caller: &Address, id: ItemId, amount: Amount) {
        self.journal.record(LedgerEvent::TransferSingle {
            operator: *caller,
            from: None,
            to: *caller,
            id,
            amount,
        });
    }
}

impl std::fmt::Debug for IssuanceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceLedger")
            .field("address", &self.address)
            .field("params", &self.params)
            .field("state", &*self.state.lock())
            .finish()
    }
}
