//! Presale distribution ledger
//!
//! A fixed-supply token minted in full to a treasury at creation. While the
//! presale runs the owner pushes treasury funds to buyers through an
//! allowance the treasury granted the owner, until the presale cap is hit.
//! Ordinary transfers are blocked while paused; distribution is not.
//!
//! Token movements are recorded by the token ledger itself. The distributor
//! journal only carries sale administration: pause changes, the crowdsale
//! address and ownership moves.

use crate::error::{PresaleError, Result};
use crate::{DECIMALS, LIMIT_PRESALE, TOKEN_AMOUNT};
use fanledger_core::{
    Address, Amount, AssetError, EventJournal, FungibleLedger, LedgerEvent, MintableLedger,
    Ownable,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pause state of the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleState {
    Paused,
    Active,
}

#[derive(Debug)]
struct PresaleState {
    ownable: Ownable,
    tokens_distributed_presale: Amount,
    crowdsale_address: Address,
    sale_state: SaleState,
}

pub struct PresaleDistributor {
    address: Address,
    name: String,
    symbol: String,
    treasury_address: Address,
    token: Arc<dyn MintableLedger>,
    state: Mutex<PresaleState>,
    journal: EventJournal,
}

impl PresaleDistributor {
    /// Create the token at `address`, owned by `owner`, and mint the whole
    /// supply to `treasury_address`. Starts paused.
    pub fn new(
        address: Address,
        owner: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        treasury_address: Address,
        token: Arc<dyn MintableLedger>,
    ) -> Result<Self> {
        if address.is_zero() || owner.is_zero() || treasury_address.is_zero() {
            return Err(PresaleError::InvalidAddress);
        }

        token.mint(&treasury_address, TOKEN_AMOUNT)?;

        let name = name.into();
        let symbol = symbol.into();
        log::info!(
            "{} ({}) created at {}: {} minted to treasury {}",
            name,
            symbol,
            address,
            TOKEN_AMOUNT,
            treasury_address
        );

        Ok(Self {
            address,
            name,
            symbol,
            treasury_address,
            token,
            state: Mutex::new(PresaleState {
                ownable: Ownable::new(owner),
                tokens_distributed_presale: 0,
                crowdsale_address: Address::ZERO,
                sale_state: SaleState::Paused,
            }),
            journal: EventJournal::new(),
        })
    }

    pub fn pause(&self, caller: &Address) -> Result<()> {
        self.set_sale_state(caller, SaleState::Paused)
    }

    pub fn unpause(&self, caller: &Address) -> Result<()> {
        self.set_sale_state(caller, SaleState::Active)
    }

    pub fn set_crowdsale_address(&self, caller: &Address, crowdsale: Address) -> Result<()> {
        let mut state = self.state.lock();
        self.authorize(&state, caller, "set_crowdsale_address")?;

        if crowdsale.is_zero() {
            return Err(PresaleError::InvalidAddress);
        }

        state.crowdsale_address = crowdsale;
        self.journal
            .record(LedgerEvent::CrowdsaleAddressSet { address: crowdsale });
        log::info!("crowdsale address set to {}", crowdsale);
        Ok(())
    }

    /// Move `amount` from the treasury to `buyer` using the allowance the
    /// treasury granted the owner. Works whether or not the token is paused.
    pub fn distribute_presale_tokens(
        &self,
        caller: &Address,
        buyer: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let owner = self.authorize(&state, caller, "distribute_presale_tokens")?;

        if buyer.is_zero() {
            return Err(PresaleError::InvalidRecipient);
        }
        if amount == 0 || amount > LIMIT_PRESALE {
            return Err(PresaleError::OutOfLimit {
                amount,
                limit: LIMIT_PRESALE,
            });
        }

        let distributed = state.tokens_distributed_presale;
        // amount <= LIMIT_PRESALE and distributed <= LIMIT_PRESALE, so no overflow
        if distributed + amount > LIMIT_PRESALE {
            return Err(PresaleError::LimitExceeded {
                requested: amount,
                distributed,
                limit: LIMIT_PRESALE,
            });
        }

        self.token
            .transfer_from(&owner, &self.treasury_address, buyer, amount)
            .map_err(|err| match err {
                AssetError::InsufficientAllowance {
                    requested,
                    approved,
                    ..
                } => PresaleError::AllowanceExceeded {
                    requested,
                    approved,
                },
                other => PresaleError::Token(other),
            })?;

        state.tokens_distributed_presale = distributed + amount;

        log::info!(
            "distributed {} presale tokens to {} ({}/{})",
            amount,
            buyer,
            state.tokens_distributed_presale,
            LIMIT_PRESALE
        );
        Ok(())
    }

    /// Ordinary transfer; rejected while paused
    pub fn transfer(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        let state = self.state.lock();
        Self::ensure_active(&state)?;

        self.token.transfer(caller, to, amount)?;
        Ok(())
    }

    /// Allowance-based transfer; rejected while paused
    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let state = self.state.lock();
        Self::ensure_active(&state)?;

        self.token.transfer_from(caller, from, to, amount)?;
        Ok(())
    }

    /// Grant `spender` an allowance over the caller's balance. Allowed while
    /// paused, so the treasury can authorize the owner before the sale opens.
    pub fn approve(&self, caller: &Address, spender: &Address, amount: Amount) -> Result<()> {
        let _state = self.state.lock();
        self.token.approve(caller, spender, amount)?;
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u32 {
        DECIMALS
    }

    pub fn total_supply(&self) -> Amount {
        self.token.total_supply()
    }

    pub fn token_amount(&self) -> Amount {
        TOKEN_AMOUNT
    }

    pub fn limit_presale(&self) -> Amount {
        LIMIT_PRESALE
    }

    pub fn treasury_address(&self) -> Address {
        self.treasury_address
    }

    pub fn owner(&self) -> Address {
        self.state.lock().ownable.owner()
    }

    pub fn tokens_distributed_presale(&self) -> Amount {
        self.state.lock().tokens_distributed_presale
    }

    pub fn remaining_presale(&self) -> Amount {
        LIMIT_PRESALE - self.tokens_distributed_presale()
    }

    /// `Address::ZERO` until the owner sets one
    pub fn crowdsale_address(&self) -> Address {
        self.state.lock().crowdsale_address
    }

    pub fn sale_state(&self) -> SaleState {
        self.state.lock().sale_state
    }

    pub fn paused(&self) -> bool {
        self.sale_state() == SaleState::Paused
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.token.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.token.allowance(owner, spender)
    }

    /// Sale administration events; transfers live in the token's own journal
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.journal.events()
    }

    fn set_sale_state(&self, caller: &Address, target: SaleState) -> Result<()> {
        let mut state = self.state.lock();
        let action = match target {
            SaleState::Paused => "pause",
            SaleState::Active => "unpause",
        };
        self.authorize(&state, caller, action)?;

        if state.sale_state == target {
            return Ok(());
        }

        state.sale_state = target;
        let event = match target {
            SaleState::Paused => LedgerEvent::Paused { account: *caller },
            SaleState::Active => LedgerEvent::Unpaused { account: *caller },
        };
        self.journal.record(event);
        log::info!("{} {}d by {}", self.symbol, action, caller);
        Ok(())
    }

    fn ensure_active(state: &PresaleState) -> Result<()> {
        match state.sale_state {
            SaleState::Active => Ok(()),
            SaleState::Paused => Err(PresaleError::Paused),
        }
    }

    fn authorize(&self, state: &PresaleState, caller: &Address, action: &str) -> Result<Address> {
        if let Err(err) = state.ownable.ensure_owner(caller) {
            log::warn!("{} rejected: {} is not the owner of {}", action, caller, self.address);
            return Err(err.into());
        }
        Ok(state.ownable.owner())
    }
}

impl std::fmt::Debug for PresaleDistributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresaleDistributor")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("treasury_address", &self.treasury_address)
            .field("state", &*self.state.lock())
            .finish()
    }
}
