//! In-memory reference ledgers
//!
//! Used for tests and development deployments, where no real multi-asset
//! ledger or payment token contract is available. Each ledger is a
//! `parking_lot` guarded map and records the notifications a real contract
//! would emit.

use crate::address::Address;
use crate::assets::{FungibleLedger, MintableLedger, MultiAssetLedger, NativeCurrency};
use crate::error::{AssetError, Result};
use crate::events::{EventJournal, LedgerEvent};
use crate::{Amount, ItemId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Multi-identifier item balances
#[derive(Debug, Default)]
pub struct MemoryItemLedger {
    balances: RwLock<HashMap<(Address, ItemId), Amount>>,
    journal: EventJournal,
}

impl MemoryItemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }
}

impl MultiAssetLedger for MemoryItemLedger {
    fn credit(&self, operator: &Address, id: ItemId, owner: &Address, amount: Amount) -> Result<()> {
        if owner.is_zero() {
            return Err(AssetError::InvalidReceiver(*owner));
        }

        let mut balances = self.balances.write();
        let balance = balances.entry((*owner, id)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AssetError::Overflow)?;
        drop(balances);

        self.journal.record(LedgerEvent::TransferSingle {
            operator: *operator,
            from: None,
            to: *owner,
            id,
            amount,
        });
        Ok(())
    }

    fn balance_of(&self, owner: &Address, id: ItemId) -> Amount {
        self.balances.read().get(&(*owner, id)).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct TokenBook {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenBook {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(AssetError::InvalidReceiver(*to));
        }

        let available = self.balance(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: *from,
                requested: amount,
                available,
            });
        }
        // Self-transfers leave the balance untouched
        if from == to {
            return Ok(());
        }

        let credited = self.balance(to).checked_add(amount).ok_or(AssetError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

/// Fungible token with allowances, standing in for a payment token or the
/// presale token itself
#[derive(Debug)]
pub struct MemoryToken {
    address: Address,
    book: RwLock<TokenBook>,
    journal: EventJournal,
}

impl MemoryToken {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            book: RwLock::new(TokenBook::default()),
            journal: EventJournal::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }
}

impl FungibleLedger for MemoryToken {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.book.read().balance(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.book.read().allowance(owner, spender)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.book.write().move_balance(from, to, amount)?;
        self.journal.record(LedgerEvent::Transfer {
            from: Some(*from),
            to: *to,
            amount,
        });
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut book = self.book.write();

        let approved = book.allowance(from, spender);
        if approved < amount {
            return Err(AssetError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                requested: amount,
                approved,
            });
        }

        // Move first so a failed move leaves the allowance intact
        book.move_balance(from, to, amount)?;
        book.allowances.insert((*from, *spender), approved - amount);
        drop(book);

        self.journal.record(LedgerEvent::Transfer {
            from: Some(*from),
            to: *to,
            amount,
        });
        Ok(())
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        if spender.is_zero() {
            return Err(AssetError::InvalidReceiver(*spender));
        }
        self.book.write().allowances.insert((*owner, *spender), amount);
        self.journal.record(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }
}

impl MintableLedger for MemoryToken {
    fn mint(&self, to: &Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(AssetError::InvalidReceiver(*to));
        }

        let mut book = self.book.write();
        let total_supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        let balance = book.balance(to).checked_add(amount).ok_or(AssetError::Overflow)?;
        book.total_supply = total_supply;
        book.balances.insert(*to, balance);
        drop(book);

        self.journal.record(LedgerEvent::Transfer {
            from: None,
            to: *to,
            amount,
        });
        Ok(())
    }

    fn total_supply(&self) -> Amount {
        self.book.read().total_supply
    }
}

/// Native value held per account
#[derive(Debug, Default)]
pub struct MemoryNativeBank {
    balances: RwLock<HashMap<Address, Amount>>,
}

impl MemoryNativeBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NativeCurrency for MemoryNativeBank {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.read().get(account).copied().unwrap_or(0)
    }

    fn send(&self, to: &Address, amount: Amount) -> Result<()> {
        if to.is_zero() {
            return Err(AssetError::InvalidReceiver(*to));
        }
        let mut balances = self.balances.write();
        let balance = balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AssetError::Overflow)?;
        Ok(())
    }
}
