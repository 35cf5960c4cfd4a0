//! FanLedger Core Library
//!
//! Shared vocabulary for the issuance and presale ledgers:
//! - Addresses and amounts
//! - Owner-gated access control
//! - Capabilities of the external balance ledgers
//! - Event journal
//! - In-memory reference ledgers for tests and development deployments

pub mod address;
pub mod assets;
pub mod error;
pub mod events;
pub mod memory;
pub mod ownable;

pub use address::{Address, AddressError, ADDRESS_LEN};
pub use assets::{FungibleLedger, MintableLedger, MultiAssetLedger, NativeCurrency, TokenDirectory};
pub use error::{AssetError, Result};
pub use events::{EventJournal, LedgerEvent};
pub use memory::{MemoryItemLedger, MemoryNativeBank, MemoryToken};
pub use ownable::{Ownable, OwnershipError};

/// Base-unit quantity of any asset
pub type Amount = u128;

/// Identifier of one sellable item type
pub type ItemId = u64;

/// Fractional digits of an 18-decimal token
pub const DECIMALS: u32 = 18;

/// One whole token in base units
pub const UNIT: Amount = 10u128.pow(DECIMALS);

/// Convert whole tokens into base units
pub const fn units(whole: u128) -> Amount {
    whole * UNIT
}
