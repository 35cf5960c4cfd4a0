//! FanLedger Presale
//!
//! Fixed-supply token released from a treasury under a pausable, capped
//! presale policy.

pub mod distributor;
pub mod error;

pub use distributor::{PresaleDistributor, SaleState};
pub use error::{PresaleError, Result};

use fanledger_core::{units, Amount};

/// Fractional digits of the presale token
pub const DECIMALS: u32 = fanledger_core::DECIMALS;

/// Total fixed supply (1,000,000,000 tokens), minted to the treasury
pub const TOKEN_AMOUNT: Amount = units(1_000_000_000);

/// Cumulative cap on presale distribution (3,000,000 tokens)
pub const LIMIT_PRESALE: Amount = units(3_000_000);
