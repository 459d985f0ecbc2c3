//! Ledger-side types shared by the precompiles
//!
//! These mirror the shapes of the native bank and IBC modules closely enough
//! for the keepers to persist them, while staying independent of any
//! particular ledger implementation.

use alloy::primitives::{I256, U256};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;
use std::fmt;

// ============================================================================
// Coins
// ============================================================================

/// A ledger coin: a denomination and a non-negative amount.
#[cw_serde]
pub struct Coin {
    pub denom: String,
    pub amount: Uint256,
}

impl Coin {
    pub fn new(amount: impl Into<Uint256>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// Build a coin from an EVM amount. Unsigned words keep their full range;
    /// signed ones go through [`Coin::from_signed`].
    pub fn from_amount(denom: &str, amount: Amount) -> Result<Self, String> {
        match amount {
            Amount::Unsigned(amount) => Ok(Self::new(u256_to_uint256(amount), denom)),
            Amount::Signed(amount) => Self::from_signed(denom, amount),
        }
    }

    /// Build a coin from a loosely typed signed amount.
    ///
    /// Returns the reason as a string so callers can wrap it in the error kind
    /// that fits their context (coin vs. authorization validation).
    pub fn from_signed(denom: &str, amount: I256) -> Result<Self, String> {
        let amount = signed_to_uint256(amount)
            .ok_or_else(|| format!("negative coin amount: {}", amount))?;
        Ok(Self::new(amount, denom))
    }

    /// Checks the denomination and that the amount is representable.
    ///
    /// A zero amount is valid here; positivity is checked where it matters
    /// (packets and spend limits).
    pub fn validate(&self) -> Result<(), String> {
        validate_denom(&self.denom)
    }

    pub fn is_positive(&self) -> bool {
        !self.amount.is_zero()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// An integer amount as it arrives from the EVM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// A `uint256` word
    Unsigned(U256),
    /// An `int256` word, possibly negative
    Signed(I256),
}

impl Amount {
    pub fn is_negative(&self) -> bool {
        matches!(self, Amount::Signed(amount) if amount.is_negative())
    }
}

impl From<U256> for Amount {
    fn from(amount: U256) -> Self {
        Amount::Unsigned(amount)
    }
}

impl From<I256> for Amount {
    fn from(amount: I256) -> Self {
        Amount::Signed(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Unsigned(amount) => write!(f, "{}", amount),
            Amount::Signed(amount) => write!(f, "{}", amount),
        }
    }
}

/// Validate a ledger denomination: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), String> {
    if denom.is_empty() {
        return Err("denomination cannot be empty".to_string());
    }

    let len = denom.len();
    if !(3..=128).contains(&len) {
        return Err(format!(
            "invalid denom {}: length must be between 3 and 128, got {}",
            denom, len
        ));
    }

    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(format!("invalid denom {}: must start with a letter", denom));
    }

    if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || "/:._-".contains(*c))) {
        return Err(format!("invalid denom {}: unexpected character '{}'", denom, c));
    }

    Ok(())
}

// ============================================================================
// Denomination Metadata
// ============================================================================

/// Bank module metadata registered for a denomination.
#[cw_serde]
pub struct Metadata {
    pub description: String,
    /// Units ordered from the base unit upwards
    pub denom_units: Vec<DenomUnit>,
    /// The base denom (the unit with exponent 0)
    pub base: String,
    /// The unit clients should display
    pub display: String,
    pub name: String,
    pub symbol: String,
}

#[cw_serde]
pub struct DenomUnit {
    pub denom: String,
    /// 1 unit = 10^exponent base units
    pub exponent: u32,
    #[serde(default)]
    pub aliases: Vec<String>,
}

// ============================================================================
// IBC Height
// ============================================================================

/// IBC client height used for packet timeouts.
#[cw_serde]
#[derive(Copy, Eq, Default)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Parse the revision number out of a chain id in `{name}-{revision}` format.
///
/// Chain ids that are not in revision format (no dash, empty name, non-numeric
/// or zero-prefixed suffix) have revision 0.
pub fn parse_revision_number(chain_id: &str) -> u64 {
    let Some((name, revision)) = chain_id.rsplit_once('-') else {
        return 0;
    };

    if name.is_empty()
        || revision.is_empty()
        || revision.starts_with('0')
        || !revision.chars().all(|c| c.is_ascii_digit())
    {
        return 0;
    }

    revision.parse().unwrap_or(0)
}

// ============================================================================
// Integer Conversions
// ============================================================================

/// Convert a ledger amount into an EVM word.
pub fn uint256_to_u256(amount: Uint256) -> U256 {
    U256::from_be_bytes(amount.to_be_bytes())
}

/// Convert an EVM word into a ledger amount.
pub fn u256_to_uint256(amount: U256) -> Uint256 {
    Uint256::from_be_bytes(amount.to_be_bytes::<32>())
}

/// Convert a signed EVM integer into a ledger amount, `None` when negative.
pub fn signed_to_uint256(amount: I256) -> Option<Uint256> {
    if amount.is_negative() {
        return None;
    }
    Some(u256_to_uint256(amount.into_raw()))
}
