//! Denomination Resolver
//!
//! Display name, symbol and decimals for a ledger denomination. Registered
//! bank metadata wins. Without it a best-effort convention applies: the first
//! character is a unit prefix (`u` micro, `a` atto) and the rest is the asset
//! name. IBC trace denominations are not resolved to their base denomination.

use crate::error::PrecompileError;
use crate::keepers::BankKeeper;
use cosmwasm_std::Storage;

/// Denom with its unit prefix stripped, e.g. `uatom` -> `atom`.
fn base_name(denom: &str) -> Result<&str, PrecompileError> {
    let mut chars = denom.char_indices();
    let rest = match (chars.next(), chars.next()) {
        (Some(_), Some((start, _))) => &denom[start..],
        _ => "",
    };

    if rest.is_empty() {
        return Err(PrecompileError::MetadataNotFound {
            denom: denom.to_string(),
        });
    }
    Ok(rest)
}

pub fn name<B: BankKeeper>(
    bank: &B,
    storage: &dyn Storage,
    denom: &str,
) -> Result<String, PrecompileError> {
    if let Some(metadata) = bank.denom_metadata(storage, denom)? {
        return Ok(metadata.name);
    }

    let base = base_name(denom)?;
    let mut chars = base.chars();
    Ok(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    })
}

pub fn symbol<B: BankKeeper>(
    bank: &B,
    storage: &dyn Storage,
    denom: &str,
) -> Result<String, PrecompileError> {
    if let Some(metadata) = bank.denom_metadata(storage, denom)? {
        return Ok(metadata.symbol);
    }

    Ok(base_name(denom)?.to_uppercase())
}

/// Decimal precision: the exponent of the display unit when metadata is
/// registered, otherwise inferred from the unit prefix.
pub fn decimals<B: BankKeeper>(
    bank: &B,
    storage: &dyn Storage,
    denom: &str,
) -> Result<u8, PrecompileError> {
    let not_found = || PrecompileError::MetadataNotFound {
        denom: denom.to_string(),
    };

    let Some(metadata) = bank.denom_metadata(storage, denom)? else {
        return match denom.chars().next() {
            Some('u') => Ok(6),
            Some('a') => Ok(18),
            _ => Err(not_found()),
        };
    };

    let unit = metadata
        .denom_units
        .iter()
        .rev()
        .find(|unit| unit.denom == metadata.display)
        .ok_or_else(not_found)?;

    u8::try_from(unit.exponent).map_err(|_| PrecompileError::PrecisionOverflow {
        denom: denom.to_string(),
        exponent: unit.exponent,
    })
}
