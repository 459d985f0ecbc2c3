//! EVM ⇄ Ledger Address Encoding
//!
//! An EVM account maps onto a ledger account by reinterpreting its 20 raw
//! bytes; no hashing is involved. Human-readable ledger addresses are bech32
//! under a chain-specific prefix (`evmos1...`, `osmo1...`).
//!
//! ## Format
//!
//! ```text
//! 0x1234...abcd  <->  CanonicalAddr(0x1234...abcd)  <->  evmos1zg69v7y...
//! ```

use crate::error::PrecompileError;
use alloy::primitives::Address;
use bech32::{self, FromBase32, ToBase32, Variant};
use cosmwasm_std::CanonicalAddr;

/// Upper bound the ledger places on raw account identifiers
pub const MAX_ADDR_LEN: usize = 255;

// ============================================================================
// EVM <-> Canonical
// ============================================================================

/// Reinterpret an EVM address as a ledger account identifier.
pub fn to_canonical(address: &Address) -> CanonicalAddr {
    CanonicalAddr::from(address.as_slice())
}

/// Reinterpret a 20-byte ledger account identifier as an EVM address.
///
/// Returns `None` for identifiers of any other length (e.g. 32-byte module
/// or contract accounts), which have no EVM counterpart.
pub fn from_canonical(canonical: &CanonicalAddr) -> Option<Address> {
    let bytes = canonical.as_slice();
    if bytes.len() != 20 {
        return None;
    }
    Some(Address::from_slice(bytes))
}

// ============================================================================
// Bech32
// ============================================================================

/// Decode a bech32 address into its prefix and raw bytes.
///
/// Only the classic bech32 checksum is accepted (not bech32m), as used by Cosmos
/// SDK account addresses.
pub fn decode_bech32(address: &str) -> Result<(String, Vec<u8>), String> {
    let (hrp, data, variant) =
        bech32::decode(address).map_err(|e| format!("decoding bech32 failed: {}", e))?;

    if variant != Variant::Bech32 {
        return Err("bech32m addresses are not supported".to_string());
    }

    let bytes =
        Vec::<u8>::from_base32(&data).map_err(|e| format!("invalid base32 data: {}", e))?;

    Ok((hrp, bytes))
}

/// Encode raw bytes as a bech32 address under the given prefix.
pub fn encode_bech32(bytes: &[u8], hrp: &str) -> Result<String, PrecompileError> {
    bech32::encode(hrp, bytes.to_base32(), Variant::Bech32).map_err(|e| {
        PrecompileError::InvalidAddressFormat {
            reason: format!("failed to encode bech32 with prefix {}: {}", hrp, e),
        }
    })
}

/// Encode an EVM address as a ledger account under the given prefix.
pub fn evm_to_bech32(address: &Address, hrp: &str) -> Result<String, PrecompileError> {
    encode_bech32(address.as_slice(), hrp)
}

/// Discover the human-readable prefix of a bech32 address.
pub fn bech32_prefix(address: &str) -> Result<String, PrecompileError> {
    let (hrp, _) = decode_bech32(address).map_err(|reason| PrecompileError::InvalidReceiver {
        address: address.to_string(),
        reason,
    })?;

    if hrp.is_empty() {
        return Err(PrecompileError::InvalidReceiver {
            address: address.to_string(),
            reason: "empty bech32 prefix".to_string(),
        });
    }

    Ok(hrp)
}

/// Parse a bech32 account address, requiring the expected prefix.
pub fn acc_address_from_bech32(
    address: &str,
    expected_prefix: &str,
) -> Result<CanonicalAddr, PrecompileError> {
    if address.trim().is_empty() {
        return Err(PrecompileError::InvalidAddressFormat {
            reason: "empty address string is not allowed".to_string(),
        });
    }

    let (hrp, bytes) =
        decode_bech32(address).map_err(|reason| PrecompileError::InvalidAddressFormat { reason })?;

    if hrp != expected_prefix {
        return Err(PrecompileError::InvalidAddressFormat {
            reason: format!(
                "invalid Bech32 prefix; expected {}, got {}",
                expected_prefix, hrp
            ),
        });
    }

    verify_address_format(&bytes)?;
    Ok(CanonicalAddr::from(bytes.as_slice()))
}

/// Ledger-level sanity check on raw account bytes.
pub fn verify_address_format(bytes: &[u8]) -> Result<(), PrecompileError> {
    if bytes.is_empty() {
        return Err(PrecompileError::InvalidAddressFormat {
            reason: "addresses cannot be empty".to_string(),
        });
    }

    if bytes.len() > MAX_ADDR_LEN {
        return Err(PrecompileError::InvalidAddressFormat {
            reason: format!(
                "address max length is {}, got {}",
                MAX_ADDR_LEN,
                bytes.len()
            ),
        });
    }

    Ok(())
}
