//! Error types for the precompiles
//!
//! Every handler returns [`PrecompileError`]. The dispatcher turns it into an
//! ABI `Error(string)` revert before anything crosses back into the EVM.

use cosmwasm_std::{StdError, Uint256};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PrecompileError {
    /// Failure reported by a ledger keeper.
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Decode Errors
    // ========================================================================

    #[error("invalid number of arguments; expected {expected}; got: {got}")]
    ArityError { expected: usize, got: usize },

    #[error("invalid argument at position {index}: expected {expected}, got {got}")]
    TypeError {
        index: usize,
        expected: String,
        got: String,
    },

    #[error("invalid calldata for {method}: {reason}")]
    InvalidCalldata { method: String, reason: String },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================

    #[error("unknown method: 0x{selector}")]
    UnknownMethod { selector: String },

    #[error("invalid method table: {reason}")]
    InvalidMethodTable { reason: String },

    #[error("write protection: {method} cannot be called in a read-only context")]
    WriteProtection { method: String },

    // ========================================================================
    // Denomination Errors
    // ========================================================================

    #[error("denomination metadata not found: {denom}")]
    MetadataNotFound { denom: String },

    #[error("uint8 overflow: invalid decimals {exponent} for {denom}")]
    PrecisionOverflow { denom: String, exponent: u32 },

    // ========================================================================
    // Address Errors
    // ========================================================================

    #[error("invalid receiver address {address}: {reason}")]
    InvalidReceiver { address: String, reason: String },

    #[error("invalid address format: {reason}")]
    InvalidAddressFormat { reason: String },

    #[error("origin address {origin} is not the same as sender address {sender}")]
    DifferentOrigin { origin: String, sender: String },

    // ========================================================================
    // Coin & Packet Errors
    // ========================================================================

    #[error("invalid coin: {reason}")]
    InvalidCoin { reason: String },

    #[error("invalid transfer packet: {reason}")]
    InvalidPacket { reason: String },

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("invalid authorization: {reason}")]
    InvalidAuthorization { reason: String },

    #[error("invalid grantee: the zero address cannot be granted an allowance")]
    EmptyGrantee,

    #[error("allowance exceeded for {denom}: allowance {allowance}, requested {requested}")]
    AllowanceExceeded {
        denom: String,
        allowance: Uint256,
        requested: Uint256,
    },
}

impl PrecompileError {
    /// Reason string handed back to the EVM caller.
    ///
    /// Keeper failures are reported without the `StdError` variant name so the
    /// ledger's internal error type never leaks across the boundary.
    pub fn revert_reason(&self) -> String {
        match self {
            PrecompileError::Std(err) => {
                format!("ledger operation failed: {}", std_error_message(err))
            }
            other => other.to_string(),
        }
    }
}

fn std_error_message(err: &StdError) -> String {
    match err {
        StdError::GenericErr { msg, .. } => msg.clone(),
        StdError::NotFound { kind, .. } => format!("{} not found", kind),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_error_message() {
        let err = PrecompileError::ArityError {
            expected: 1,
            got: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid number of arguments; expected 1; got: 0"
        );
    }

    #[test]
    fn test_revert_reason_hides_std_variant() {
        let err = PrecompileError::from(StdError::generic_err("insufficient funds"));
        assert_eq!(
            err.revert_reason(),
            "ledger operation failed: insufficient funds"
        );

        let err = PrecompileError::EmptyGrantee;
        assert_eq!(err.revert_reason(), err.to_string());
    }
}
