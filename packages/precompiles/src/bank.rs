//! Balance/Supply Accessor

use crate::address_codec::to_canonical;
use crate::error::PrecompileError;
use crate::keepers::BankKeeper;
use alloy::primitives::Address;
use cosmwasm_std::{Storage, Uint256};

/// Ledger-wide supply of `denom`.
pub fn total_supply<B: BankKeeper>(
    bank: &B,
    storage: &dyn Storage,
    denom: &str,
) -> Result<Uint256, PrecompileError> {
    Ok(bank.supply(storage, denom)?)
}

/// Balance of the ledger account behind an EVM address.
pub fn balance_of<B: BankKeeper>(
    bank: &B,
    storage: &dyn Storage,
    account: &Address,
    denom: &str,
) -> Result<Uint256, PrecompileError> {
    Ok(bank.balance(storage, &to_canonical(account), denom)?)
}
