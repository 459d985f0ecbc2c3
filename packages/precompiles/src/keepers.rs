//! Ledger module interfaces
//!
//! The precompiles never own ledger state. Every read and write goes through
//! these keepers against the storage handle of the current call, so a host can
//! plug in its own bank, authz and transfer modules.

use crate::authz::Grant;
use crate::packet::TransferPacket;
use crate::types::{Coin, Metadata};
use cosmwasm_std::{BlockInfo, CanonicalAddr, StdResult, Storage, Uint256};

/// Balances, supply and denomination metadata.
pub trait BankKeeper {
    /// Registered metadata for `denom`, if any.
    fn denom_metadata(&self, storage: &dyn Storage, denom: &str) -> StdResult<Option<Metadata>>;

    fn supply(&self, storage: &dyn Storage, denom: &str) -> StdResult<Uint256>;

    fn balance(
        &self,
        storage: &dyn Storage,
        account: &CanonicalAddr,
        denom: &str,
    ) -> StdResult<Uint256>;

    /// Move `coin` between accounts. Fails without side effects on
    /// insufficient funds.
    fn send(
        &self,
        storage: &mut dyn Storage,
        from: &CanonicalAddr,
        to: &CanonicalAddr,
        coin: &Coin,
    ) -> StdResult<()>;
}

/// Authorization grants, one per (grantee, granter, message type).
pub trait AuthzKeeper {
    fn grant(
        &self,
        storage: &dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        msg_type_url: &str,
    ) -> StdResult<Option<Grant>>;

    /// Create or replace the grant for the authorization's message type.
    fn save_grant(
        &self,
        storage: &mut dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        grant: &Grant,
    ) -> StdResult<()>;

    /// Remove a grant. Removing a grant that does not exist is not an error.
    fn delete_grant(
        &self,
        storage: &mut dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        msg_type_url: &str,
    ) -> StdResult<()>;
}

/// Outbound ICS-20 transfers.
pub trait TransferKeeper {
    /// Escrow the packet's token and queue the packet, returning its sequence.
    ///
    /// The packet has already passed `validate_basic`.
    fn send_transfer(
        &self,
        storage: &mut dyn Storage,
        block: &BlockInfo,
        packet: &TransferPacket,
    ) -> StdResult<u64>;
}
