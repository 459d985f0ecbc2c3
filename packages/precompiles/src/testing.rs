//! In-memory ledger modules
//!
//! Reference implementations of the keeper traits over `cw-storage-plus`
//! maps. All state lives in the storage handle passed to each call, so the
//! keepers themselves are stateless unit structs.

use crate::address_codec::decode_bech32;
use crate::authz::Grant;
use crate::keepers::{AuthzKeeper, BankKeeper, TransferKeeper};
use crate::packet::TransferPacket;
use crate::types::{Coin, Metadata};
use alloy::primitives::keccak256;
use cosmwasm_std::{BlockInfo, CanonicalAddr, StdError, StdResult, Storage, Uint256};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Bank
// ============================================================================

/// Balances by (account, denom)
const BALANCES: Map<(&[u8], &str), Uint256> = Map::new("bank_balances");

/// Total supply by denom
const SUPPLY: Map<&str, Uint256> = Map::new("bank_supply");

/// Registered denomination metadata
const METADATA: Map<&str, Metadata> = Map::new("bank_metadata");

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBank;

impl MockBank {
    /// Create new coins in `account`, increasing supply.
    pub fn mint(
        storage: &mut dyn Storage,
        account: &CanonicalAddr,
        denom: &str,
        amount: Uint256,
    ) -> StdResult<()> {
        let balance = BALANCES
            .may_load(storage, (account.as_slice(), denom))?
            .unwrap_or_default();
        BALANCES.save(storage, (account.as_slice(), denom), &balance.checked_add(amount)?)?;

        let supply = SUPPLY.may_load(storage, denom)?.unwrap_or_default();
        SUPPLY.save(storage, denom, &supply.checked_add(amount)?)?;
        Ok(())
    }

    pub fn set_metadata(storage: &mut dyn Storage, denom: &str, metadata: &Metadata) -> StdResult<()> {
        METADATA.save(storage, denom, metadata)
    }
}

impl BankKeeper for MockBank {
    fn denom_metadata(&self, storage: &dyn Storage, denom: &str) -> StdResult<Option<Metadata>> {
        METADATA.may_load(storage, denom)
    }

    fn supply(&self, storage: &dyn Storage, denom: &str) -> StdResult<Uint256> {
        Ok(SUPPLY.may_load(storage, denom)?.unwrap_or_default())
    }

    fn balance(
        &self,
        storage: &dyn Storage,
        account: &CanonicalAddr,
        denom: &str,
    ) -> StdResult<Uint256> {
        Ok(BALANCES
            .may_load(storage, (account.as_slice(), denom))?
            .unwrap_or_default())
    }

    fn send(
        &self,
        storage: &mut dyn Storage,
        from: &CanonicalAddr,
        to: &CanonicalAddr,
        coin: &Coin,
    ) -> StdResult<()> {
        let from_balance = self.balance(storage, from, &coin.denom)?;
        let Ok(remaining) = from_balance.checked_sub(coin.amount) else {
            return Err(StdError::generic_err(format!(
                "spendable balance {}{} is smaller than {}: insufficient funds",
                from_balance, coin.denom, coin
            )));
        };

        BALANCES.save(storage, (from.as_slice(), coin.denom.as_str()), &remaining)?;

        let to_balance = self.balance(storage, to, &coin.denom)?;
        BALANCES.save(
            storage,
            (to.as_slice(), coin.denom.as_str()),
            &to_balance.checked_add(coin.amount)?,
        )?;
        Ok(())
    }
}

// ============================================================================
// Authz
// ============================================================================

/// Grants by (grantee, granter, msg type url)
const GRANTS: Map<(&[u8], &[u8], &str), Grant> = Map::new("authz_grants");

#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthz;

impl AuthzKeeper for MockAuthz {
    fn grant(
        &self,
        storage: &dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        msg_type_url: &str,
    ) -> StdResult<Option<Grant>> {
        GRANTS.may_load(
            storage,
            (grantee.as_slice(), granter.as_slice(), msg_type_url),
        )
    }

    fn save_grant(
        &self,
        storage: &mut dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        grant: &Grant,
    ) -> StdResult<()> {
        GRANTS.save(
            storage,
            (
                grantee.as_slice(),
                granter.as_slice(),
                grant.authorization.msg_type_url(),
            ),
            grant,
        )
    }

    fn delete_grant(
        &self,
        storage: &mut dyn Storage,
        grantee: &CanonicalAddr,
        granter: &CanonicalAddr,
        msg_type_url: &str,
    ) -> StdResult<()> {
        GRANTS.remove(
            storage,
            (grantee.as_slice(), granter.as_slice(), msg_type_url),
        );
        Ok(())
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// Last assigned packet sequence
const SEQUENCE: Item<u64> = Item::new("transfer_sequence");

/// Submitted packets by sequence
const PACKETS: Map<u64, TransferPacket> = Map::new("transfer_packets");

#[derive(Debug, Clone, Copy, Default)]
pub struct MockTransfer;

impl MockTransfer {
    /// Account holding escrowed tokens for a port/channel pair.
    pub fn escrow_address(port_id: &str, channel_id: &str) -> CanonicalAddr {
        let hash = keccak256(format!("ics20-1\0{}/{}", port_id, channel_id));
        CanonicalAddr::from(&hash[..20])
    }

    pub fn packet(storage: &dyn Storage, sequence: u64) -> StdResult<Option<TransferPacket>> {
        PACKETS.may_load(storage, sequence)
    }

    pub fn last_sequence(storage: &dyn Storage) -> StdResult<u64> {
        Ok(SEQUENCE.may_load(storage)?.unwrap_or_default())
    }
}

impl TransferKeeper for MockTransfer {
    fn send_transfer(
        &self,
        storage: &mut dyn Storage,
        block: &BlockInfo,
        packet: &TransferPacket,
    ) -> StdResult<u64> {
        if packet.timeout_height.revision_height <= block.height {
            return Err(StdError::generic_err(format!(
                "receiving chain block height >= packet timeout height ({} >= {})",
                block.height, packet.timeout_height
            )));
        }

        let (_, sender) = decode_bech32(&packet.sender).map_err(StdError::generic_err)?;
        let escrow = Self::escrow_address(&packet.source_port, &packet.source_channel);
        MockBank.send(
            storage,
            &CanonicalAddr::from(sender.as_slice()),
            &escrow,
            &packet.token,
        )?;

        let sequence = Self::last_sequence(storage)? + 1;
        SEQUENCE.save(storage, &sequence)?;
        PACKETS.save(storage, sequence, packet)?;

        tracing::debug!(
            sequence,
            channel = %packet.source_channel,
            token = %packet.token,
            "Queued transfer packet"
        );
        Ok(sequence)
    }
}
