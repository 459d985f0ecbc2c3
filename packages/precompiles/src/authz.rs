//! Authorization Gate
//!
//! Standing grants let a spender move an owner's funds. Reads are fail-open
//! (any problem reads as a zero allowance); consumption is strict and happens
//! in the same storage transition as the transfer it authorizes.

use crate::address_codec::to_canonical;
use crate::error::PrecompileError;
use crate::keepers::AuthzKeeper;
use crate::packet::{validate_channel_id, validate_port_id, TransferPacket};
use crate::types::Coin;
use alloy::primitives::Address;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{BlockInfo, CanonicalAddr, Storage, Timestamp, Uint256};
use std::collections::BTreeSet;

/// Message type authorized by a bank send grant
pub const SEND_MSG_URL: &str = "/cosmos.bank.v1beta1.MsgSend";

/// Message type authorized by an ICS-20 transfer grant
pub const TRANSFER_MSG_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";

// ============================================================================
// Grant Types
// ============================================================================

#[cw_serde]
pub struct Grant {
    pub authorization: Authorization,
    pub expiration: Option<Timestamp>,
}

impl Grant {
    pub fn new(authorization: Authorization, expiration: Option<Timestamp>) -> Self {
        Self {
            authorization,
            expiration,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiration.is_some_and(|expiration| expiration < now)
    }
}

#[cw_serde]
pub enum Authorization {
    Send(SendAuthorization),
    Transfer(TransferAuthorization),
    /// Unrestricted permission for an arbitrary message type
    Generic { msg: String },
}

impl Authorization {
    pub fn msg_type_url(&self) -> &str {
        match self {
            Authorization::Send(_) => SEND_MSG_URL,
            Authorization::Transfer(_) => TRANSFER_MSG_URL,
            Authorization::Generic { msg } => msg,
        }
    }

    pub fn validate_basic(&self) -> Result<(), PrecompileError> {
        match self {
            Authorization::Send(auth) => {
                validate_spend_limit(&auth.spend_limit)?;
                validate_allow_list(&auth.allow_list)
            }
            Authorization::Transfer(auth) => auth.validate_basic(),
            Authorization::Generic { msg } => {
                if msg.is_empty() {
                    return Err(invalid_authorization("empty message type url"));
                }
                Ok(())
            }
        }
    }
}

#[cw_serde]
pub struct SendAuthorization {
    pub spend_limit: Vec<Coin>,
    #[serde(default)]
    pub allow_list: Vec<String>,
}

#[cw_serde]
pub struct TransferAuthorization {
    pub allocations: Vec<Allocation>,
}

impl TransferAuthorization {
    pub fn validate_basic(&self) -> Result<(), PrecompileError> {
        if self.allocations.is_empty() {
            return Err(invalid_authorization("allocations cannot be empty"));
        }

        let mut channels = BTreeSet::new();
        for allocation in &self.allocations {
            validate_port_id(&allocation.source_port).map_err(invalid_authorization)?;
            validate_channel_id(&allocation.source_channel).map_err(invalid_authorization)?;

            if !channels.insert((&allocation.source_port, &allocation.source_channel)) {
                return Err(invalid_authorization(format!(
                    "duplicate allocation for {}/{}",
                    allocation.source_port, allocation.source_channel
                )));
            }

            validate_spend_limit(&allocation.spend_limit)?;
            validate_allow_list(&allocation.allow_list)?;
        }

        Ok(())
    }
}

/// Spend limit for one ICS-20 port/channel pair.
#[cw_serde]
pub struct Allocation {
    pub source_port: String,
    pub source_channel: String,
    pub spend_limit: Vec<Coin>,
    #[serde(default)]
    pub allow_list: Vec<String>,
}

fn invalid_authorization(reason: impl Into<String>) -> PrecompileError {
    PrecompileError::InvalidAuthorization {
        reason: reason.into(),
    }
}

/// Spend limits must be non-empty, sorted by denom, free of duplicates, and
/// hold only valid positive coins.
pub fn validate_spend_limit(spend_limit: &[Coin]) -> Result<(), PrecompileError> {
    if spend_limit.is_empty() {
        return Err(invalid_authorization("spend limit cannot be empty"));
    }

    for coin in spend_limit {
        coin.validate().map_err(invalid_authorization)?;
        if !coin.is_positive() {
            return Err(invalid_authorization(format!(
                "spend limit for {} must be positive",
                coin.denom
            )));
        }
    }

    for pair in spend_limit.windows(2) {
        if pair[0].denom == pair[1].denom {
            return Err(invalid_authorization(format!(
                "duplicate denomination {}",
                pair[0].denom
            )));
        }
        if pair[0].denom > pair[1].denom {
            return Err(invalid_authorization("spend limit is not sorted"));
        }
    }

    Ok(())
}

fn validate_allow_list(allow_list: &[String]) -> Result<(), PrecompileError> {
    let mut seen = BTreeSet::new();
    for entry in allow_list {
        if !seen.insert(entry) {
            return Err(invalid_authorization(format!(
                "duplicate entry in allow list {}",
                entry
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Allowance Lookup
// ============================================================================

/// Outcome of reading a send allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowanceLookup {
    NoGrant,
    LookupFailed(String),
    Expired,
    /// A grant exists for the send message type but holds another authorization
    WrongKind,
    EmptySpendLimit,
    Found(Uint256),
}

impl AllowanceLookup {
    /// The allowance callers see: zero for every branch but [`AllowanceLookup::Found`].
    pub fn amount(&self) -> Uint256 {
        match self {
            AllowanceLookup::Found(amount) => *amount,
            _ => Uint256::zero(),
        }
    }
}

/// Classify the send grant from `owner` (granter) to `spender` (grantee).
pub fn lookup_send_allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &dyn Storage,
    block: &BlockInfo,
    owner: &Address,
    spender: &Address,
) -> AllowanceLookup {
    let grant = match authz.grant(
        storage,
        &to_canonical(spender),
        &to_canonical(owner),
        SEND_MSG_URL,
    ) {
        Ok(Some(grant)) => grant,
        Ok(None) => return AllowanceLookup::NoGrant,
        Err(e) => return AllowanceLookup::LookupFailed(e.to_string()),
    };

    if grant.is_expired(block.time) {
        return AllowanceLookup::Expired;
    }

    match grant.authorization {
        Authorization::Send(auth) => match auth.spend_limit.first() {
            Some(coin) => AllowanceLookup::Found(coin.amount),
            None => AllowanceLookup::EmptySpendLimit,
        },
        _ => AllowanceLookup::WrongKind,
    }
}

/// Remaining allowance from `owner` to `spender`, zero on any failure.
pub fn allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &dyn Storage,
    block: &BlockInfo,
    owner: &Address,
    spender: &Address,
) -> Uint256 {
    let lookup = lookup_send_allowance(authz, storage, block, owner, spender);
    if !matches!(lookup, AllowanceLookup::Found(_)) {
        tracing::debug!(%owner, %spender, ?lookup, "Allowance reads as zero");
    }
    lookup.amount()
}

// ============================================================================
// Consumption
// ============================================================================

/// Deduct `coin` from a spend limit in place. Returns the remaining allowance
/// for the denom on failure.
fn deduct(spend_limit: &mut Vec<Coin>, coin: &Coin) -> Result<(), Uint256> {
    let Some(index) = spend_limit.iter().position(|c| c.denom == coin.denom) else {
        return Err(Uint256::zero());
    };

    let remaining = spend_limit[index].amount;
    let Some(left) = remaining.checked_sub(coin.amount).ok() else {
        return Err(remaining);
    };

    if left.is_zero() {
        spend_limit.remove(index);
    } else {
        spend_limit[index].amount = left;
    }
    Ok(())
}

fn exceeded(coin: &Coin, allowance: Uint256) -> PrecompileError {
    PrecompileError::AllowanceExceeded {
        denom: coin.denom.clone(),
        allowance,
        requested: coin.amount,
    }
}

/// Load a live grant for the given message type; missing and expired grants
/// read as `None`.
fn live_grant<A: AuthzKeeper>(
    authz: &A,
    storage: &dyn Storage,
    block: &BlockInfo,
    grantee: &CanonicalAddr,
    granter: &CanonicalAddr,
    msg_type_url: &str,
) -> Result<Option<Grant>, PrecompileError> {
    Ok(authz
        .grant(storage, grantee, granter, msg_type_url)?
        .filter(|grant| !grant.is_expired(block.time)))
}

/// Spend `coin` out of the send grant `owner` gave `spender`, on behalf of a
/// transfer to `recipient` (bech32).
pub fn consume_send_allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &mut dyn Storage,
    block: &BlockInfo,
    owner: &Address,
    spender: &Address,
    recipient: &str,
    coin: &Coin,
) -> Result<(), PrecompileError> {
    let granter = to_canonical(owner);
    let grantee = to_canonical(spender);

    let Some(mut grant) = live_grant(authz, storage, block, &grantee, &granter, SEND_MSG_URL)?
    else {
        return Err(exceeded(coin, Uint256::zero()));
    };

    let Authorization::Send(auth) = &mut grant.authorization else {
        return Err(exceeded(coin, Uint256::zero()));
    };

    if !auth.allow_list.is_empty() && !auth.allow_list.iter().any(|a| a == recipient) {
        return Err(invalid_authorization(format!(
            "cannot send to {} address",
            recipient
        )));
    }

    deduct(&mut auth.spend_limit, coin).map_err(|allowance| exceeded(coin, allowance))?;

    if auth.spend_limit.is_empty() {
        authz.delete_grant(storage, &grantee, &granter, SEND_MSG_URL)?;
    } else {
        authz.save_grant(storage, &grantee, &granter, &grant)?;
    }

    tracing::debug!(%owner, %spender, coin = %coin, "Consumed send allowance");
    Ok(())
}

/// Spend the packet's token out of the ICS-20 grant `owner` gave `spender`.
pub fn consume_transfer_allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &mut dyn Storage,
    block: &BlockInfo,
    owner: &Address,
    spender: &Address,
    packet: &TransferPacket,
) -> Result<(), PrecompileError> {
    let granter = to_canonical(owner);
    let grantee = to_canonical(spender);
    let coin = &packet.token;

    let Some(mut grant) =
        live_grant(authz, storage, block, &grantee, &granter, TRANSFER_MSG_URL)?
    else {
        return Err(exceeded(coin, Uint256::zero()));
    };

    let Authorization::Transfer(auth) = &mut grant.authorization else {
        return Err(exceeded(coin, Uint256::zero()));
    };

    let index = auth
        .allocations
        .iter()
        .position(|a| {
            a.source_port == packet.source_port && a.source_channel == packet.source_channel
        })
        .ok_or_else(|| {
            invalid_authorization(format!(
                "requested port and channel allocation does not exist: {}/{}",
                packet.source_port, packet.source_channel
            ))
        })?;

    let allocation = &mut auth.allocations[index];
    if !allocation.allow_list.is_empty()
        && !allocation.allow_list.iter().any(|r| r == &packet.receiver)
    {
        return Err(invalid_authorization(format!(
            "not allowed receiver address for transfer: {}",
            packet.receiver
        )));
    }

    deduct(&mut allocation.spend_limit, coin).map_err(|allowance| exceeded(coin, allowance))?;

    if allocation.spend_limit.is_empty() {
        auth.allocations.remove(index);
    }

    if auth.allocations.is_empty() {
        authz.delete_grant(storage, &grantee, &granter, TRANSFER_MSG_URL)?;
    } else {
        authz.save_grant(storage, &grantee, &granter, &grant)?;
    }

    tracing::debug!(%owner, %spender, coin = %coin, "Consumed transfer allowance");
    Ok(())
}

// ============================================================================
// Approval
// ============================================================================

/// Set the send allowance `owner` gives `spender` for one denomination.
///
/// Limits for other denominations on an existing grant are kept. A zero
/// amount removes this denomination's limit; the grant is deleted once no
/// limit is left.
pub fn approve<A: AuthzKeeper>(
    authz: &A,
    storage: &mut dyn Storage,
    block: &BlockInfo,
    owner: &Address,
    spender: &Address,
    coin: &Coin,
    expiration_secs: u64,
) -> Result<(), PrecompileError> {
    if spender.is_zero() {
        return Err(PrecompileError::EmptyGrantee);
    }
    coin.validate()
        .map_err(|reason| PrecompileError::InvalidCoin { reason })?;

    let granter = to_canonical(owner);
    let grantee = to_canonical(spender);

    let existing = match live_grant(authz, storage, block, &grantee, &granter, SEND_MSG_URL)? {
        Some(Grant {
            authorization: Authorization::Send(auth),
            expiration,
        }) => Some((auth.spend_limit, expiration)),
        _ => None,
    };

    if !coin.is_positive() {
        let Some((mut spend_limit, expiration)) = existing else {
            return Ok(());
        };
        spend_limit.retain(|c| c.denom != coin.denom);

        if spend_limit.is_empty() {
            authz.delete_grant(storage, &grantee, &granter, SEND_MSG_URL)?;
        } else {
            let grant = Grant::new(
                Authorization::Send(SendAuthorization {
                    spend_limit,
                    allow_list: vec![],
                }),
                expiration,
            );
            authz.save_grant(storage, &grantee, &granter, &grant)?;
        }

        tracing::debug!(%owner, %spender, denom = %coin.denom, "Revoked send allowance");
        return Ok(());
    }

    let mut spend_limit = existing.map(|(limit, _)| limit).unwrap_or_default();
    spend_limit.retain(|c| c.denom != coin.denom);
    spend_limit.push(coin.clone());
    spend_limit.sort_by(|a, b| a.denom.cmp(&b.denom));

    let authorization = Authorization::Send(SendAuthorization {
        spend_limit,
        allow_list: vec![],
    });
    authorization.validate_basic()?;

    let grant = Grant::new(authorization, Some(block.time.plus_seconds(expiration_secs)));
    authz.save_grant(storage, &grantee, &granter, &grant)?;

    tracing::debug!(%owner, %spender, coin = %coin, "Approved send allowance");
    Ok(())
}

// ============================================================================
// Transfer Allowance Changes
// ============================================================================

/// Load the live ICS-20 authorization, its expiration and the index of the
/// allocation for one port/channel pair.
fn transfer_allocation<A: AuthzKeeper>(
    authz: &A,
    storage: &dyn Storage,
    block: &BlockInfo,
    grantee: &CanonicalAddr,
    granter: &CanonicalAddr,
    source_port: &str,
    source_channel: &str,
) -> Result<(TransferAuthorization, Option<Timestamp>, usize), PrecompileError> {
    let grant = live_grant(authz, storage, block, grantee, granter, TRANSFER_MSG_URL)?
        .ok_or_else(|| {
            invalid_authorization(format!(
                "authorization to {} for address {} does not exist",
                TRANSFER_MSG_URL, grantee
            ))
        })?;

    let Authorization::Transfer(auth) = grant.authorization else {
        return Err(invalid_authorization(format!(
            "grant for {} is not a transfer authorization",
            TRANSFER_MSG_URL
        )));
    };

    let index = auth
        .allocations
        .iter()
        .position(|a| a.source_port == source_port && a.source_channel == source_channel)
        .ok_or_else(|| {
            invalid_authorization(format!(
                "no allocation found for {}/{}",
                source_port, source_channel
            ))
        })?;

    Ok((auth, grant.expiration, index))
}

/// Raise the ICS-20 allowance `granter` gave `grantee` on one port/channel.
/// A denomination without a limit on that allocation is added.
#[allow(clippy::too_many_arguments)]
pub fn increase_transfer_allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &mut dyn Storage,
    block: &BlockInfo,
    granter: &Address,
    grantee: &Address,
    source_port: &str,
    source_channel: &str,
    coin: &Coin,
) -> Result<(), PrecompileError> {
    let granter_addr = to_canonical(granter);
    let grantee_addr = to_canonical(grantee);
    let (mut auth, expiration, index) = transfer_allocation(
        authz,
        storage,
        block,
        &grantee_addr,
        &granter_addr,
        source_port,
        source_channel,
    )?;

    let allocation = &mut auth.allocations[index];
    match allocation
        .spend_limit
        .iter_mut()
        .find(|c| c.denom == coin.denom)
    {
        Some(limit) => {
            limit.amount = limit.amount.checked_add(coin.amount).map_err(|_| {
                invalid_authorization(format!("allowance for {} overflows", coin.denom))
            })?;
        }
        None => {
            allocation.spend_limit.push(coin.clone());
            allocation.spend_limit.sort_by(|a, b| a.denom.cmp(&b.denom));
        }
    }

    auth.validate_basic()?;
    let grant = Grant::new(Authorization::Transfer(auth), expiration);
    authz.save_grant(storage, &grantee_addr, &granter_addr, &grant)?;

    tracing::debug!(%granter, %grantee, coin = %coin, "Increased transfer allowance");
    Ok(())
}

/// Lower the ICS-20 allowance `granter` gave `grantee` on one port/channel.
/// Limits that reach zero are removed, and the grant with them once nothing
/// is left.
#[allow(clippy::too_many_arguments)]
pub fn decrease_transfer_allowance<A: AuthzKeeper>(
    authz: &A,
    storage: &mut dyn Storage,
    block: &BlockInfo,
    granter: &Address,
    grantee: &Address,
    source_port: &str,
    source_channel: &str,
    coin: &Coin,
) -> Result<(), PrecompileError> {
    let granter_addr = to_canonical(granter);
    let grantee_addr = to_canonical(grantee);
    let (mut auth, expiration, index) = transfer_allocation(
        authz,
        storage,
        block,
        &grantee_addr,
        &granter_addr,
        source_port,
        source_channel,
    )?;

    let allocation = &mut auth.allocations[index];
    let position = allocation
        .spend_limit
        .iter()
        .position(|c| c.denom == coin.denom)
        .ok_or_else(|| {
            invalid_authorization(format!(
                "no spend limit for {} on {}/{}",
                coin.denom, source_port, source_channel
            ))
        })?;

    let current = allocation.spend_limit[position].amount;
    let Ok(left) = current.checked_sub(coin.amount) else {
        return Err(invalid_authorization(format!(
            "amount by which the allowance should be decreased is greater than the authorization limit: {} > {}",
            coin.amount, current
        )));
    };

    if left.is_zero() {
        allocation.spend_limit.remove(position);
    } else {
        allocation.spend_limit[position].amount = left;
    }
    if allocation.spend_limit.is_empty() {
        auth.allocations.remove(index);
    }

    if auth.allocations.is_empty() {
        authz.delete_grant(storage, &grantee_addr, &granter_addr, TRANSFER_MSG_URL)?;
    } else {
        let grant = Grant::new(Authorization::Transfer(auth), expiration);
        authz.save_grant(storage, &grantee_addr, &granter_addr, &grant)?;
    }

    tracing::debug!(%granter, %grantee, coin = %coin, "Decreased transfer allowance");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAuthz;
    use cosmwasm_std::testing::{mock_env, MockStorage};

    fn owner() -> Address {
        Address::repeat_byte(0x01)
    }

    fn spender() -> Address {
        Address::repeat_byte(0x02)
    }

    fn save(storage: &mut MockStorage, grant: Grant) {
        MockAuthz
            .save_grant(
                storage,
                &to_canonical(&spender()),
                &to_canonical(&owner()),
                &grant,
            )
            .unwrap();
    }

    fn send_grant(coins: Vec<Coin>, expiration: Option<Timestamp>) -> Grant {
        Grant::new(
            Authorization::Send(SendAuthorization {
                spend_limit: coins,
                allow_list: vec![],
            }),
            expiration,
        )
    }

    #[test]
    fn test_lookup_branches() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;

        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::NoGrant);
        assert_eq!(lookup.amount(), Uint256::zero());

        save(
            &mut storage,
            send_grant(vec![Coin::new(1000u128, "aevmos")], None),
        );
        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::Found(Uint256::from(1000u128)));

        save(
            &mut storage,
            send_grant(
                vec![Coin::new(1000u128, "aevmos")],
                Some(block.time.minus_seconds(1)),
            ),
        );
        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::Expired);

        save(&mut storage, send_grant(vec![], None));
        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::EmptySpendLimit);
    }

    #[test]
    fn test_deduct() {
        let mut limit = vec![Coin::new(100u128, "aevmos"), Coin::new(5u128, "uatom")];

        deduct(&mut limit, &Coin::new(40u128, "aevmos")).unwrap();
        assert_eq!(limit[0].amount, Uint256::from(60u128));

        assert_eq!(
            deduct(&mut limit, &Coin::new(61u128, "aevmos")).unwrap_err(),
            Uint256::from(60u128)
        );
        assert_eq!(
            deduct(&mut limit, &Coin::new(1u128, "uosmo")).unwrap_err(),
            Uint256::zero()
        );

        deduct(&mut limit, &Coin::new(5u128, "uatom")).unwrap();
        assert_eq!(limit, vec![Coin::new(60u128, "aevmos")]);
    }

    #[test]
    fn test_consume_exact_deletes_grant() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;
        save(
            &mut storage,
            send_grant(vec![Coin::new(1000u128, "aevmos")], None),
        );

        consume_send_allowance(
            &MockAuthz,
            &mut storage,
            &block,
            &owner(),
            &spender(),
            "evmos1recipient",
            &Coin::new(1000u128, "aevmos"),
        )
        .unwrap();

        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::NoGrant);
    }

    #[test]
    fn test_consume_respects_allow_list() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;
        save(
            &mut storage,
            Grant::new(
                Authorization::Send(SendAuthorization {
                    spend_limit: vec![Coin::new(1000u128, "aevmos")],
                    allow_list: vec!["evmos1allowed".to_string()],
                }),
                None,
            ),
        );

        let err = consume_send_allowance(
            &MockAuthz,
            &mut storage,
            &block,
            &owner(),
            &spender(),
            "evmos1other",
            &Coin::new(1u128, "aevmos"),
        )
        .unwrap_err();
        assert!(matches!(err, PrecompileError::InvalidAuthorization { .. }));
    }

    #[test]
    fn test_validate_spend_limit() {
        assert!(validate_spend_limit(&[Coin::new(1u128, "aevmos"), Coin::new(1u128, "uatom")]).is_ok());
        assert!(validate_spend_limit(&[]).is_err());
        assert!(validate_spend_limit(&[Coin::new(0u128, "aevmos")]).is_err());
        assert!(validate_spend_limit(&[Coin::new(1u128, "uatom"), Coin::new(1u128, "aevmos")]).is_err());
        assert!(validate_spend_limit(&[Coin::new(1u128, "aevmos"), Coin::new(2u128, "aevmos")]).is_err());
    }

    #[test]
    fn test_approve_keeps_other_denoms() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;
        save(
            &mut storage,
            send_grant(vec![Coin::new(7u128, "uatom")], None),
        );

        approve(
            &MockAuthz,
            &mut storage,
            &block,
            &owner(),
            &spender(),
            &Coin::new(500u128, "aevmos"),
            3600,
        )
        .unwrap();

        let grant = MockAuthz
            .grant(
                &storage,
                &to_canonical(&spender()),
                &to_canonical(&owner()),
                SEND_MSG_URL,
            )
            .unwrap()
            .unwrap();
        assert_eq!(grant.expiration, Some(block.time.plus_seconds(3600)));
        assert_eq!(
            grant.authorization,
            Authorization::Send(SendAuthorization {
                spend_limit: vec![Coin::new(500u128, "aevmos"), Coin::new(7u128, "uatom")],
                allow_list: vec![],
            })
        );
    }

    #[test]
    fn test_approve_zero_spender() {
        let mut storage = MockStorage::new();
        let err = approve(
            &MockAuthz,
            &mut storage,
            &mock_env().block,
            &owner(),
            &Address::ZERO,
            &Coin::new(1u128, "aevmos"),
            3600,
        )
        .unwrap_err();
        assert_eq!(err, PrecompileError::EmptyGrantee);
    }

    #[test]
    fn test_approve_zero_removes_only_that_denom() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;

        approve(&MockAuthz, &mut storage, &block, &owner(), &spender(), &Coin::new(7u128, "uatom"), 3600)
            .unwrap();
        approve(&MockAuthz, &mut storage, &block, &owner(), &spender(), &Coin::new(500u128, "aevmos"), 3600)
            .unwrap();
        approve(&MockAuthz, &mut storage, &block, &owner(), &spender(), &Coin::new(0u128, "aevmos"), 3600)
            .unwrap();

        let grant = MockAuthz
            .grant(
                &storage,
                &to_canonical(&spender()),
                &to_canonical(&owner()),
                SEND_MSG_URL,
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            grant.authorization,
            Authorization::Send(SendAuthorization {
                spend_limit: vec![Coin::new(7u128, "uatom")],
                allow_list: vec![],
            })
        );

        approve(&MockAuthz, &mut storage, &block, &owner(), &spender(), &Coin::new(0u128, "uatom"), 3600)
            .unwrap();
        let lookup = lookup_send_allowance(&MockAuthz, &storage, &block, &owner(), &spender());
        assert_eq!(lookup, AllowanceLookup::NoGrant);
    }

    /// Authz keeper whose reads always fail.
    struct BrokenAuthz;

    impl AuthzKeeper for BrokenAuthz {
        fn grant(
            &self,
            _storage: &dyn Storage,
            _grantee: &CanonicalAddr,
            _granter: &CanonicalAddr,
            _msg_type_url: &str,
        ) -> cosmwasm_std::StdResult<Option<Grant>> {
            Err(cosmwasm_std::StdError::generic_err("authz store unavailable"))
        }

        fn save_grant(
            &self,
            _storage: &mut dyn Storage,
            _grantee: &CanonicalAddr,
            _granter: &CanonicalAddr,
            _grant: &Grant,
        ) -> cosmwasm_std::StdResult<()> {
            Ok(())
        }

        fn delete_grant(
            &self,
            _storage: &mut dyn Storage,
            _grantee: &CanonicalAddr,
            _granter: &CanonicalAddr,
            _msg_type_url: &str,
        ) -> cosmwasm_std::StdResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lookup_failure_reads_as_zero() {
        let storage = MockStorage::new();
        let block = mock_env().block;

        let lookup = lookup_send_allowance(&BrokenAuthz, &storage, &block, &owner(), &spender());
        assert!(matches!(lookup, AllowanceLookup::LookupFailed(ref msg) if msg.contains("authz store unavailable")));
        assert_eq!(
            allowance(&BrokenAuthz, &storage, &block, &owner(), &spender()),
            Uint256::zero()
        );
    }

    fn transfer_grant(coins: Vec<Coin>) -> Grant {
        Grant::new(
            Authorization::Transfer(TransferAuthorization {
                allocations: vec![Allocation {
                    source_port: "transfer".to_string(),
                    source_channel: "channel-0".to_string(),
                    spend_limit: coins,
                    allow_list: vec![],
                }],
            }),
            None,
        )
    }

    fn transfer_limit(storage: &MockStorage) -> Option<Vec<Coin>> {
        let grant = MockAuthz
            .grant(
                storage,
                &to_canonical(&spender()),
                &to_canonical(&owner()),
                TRANSFER_MSG_URL,
            )
            .unwrap()?;
        match grant.authorization {
            Authorization::Transfer(auth) => Some(auth.allocations[0].spend_limit.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_increase_transfer_allowance() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;

        let err = increase_transfer_allowance(
            &MockAuthz,
            &mut storage,
            &block,
            &owner(),
            &spender(),
            "transfer",
            "channel-0",
            &Coin::new(1u128, "aevmos"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        save(&mut storage, transfer_grant(vec![Coin::new(100u128, "uosmo")]));
        for coin in [Coin::new(50u128, "uosmo"), Coin::new(10u128, "aevmos")] {
            increase_transfer_allowance(
                &MockAuthz,
                &mut storage,
                &block,
                &owner(),
                &spender(),
                "transfer",
                "channel-0",
                &coin,
            )
            .unwrap();
        }

        assert_eq!(
            transfer_limit(&storage).unwrap(),
            vec![Coin::new(10u128, "aevmos"), Coin::new(150u128, "uosmo")]
        );
    }

    #[test]
    fn test_decrease_transfer_allowance() {
        let mut storage = MockStorage::new();
        let block = mock_env().block;
        save(
            &mut storage,
            transfer_grant(vec![Coin::new(10u128, "aevmos"), Coin::new(100u128, "uosmo")]),
        );

        let decrease = |storage: &mut MockStorage, coin: Coin| {
            decrease_transfer_allowance(
                &MockAuthz,
                storage,
                &block,
                &owner(),
                &spender(),
                "transfer",
                "channel-0",
                &coin,
            )
        };

        let err = decrease(&mut storage, Coin::new(101u128, "uosmo")).unwrap_err();
        assert!(err.to_string().contains("greater than the authorization limit"));

        decrease(&mut storage, Coin::new(40u128, "uosmo")).unwrap();
        decrease(&mut storage, Coin::new(10u128, "aevmos")).unwrap();
        assert_eq!(
            transfer_limit(&storage).unwrap(),
            vec![Coin::new(60u128, "uosmo")]
        );

        decrease(&mut storage, Coin::new(60u128, "uosmo")).unwrap();
        assert_eq!(transfer_limit(&storage), None);
    }
}
