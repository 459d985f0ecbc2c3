//! Cross-Chain Packet Builder
//!
//! Builds ICS-20 transfer packets and transfer authorizations from decoded
//! call arguments. Nothing here is submitted or persisted; the outpost hands
//! the validated packet to the transfer keeper.

use crate::address_codec::{acc_address_from_bech32, bech32_prefix, encode_bech32, evm_to_bech32};
use crate::args::{decode_args, CoinArg};
use crate::authz::{Allocation, TransferAuthorization};
use crate::config::{OutpostConfig, StrideConfig};
use crate::error::PrecompileError;
use crate::types::{parse_revision_number, validate_denom, Amount, Coin, Height};
use alloy::primitives::Address;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::BlockInfo;
use serde::Serialize;

/// Maximum receiver length accepted by the transfer module
pub const MAX_RECEIVER_LEN: usize = 2048;

/// Maximum memo length accepted by the transfer module
pub const MAX_MEMO_LEN: usize = 32768;

// ============================================================================
// Transfer Packet
// ============================================================================

/// Outbound ICS-20 fungible token transfer.
#[cw_serde]
pub struct TransferPacket {
    pub source_port: String,
    pub source_channel: String,
    pub token: Coin,
    /// Bech32 address of the sender on the local chain
    pub sender: String,
    /// Bech32 address of the receiver on the destination chain
    pub receiver: String,
    pub timeout_height: Height,
    /// Timeout in nanoseconds since epoch, 0 when disabled
    pub timeout_timestamp: u64,
    pub memo: String,
}

impl TransferPacket {
    /// Stateless checks the transfer module applies before accepting a packet.
    pub fn validate_basic(&self) -> Result<(), PrecompileError> {
        let invalid = |reason: String| PrecompileError::InvalidPacket { reason };

        validate_port_id(&self.source_port).map_err(invalid)?;
        validate_channel_id(&self.source_channel).map_err(invalid)?;

        self.token
            .validate()
            .map_err(|reason| PrecompileError::InvalidCoin { reason })?;
        if !self.token.is_positive() {
            return Err(PrecompileError::InvalidCoin {
                reason: format!("token amount must be positive: {}", self.token),
            });
        }

        if self.sender.trim().is_empty() {
            return Err(invalid("missing sender address".to_string()));
        }

        if self.receiver.trim().is_empty() {
            return Err(invalid("missing recipient address".to_string()));
        }
        if self.receiver.len() > MAX_RECEIVER_LEN {
            return Err(invalid(format!(
                "recipient address must not exceed {} bytes",
                MAX_RECEIVER_LEN
            )));
        }

        if self.memo.len() > MAX_MEMO_LEN {
            return Err(invalid(format!(
                "memo must not exceed {} bytes",
                MAX_MEMO_LEN
            )));
        }

        if self.timeout_height.is_zero() && self.timeout_timestamp == 0 {
            return Err(invalid(
                "packet timeout height and packet timeout timestamp cannot both be 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Identifier Validation (ICS-24)
// ============================================================================

fn validate_identifier(id: &str, min: usize, max: usize) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("identifier cannot be blank".to_string());
    }

    if id.len() < min || id.len() > max {
        return Err(format!(
            "identifier {} has invalid length: {}, must be between {}-{} characters",
            id,
            id.len(),
            min,
            max
        ));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || "._+-#[]<>".contains(*c)))
    {
        return Err(format!("identifier {} contains invalid character '{}'", id, c));
    }

    Ok(())
}

pub fn validate_port_id(id: &str) -> Result<(), String> {
    validate_identifier(id, 2, 128)
}

pub fn validate_channel_id(id: &str) -> Result<(), String> {
    validate_identifier(id, 8, 64)
}

// ============================================================================
// Swap Memo
// ============================================================================

#[derive(Serialize)]
struct XcsMemo<'a> {
    wasm: WasmHook<'a>,
}

#[derive(Serialize)]
struct WasmHook<'a> {
    contract: &'a str,
    msg: XcsMsg<'a>,
}

#[derive(Serialize)]
struct XcsMsg<'a> {
    osmosis_swap: OsmosisSwap<'a>,
}

#[derive(Serialize)]
struct OsmosisSwap<'a> {
    output_denom: &'a str,
    slippage: Slippage,
    receiver: &'a str,
    on_failed_delivery: &'a str,
}

#[derive(Serialize)]
struct Slippage {
    twap: Twap,
}

#[derive(Serialize)]
struct Twap {
    slippage_percentage: String,
    window_seconds: u64,
}

/// Osmosis cross-chain swap instruction carried in the packet memo.
pub fn swap_memo(
    config: &OutpostConfig,
    output_denom: &str,
    receiver: &str,
) -> Result<String, PrecompileError> {
    let memo = XcsMemo {
        wasm: WasmHook {
            contract: &config.xcs_contract,
            msg: XcsMsg {
                osmosis_swap: OsmosisSwap {
                    output_denom,
                    slippage: Slippage {
                        twap: Twap {
                            slippage_percentage: config.slippage_percentage.to_string(),
                            window_seconds: config.window_seconds,
                        },
                    },
                    receiver,
                    on_failed_delivery: "do_nothing",
                },
            },
        },
    };

    serde_json::to_string(&memo).map_err(|e| PrecompileError::InvalidPacket {
        reason: format!("failed to encode swap memo: {}", e),
    })
}

// ============================================================================
// Liquid Stake Memo
// ============================================================================

/// Stride's address prefix; liquid-staked tokens are minted there
pub const STRIDE_PREFIX: &str = "stride";

#[derive(Serialize)]
struct AutopilotMemo<'a> {
    autopilot: Autopilot<'a>,
}

#[derive(Serialize)]
struct Autopilot<'a> {
    receiver: &'a str,
    stakeibc: StakeIbc<'a>,
}

#[derive(Serialize)]
struct StakeIbc<'a> {
    action: &'a str,
    stride_address: &'a str,
}

/// Stride autopilot instruction to liquid stake the transferred tokens.
pub fn liquid_stake_memo(receiver: &str) -> Result<String, PrecompileError> {
    let memo = AutopilotMemo {
        autopilot: Autopilot {
            receiver,
            stakeibc: StakeIbc {
                action: "LiquidStake",
                stride_address: receiver,
            },
        },
    };

    serde_json::to_string(&memo).map_err(|e| PrecompileError::InvalidPacket {
        reason: format!("failed to encode liquid stake memo: {}", e),
    })
}

// ============================================================================
// Builders
// ============================================================================

/// A validated swap request: the EVM sender and the packet to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub sender: Address,
    pub packet: TransferPacket,
}

/// Build the transfer packet for
/// `swap(address sender, uint256 amount, string receiver, string inputDenom, string outputDenom)`.
pub fn build_transfer(
    config: &OutpostConfig,
    local_prefix: &str,
    block: &BlockInfo,
    args: &[alloy::dyn_abi::DynSolValue],
) -> Result<TransferRequest, PrecompileError> {
    let (sender, amount, receiver, input_denom, output_denom) =
        decode_args::<(Address, Amount, String, String, String)>(args)?;

    let prefix = bech32_prefix(&receiver)?;
    let receiver_account = acc_address_from_bech32(&receiver, &prefix)?;
    let receiver = encode_bech32(receiver_account.as_slice(), &prefix)?;

    let token = Coin::from_amount(&input_denom, amount)
        .map_err(|reason| PrecompileError::InvalidCoin { reason })?;
    token
        .validate()
        .map_err(|reason| PrecompileError::InvalidCoin { reason })?;

    validate_denom(&output_denom).map_err(|reason| PrecompileError::InvalidCoin { reason })?;
    if output_denom == input_denom {
        return Err(PrecompileError::InvalidCoin {
            reason: format!("input and output denom are both {}", input_denom),
        });
    }

    let timeout_height = Height::new(
        parse_revision_number(&block.chain_id),
        block.height.saturating_add(config.timeout_blocks),
    );

    let packet = TransferPacket {
        source_port: config.port_id.clone(),
        source_channel: config.channel_id.clone(),
        token,
        sender: evm_to_bech32(&sender, local_prefix)?,
        memo: swap_memo(config, &output_denom, &receiver)?,
        receiver,
        timeout_height,
        timeout_timestamp: 0,
    };
    packet.validate_basic()?;

    tracing::debug!(
        %sender,
        receiver = %packet.receiver,
        token = %packet.token,
        timeout = %packet.timeout_height,
        "Built transfer packet"
    );

    Ok(TransferRequest { sender, packet })
}

/// Build the ICS-20 authorization for
/// `approveTransfer(address grantee, Coin[] spendLimit, string[] allowList)`.
///
/// The authorization holds a single allocation on the configured port and
/// channel.
pub fn build_transfer_authorization(
    config: &OutpostConfig,
    args: &[alloy::dyn_abi::DynSolValue],
) -> Result<(Address, TransferAuthorization), PrecompileError> {
    let (grantee, spend_limit, allow_list) =
        decode_args::<(Address, Vec<CoinArg>, Vec<String>)>(args)?;

    if grantee.is_zero() {
        return Err(PrecompileError::EmptyGrantee);
    }

    let mut spend_limit = spend_limit
        .into_iter()
        .map(|coin| Coin::from_amount(&coin.denom, coin.amount))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| PrecompileError::InvalidAuthorization { reason })?;
    spend_limit.sort_by(|a, b| a.denom.cmp(&b.denom));

    let authorization = TransferAuthorization {
        allocations: vec![Allocation {
            source_port: config.port_id.clone(),
            source_channel: config.channel_id.clone(),
            spend_limit,
            allow_list,
        }],
    };
    authorization.validate_basic()?;

    Ok((grantee, authorization))
}

/// Decode `increaseAllowance` / `decreaseAllowance(address grantee, string denom, uint256 amount)`.
pub fn build_allowance_change(
    args: &[alloy::dyn_abi::DynSolValue],
) -> Result<(Address, Coin), PrecompileError> {
    let (grantee, denom, amount) = decode_args::<(Address, String, Amount)>(args)?;

    if grantee.is_zero() {
        return Err(PrecompileError::EmptyGrantee);
    }

    let coin =
        Coin::from_amount(&denom, amount).map_err(|reason| PrecompileError::InvalidCoin { reason })?;
    coin.validate()
        .map_err(|reason| PrecompileError::InvalidCoin { reason })?;
    if !coin.is_positive() {
        return Err(PrecompileError::InvalidCoin {
            reason: format!("allowance change must be positive: {}", coin),
        });
    }

    Ok((grantee, coin))
}

/// Build the transfer packet for `liquidStake(Coin token, string receiver)`.
///
/// Only the configured bond denomination can be liquid staked, and the
/// receiver has to be a Stride account.
pub fn build_liquid_stake(
    config: &StrideConfig,
    local_prefix: &str,
    block: &BlockInfo,
    sender: &Address,
    args: &[alloy::dyn_abi::DynSolValue],
) -> Result<TransferPacket, PrecompileError> {
    let (token, receiver) = decode_args::<(CoinArg, String)>(args)?;

    let token = Coin::from_amount(&token.denom, token.amount)
        .map_err(|reason| PrecompileError::InvalidCoin { reason })?;
    if token.denom != config.bond_denom {
        return Err(PrecompileError::InvalidCoin {
            reason: format!(
                "only {} can be liquid staked, got {}",
                config.bond_denom, token.denom
            ),
        });
    }

    if bech32_prefix(&receiver)? != STRIDE_PREFIX {
        return Err(PrecompileError::InvalidReceiver {
            address: receiver,
            reason: "receiver address is not a stride address".to_string(),
        });
    }
    let receiver_account = acc_address_from_bech32(&receiver, STRIDE_PREFIX)?;
    let receiver = encode_bech32(receiver_account.as_slice(), STRIDE_PREFIX)?;

    let timeout_height = Height::new(
        parse_revision_number(&block.chain_id),
        block.height.saturating_add(config.timeout_blocks),
    );

    let packet = TransferPacket {
        source_port: config.port_id.clone(),
        source_channel: config.channel_id.clone(),
        token,
        sender: evm_to_bech32(sender, local_prefix)?,
        memo: liquid_stake_memo(&receiver)?,
        receiver,
        timeout_height,
        timeout_timestamp: 0,
    };
    packet.validate_basic()?;

    Ok(packet)
}
