use super::OsmosisOutpost;
use crate::abi::IOsmosisOutpost;
use crate::address_codec::to_canonical;
use crate::authz::{self, Authorization, Grant, TRANSFER_MSG_URL};
use crate::dispatch::{CallContext, Execution};
use crate::error::PrecompileError;
use crate::keepers::{AuthzKeeper, BankKeeper, TransferKeeper};
use crate::packet::{build_allowance_change, build_transfer, build_transfer_authorization};
use crate::types::uint256_to_u256;
use alloy::dyn_abi::DynSolValue;
use alloy::sol_types::{SolCall, SolEvent};
use cosmwasm_std::StdError;

impl<B: BankKeeper, A: AuthzKeeper, T: TransferKeeper> OsmosisOutpost<B, A, T> {
    /// Swap by sending `inputDenom` to Osmosis with a cross-chain swap memo.
    ///
    /// `sender` must be the transaction origin. When a contract calls on the
    /// origin's behalf, the origin's transfer allowance for that contract is
    /// spent, but only once the origin is known to hold the tokens.
    pub(super) fn swap(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let request = build_transfer(
            &self.config.outpost,
            &self.config.bech32_prefix,
            ctx.block,
            args,
        )?;
        let sender = request.sender;
        let packet = request.packet;

        if sender != ctx.origin {
            return Err(PrecompileError::DifferentOrigin {
                origin: ctx.origin.to_string(),
                sender: sender.to_string(),
            });
        }

        if ctx.caller != ctx.origin {
            let spendable =
                self.bank
                    .balance(ctx.storage, &to_canonical(&sender), &packet.token.denom)?;
            if spendable < packet.token.amount {
                return Err(StdError::generic_err(format!(
                    "spendable balance {}{} is smaller than {}: insufficient funds",
                    spendable, packet.token.denom, packet.token
                ))
                .into());
            }

            authz::consume_transfer_allowance(
                &self.authz,
                ctx.storage,
                ctx.block,
                &ctx.origin,
                &ctx.caller,
                &packet,
            )?;
        }

        let sequence = self.transfer.send_transfer(ctx.storage, ctx.block, &packet)?;

        tracing::info!(
            %sender,
            receiver = %packet.receiver,
            token = %packet.token,
            channel = %packet.source_channel,
            sequence,
            "Outpost swap submitted"
        );

        let event = IOsmosisOutpost::IBCTransfer {
            sender,
            receiver: packet.receiver.clone(),
            sourcePort: packet.source_port.clone(),
            sourceChannel: packet.source_channel.clone(),
            denom: packet.token.denom.clone(),
            amount: uint256_to_u256(packet.token.amount),
            memo: packet.memo.clone(),
        };
        Ok(
            Execution::new(IOsmosisOutpost::swapCall::abi_encode_returns(&(true,)))
                .with_log(event.encode_log_data()),
        )
    }

    /// Let `grantee` swap the origin's tokens through this outpost, up to the
    /// given spend limit.
    pub(super) fn approve_transfer(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (grantee, authorization) = build_transfer_authorization(&self.config.outpost, args)?;

        if ctx.caller != ctx.origin {
            return Err(PrecompileError::DifferentOrigin {
                origin: ctx.origin.to_string(),
                sender: ctx.caller.to_string(),
            });
        }

        let granter = ctx.origin;
        if grantee == granter {
            return Err(PrecompileError::InvalidAuthorization {
                reason: "grantee and granter should be different".to_string(),
            });
        }

        let allocation = authorization.allocations.first().cloned().ok_or_else(|| {
            PrecompileError::InvalidAuthorization {
                reason: "allocations cannot be empty".to_string(),
            }
        })?;
        let expiration = ctx
            .block
            .time
            .plus_seconds(self.config.approval_expiration_secs);
        let grant = Grant::new(Authorization::Transfer(authorization), Some(expiration));
        self.authz.save_grant(
            ctx.storage,
            &to_canonical(&grantee),
            &to_canonical(&granter),
            &grant,
        )?;

        tracing::info!(%granter, %grantee, channel = %allocation.source_channel, "Transfer authorization granted");

        let event = IOsmosisOutpost::TransferAuthorization {
            grantee,
            granter,
            sourcePort: allocation.source_port,
            sourceChannel: allocation.source_channel,
            spendLimit: allocation
                .spend_limit
                .iter()
                .map(|coin| IOsmosisOutpost::Coin {
                    denom: coin.denom.clone(),
                    amount: uint256_to_u256(coin.amount),
                })
                .collect(),
        };
        Ok(Execution::new(
            IOsmosisOutpost::approveTransferCall::abi_encode_returns(&(true,)),
        )
        .with_log(event.encode_log_data()))
    }

    /// Raise (`increase`) or lower the origin's transfer allowance for
    /// `grantee` on the outpost channel by one coin.
    pub(super) fn change_allowance(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
        increase: bool,
    ) -> Result<Execution, PrecompileError> {
        let (grantee, coin) = build_allowance_change(args)?;

        if ctx.caller != ctx.origin {
            return Err(PrecompileError::DifferentOrigin {
                origin: ctx.origin.to_string(),
                sender: ctx.caller.to_string(),
            });
        }

        let granter = ctx.origin;
        if grantee == granter {
            return Err(PrecompileError::InvalidAuthorization {
                reason: "grantee and granter should be different".to_string(),
            });
        }

        let outpost = &self.config.outpost;
        if increase {
            authz::increase_transfer_allowance(
                &self.authz,
                ctx.storage,
                ctx.block,
                &granter,
                &grantee,
                &outpost.port_id,
                &outpost.channel_id,
                &coin,
            )?;
        } else {
            authz::decrease_transfer_allowance(
                &self.authz,
                ctx.storage,
                ctx.block,
                &granter,
                &grantee,
                &outpost.port_id,
                &outpost.channel_id,
                &coin,
            )?;
        }

        tracing::info!(%granter, %grantee, %coin, increase, "Transfer allowance changed");

        let event = IOsmosisOutpost::AllowanceChange {
            grantee,
            granter,
            methods: vec![TRANSFER_MSG_URL.to_string()],
            values: vec![uint256_to_u256(coin.amount)],
        };
        let output = if increase {
            IOsmosisOutpost::increaseAllowanceCall::abi_encode_returns(&(true,))
        } else {
            IOsmosisOutpost::decreaseAllowanceCall::abi_encode_returns(&(true,))
        };
        Ok(Execution::new(output).with_log(event.encode_log_data()))
    }
}
