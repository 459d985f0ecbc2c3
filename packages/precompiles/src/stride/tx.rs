use super::StrideOutpost;
use crate::abi::IStrideOutpost;
use crate::dispatch::{CallContext, Execution};
use crate::error::PrecompileError;
use crate::keepers::TransferKeeper;
use crate::packet::build_liquid_stake;
use crate::types::uint256_to_u256;
use alloy::dyn_abi::DynSolValue;
use alloy::sol_types::{SolCall, SolEvent};

impl<T: TransferKeeper> StrideOutpost<T> {
    /// Send the origin's bond tokens to Stride and liquid stake them for
    /// `receiver`. Only the origin itself may stake.
    pub(super) fn liquid_stake(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        if ctx.caller != ctx.origin {
            return Err(PrecompileError::DifferentOrigin {
                origin: ctx.origin.to_string(),
                sender: ctx.caller.to_string(),
            });
        }

        let sender = ctx.origin;
        let packet = build_liquid_stake(
            &self.config.stride,
            &self.config.bech32_prefix,
            ctx.block,
            &sender,
            args,
        )?;

        let sequence = self.transfer.send_transfer(ctx.storage, ctx.block, &packet)?;

        tracing::info!(
            %sender,
            receiver = %packet.receiver,
            token = %packet.token,
            channel = %packet.source_channel,
            sequence,
            "Liquid stake submitted"
        );

        let event = IStrideOutpost::LiquidStake {
            sender,
            receiver: packet.receiver.clone(),
            sourceChannel: packet.source_channel.clone(),
            denom: packet.token.denom.clone(),
            amount: uint256_to_u256(packet.token.amount),
        };
        Ok(
            Execution::new(IStrideOutpost::liquidStakeCall::abi_encode_returns(&(true,)))
                .with_log(event.encode_log_data()),
        )
    }
}
