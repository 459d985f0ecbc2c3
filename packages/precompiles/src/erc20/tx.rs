use super::Erc20Precompile;
use crate::abi::IERC20;
use crate::address_codec::{evm_to_bech32, to_canonical};
use crate::args::decode_args;
use crate::authz;
use crate::dispatch::{CallContext, Execution};
use crate::error::PrecompileError;
use crate::keepers::{AuthzKeeper, BankKeeper};
use crate::types::{uint256_to_u256, Amount, Coin};
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use alloy::sol_types::{SolCall, SolEvent};
use cosmwasm_std::StdError;

impl<B: BankKeeper, A: AuthzKeeper> Erc20Precompile<B, A> {
    fn coin(&self, amount: Amount) -> Result<Coin, PrecompileError> {
        Coin::from_amount(&self.denom, amount).map_err(|reason| PrecompileError::InvalidCoin { reason })
    }

    /// Move `coin` between the ledger accounts behind two EVM addresses and
    /// build the matching `Transfer` event.
    fn send(
        &self,
        ctx: &mut CallContext<'_>,
        from: &Address,
        to: &Address,
        coin: &Coin,
    ) -> Result<Execution, PrecompileError> {
        self.bank
            .send(ctx.storage, &to_canonical(from), &to_canonical(to), coin)?;

        tracing::info!(%from, %to, coin = %coin, "ERC-20 transfer");

        let event = IERC20::Transfer {
            from: *from,
            to: *to,
            value: uint256_to_u256(coin.amount),
        };
        Ok(
            Execution::new(IERC20::transferCall::abi_encode_returns(&(true,)))
                .with_log(event.encode_log_data()),
        )
    }

    pub(super) fn transfer(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (to, amount) = decode_args::<(Address, Amount)>(args)?;
        let coin = self.coin(amount)?;
        let from = ctx.caller;

        self.send(ctx, &from, &to, &coin)
    }

    /// Spends the caller's allowance unless the caller moves its own funds.
    pub(super) fn transfer_from(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (from, to, amount) = decode_args::<(Address, Address, Amount)>(args)?;
        let coin = self.coin(amount)?;
        let spender = ctx.caller;

        if spender != from {
            let balance = self.bank.balance(ctx.storage, &to_canonical(&from), &self.denom)?;
            if balance < coin.amount {
                return Err(StdError::generic_err(format!(
                    "spendable balance {}{} is smaller than {}: insufficient funds",
                    balance, self.denom, coin
                ))
                .into());
            }

            let recipient = evm_to_bech32(&to, &self.config.bech32_prefix)?;
            authz::consume_send_allowance(
                &self.authz,
                ctx.storage,
                ctx.block,
                &from,
                &spender,
                &recipient,
                &coin,
            )?;
        }

        let execution = self.send(ctx, &from, &to, &coin)?;
        Ok(Execution {
            output: IERC20::transferFromCall::abi_encode_returns(&(true,)),
            ..execution
        })
    }

    pub(super) fn approve(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (spender, amount) = decode_args::<(Address, Amount)>(args)?;
        let coin = self.coin(amount)?;
        let owner = ctx.caller;

        authz::approve(
            &self.authz,
            ctx.storage,
            ctx.block,
            &owner,
            &spender,
            &coin,
            self.config.approval_expiration_secs,
        )?;

        let event = IERC20::Approval {
            owner,
            spender,
            value: uint256_to_u256(coin.amount),
        };
        Ok(
            Execution::new(IERC20::approveCall::abi_encode_returns(&(true,)))
                .with_log(event.encode_log_data()),
        )
    }
}
