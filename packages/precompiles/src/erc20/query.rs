use super::Erc20Precompile;
use crate::abi::IERC20;
use crate::args::decode_args;
use crate::authz;
use crate::bank;
use crate::denom;
use crate::dispatch::{CallContext, Execution};
use crate::error::PrecompileError;
use crate::keepers::{AuthzKeeper, BankKeeper};
use crate::types::uint256_to_u256;
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use alloy::sol_types::SolCall;

impl<B: BankKeeper, A: AuthzKeeper> Erc20Precompile<B, A> {
    pub(super) fn name(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        decode_args::<()>(args)?;
        let name = denom::name(&self.bank, ctx.storage, &self.denom)?;
        Ok(Execution::new(IERC20::nameCall::abi_encode_returns(&(
            name,
        ))))
    }

    pub(super) fn symbol(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        decode_args::<()>(args)?;
        let symbol = denom::symbol(&self.bank, ctx.storage, &self.denom)?;
        Ok(Execution::new(IERC20::symbolCall::abi_encode_returns(&(
            symbol,
        ))))
    }

    pub(super) fn decimals(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        decode_args::<()>(args)?;
        let decimals = denom::decimals(&self.bank, ctx.storage, &self.denom)?;
        Ok(Execution::new(IERC20::decimalsCall::abi_encode_returns(&(
            decimals,
        ))))
    }

    pub(super) fn total_supply(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        decode_args::<()>(args)?;
        let supply = bank::total_supply(&self.bank, ctx.storage, &self.denom)?;
        Ok(Execution::new(IERC20::totalSupplyCall::abi_encode_returns(
            &(uint256_to_u256(supply),),
        )))
    }

    pub(super) fn balance_of(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (account,) = decode_args::<(Address,)>(args)?;
        let balance = bank::balance_of(&self.bank, ctx.storage, &account, &self.denom)?;
        Ok(Execution::new(IERC20::balanceOfCall::abi_encode_returns(
            &(uint256_to_u256(balance),),
        )))
    }

    /// Never fails once arguments decode: missing, expired or foreign grants
    /// read as zero.
    ///
    /// The send grant is shared by every denomination and its limits are kept
    /// sorted by denom. The first limit is reported whatever this token's
    /// denom is, so with `uatom` and `aevmos` both approved, `allowance` on
    /// the `uatom` token returns the `aevmos` amount.
    pub(super) fn allowance(
        &self,
        ctx: &mut CallContext<'_>,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        let (owner, spender) = decode_args::<(Address, Address)>(args)?;
        let allowance = authz::allowance(&self.authz, ctx.storage, ctx.block, &owner, &spender);
        Ok(Execution::new(IERC20::allowanceCall::abi_encode_returns(
            &(uint256_to_u256(allowance),),
        )))
    }
}
