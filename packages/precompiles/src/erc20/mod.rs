//! ERC-20 precompile
//!
//! Exposes one ledger denomination as an ERC-20 token. Balances and supply
//! come straight from the bank module; allowances are bank send grants in the
//! authz module.

mod query;
mod tx;

use crate::abi::{AbiMethod, MethodKind, MethodTable, IERC20};
use crate::config::PrecompileConfig;
use crate::dispatch::{CallContext, Execution, Precompile};
use crate::error::PrecompileError;
use crate::gas::GasConfig;
use crate::keepers::{AuthzKeeper, BankKeeper};
use crate::types::validate_denom;
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use alloy::sol_types::SolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erc20Method {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf,
    Allowance,
    Transfer,
    TransferFrom,
    Approve,
}

impl AbiMethod for Erc20Method {
    const ALL: &'static [Self] = &[
        Erc20Method::Name,
        Erc20Method::Symbol,
        Erc20Method::Decimals,
        Erc20Method::TotalSupply,
        Erc20Method::BalanceOf,
        Erc20Method::Allowance,
        Erc20Method::Transfer,
        Erc20Method::TransferFrom,
        Erc20Method::Approve,
    ];

    fn selector(self) -> [u8; 4] {
        match self {
            Erc20Method::Name => IERC20::nameCall::SELECTOR,
            Erc20Method::Symbol => IERC20::symbolCall::SELECTOR,
            Erc20Method::Decimals => IERC20::decimalsCall::SELECTOR,
            Erc20Method::TotalSupply => IERC20::totalSupplyCall::SELECTOR,
            Erc20Method::BalanceOf => IERC20::balanceOfCall::SELECTOR,
            Erc20Method::Allowance => IERC20::allowanceCall::SELECTOR,
            Erc20Method::Transfer => IERC20::transferCall::SELECTOR,
            Erc20Method::TransferFrom => IERC20::transferFromCall::SELECTOR,
            Erc20Method::Approve => IERC20::approveCall::SELECTOR,
        }
    }

    fn signature(self) -> &'static str {
        match self {
            Erc20Method::Name => IERC20::nameCall::SIGNATURE,
            Erc20Method::Symbol => IERC20::symbolCall::SIGNATURE,
            Erc20Method::Decimals => IERC20::decimalsCall::SIGNATURE,
            Erc20Method::TotalSupply => IERC20::totalSupplyCall::SIGNATURE,
            Erc20Method::BalanceOf => IERC20::balanceOfCall::SIGNATURE,
            Erc20Method::Allowance => IERC20::allowanceCall::SIGNATURE,
            Erc20Method::Transfer => IERC20::transferCall::SIGNATURE,
            Erc20Method::TransferFrom => IERC20::transferFromCall::SIGNATURE,
            Erc20Method::Approve => IERC20::approveCall::SIGNATURE,
        }
    }

    fn kind(self) -> MethodKind {
        match self {
            Erc20Method::Transfer | Erc20Method::TransferFrom | Erc20Method::Approve => {
                MethodKind::Transaction
            }
            _ => MethodKind::Query,
        }
    }
}

/// ERC-20 facade over a single ledger denomination.
pub struct Erc20Precompile<B, A> {
    address: Address,
    denom: String,
    bank: B,
    authz: A,
    config: PrecompileConfig,
    methods: MethodTable<Erc20Method>,
}

impl<B: BankKeeper, A: AuthzKeeper> Erc20Precompile<B, A> {
    pub fn new(
        address: Address,
        denom: impl Into<String>,
        bank: B,
        authz: A,
        config: PrecompileConfig,
    ) -> Result<Self, PrecompileError> {
        let denom = denom.into();
        validate_denom(&denom).map_err(|reason| PrecompileError::InvalidCoin { reason })?;

        Ok(Self {
            address,
            denom,
            bank,
            authz,
            config,
            methods: MethodTable::new()?,
        })
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }
}

impl<B: BankKeeper, A: AuthzKeeper> Precompile for Erc20Precompile<B, A> {
    type Method = Erc20Method;

    fn address(&self) -> Address {
        self.address
    }

    fn methods(&self) -> &MethodTable<Erc20Method> {
        &self.methods
    }

    fn gas_config(&self) -> &GasConfig {
        &self.config.gas
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        method: Erc20Method,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        match method {
            Erc20Method::Name => self.name(ctx, args),
            Erc20Method::Symbol => self.symbol(ctx, args),
            Erc20Method::Decimals => self.decimals(ctx, args),
            Erc20Method::TotalSupply => self.total_supply(ctx, args),
            Erc20Method::BalanceOf => self.balance_of(ctx, args),
            Erc20Method::Allowance => self.allowance(ctx, args),
            Erc20Method::Transfer => self.transfer(ctx, args),
            Erc20Method::TransferFrom => self.transfer_from(ctx, args),
            Erc20Method::Approve => self.approve(ctx, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthz, MockBank};

    #[test]
    fn test_method_kinds() {
        assert_eq!(Erc20Method::BalanceOf.kind(), MethodKind::Query);
        assert_eq!(Erc20Method::Approve.kind(), MethodKind::Transaction);
        assert_eq!(Erc20Method::TransferFrom.name(), "transferFrom");
    }

    #[test]
    fn test_new_rejects_invalid_denom() {
        let result = Erc20Precompile::new(
            Address::repeat_byte(1),
            "1x",
            MockBank,
            MockAuthz,
            PrecompileConfig::default(),
        );
        assert!(matches!(result, Err(PrecompileError::InvalidCoin { .. })));
    }

    #[test]
    fn test_required_gas() {
        let precompile = Erc20Precompile::new(
            Address::repeat_byte(1),
            "aevmos",
            MockBank,
            MockAuthz,
            PrecompileConfig::default(),
        )
        .unwrap();

        let input = IERC20::nameCall {}.abi_encode();
        assert_eq!(precompile.required_gas(&input), 1000 + 3 * 4);
        assert!(!precompile.is_transaction(&input));
        assert_eq!(precompile.required_gas(&[0xff; 4]), 0);
    }
}
