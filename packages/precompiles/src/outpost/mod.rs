//! Osmosis outpost precompile
//!
//! Sends tokens to Osmosis over ICS-20 with a cross-chain swap memo, so the
//! swapped output lands at the receiver in one call. Contracts may swap on a
//! user's behalf once the user has approved a transfer allowance for them, and
//! the user can later raise or lower that allowance per denomination.

mod tx;

use crate::abi::{AbiMethod, MethodKind, MethodTable, IOsmosisOutpost};
use crate::config::PrecompileConfig;
use crate::dispatch::{CallContext, Execution, Precompile};
use crate::error::PrecompileError;
use crate::gas::GasConfig;
use crate::keepers::{AuthzKeeper, BankKeeper, TransferKeeper};
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{address, Address};
use alloy::sol_types::SolCall;

/// Fixed address of the Osmosis outpost
pub const OSMOSIS_OUTPOST_ADDRESS: Address = address!("0000000000000000000000000000000000000901");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutpostMethod {
    Swap,
    ApproveTransfer,
    IncreaseAllowance,
    DecreaseAllowance,
}

impl AbiMethod for OutpostMethod {
    const ALL: &'static [Self] = &[
        OutpostMethod::Swap,
        OutpostMethod::ApproveTransfer,
        OutpostMethod::IncreaseAllowance,
        OutpostMethod::DecreaseAllowance,
    ];

    fn selector(self) -> [u8; 4] {
        match self {
            OutpostMethod::Swap => IOsmosisOutpost::swapCall::SELECTOR,
            OutpostMethod::ApproveTransfer => IOsmosisOutpost::approveTransferCall::SELECTOR,
            OutpostMethod::IncreaseAllowance => IOsmosisOutpost::increaseAllowanceCall::SELECTOR,
            OutpostMethod::DecreaseAllowance => IOsmosisOutpost::decreaseAllowanceCall::SELECTOR,
        }
    }

    fn signature(self) -> &'static str {
        match self {
            OutpostMethod::Swap => IOsmosisOutpost::swapCall::SIGNATURE,
            OutpostMethod::ApproveTransfer => IOsmosisOutpost::approveTransferCall::SIGNATURE,
            OutpostMethod::IncreaseAllowance => IOsmosisOutpost::increaseAllowanceCall::SIGNATURE,
            OutpostMethod::DecreaseAllowance => IOsmosisOutpost::decreaseAllowanceCall::SIGNATURE,
        }
    }

    fn kind(self) -> MethodKind {
        MethodKind::Transaction
    }
}

pub struct OsmosisOutpost<B, A, T> {
    bank: B,
    authz: A,
    transfer: T,
    config: PrecompileConfig,
    methods: MethodTable<OutpostMethod>,
}

impl<B: BankKeeper, A: AuthzKeeper, T: TransferKeeper> OsmosisOutpost<B, A, T> {
    pub fn new(
        bank: B,
        authz: A,
        transfer: T,
        config: PrecompileConfig,
    ) -> Result<Self, PrecompileError> {
        Ok(Self {
            bank,
            authz,
            transfer,
            config,
            methods: MethodTable::new()?,
        })
    }
}

impl<B: BankKeeper, A: AuthzKeeper, T: TransferKeeper> Precompile for OsmosisOutpost<B, A, T> {
    type Method = OutpostMethod;

    fn address(&self) -> Address {
        OSMOSIS_OUTPOST_ADDRESS
    }

    fn methods(&self) -> &MethodTable<OutpostMethod> {
        &self.methods
    }

    fn gas_config(&self) -> &GasConfig {
        &self.config.gas
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        method: OutpostMethod,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        match method {
            OutpostMethod::Swap => self.swap(ctx, args),
            OutpostMethod::ApproveTransfer => self.approve_transfer(ctx, args),
            OutpostMethod::IncreaseAllowance => self.change_allowance(ctx, args, true),
            OutpostMethod::DecreaseAllowance => self.change_allowance(ctx, args, false),
        }
    }
}
