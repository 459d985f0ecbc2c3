//! Stride outpost precompile
//!
//! Liquid stakes the bond denomination on Stride: the tokens go over ICS-20
//! with an autopilot memo and the staked derivative is minted to a Stride
//! receiver.

mod tx;

use crate::abi::{AbiMethod, IStrideOutpost, MethodKind, MethodTable};
use crate::config::PrecompileConfig;
use crate::dispatch::{CallContext, Execution, Precompile};
use crate::error::PrecompileError;
use crate::gas::GasConfig;
use crate::keepers::TransferKeeper;
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{address, Address};
use alloy::sol_types::SolCall;

/// Fixed address of the Stride outpost
pub const STRIDE_OUTPOST_ADDRESS: Address = address!("0000000000000000000000000000000000000900");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideMethod {
    LiquidStake,
}

impl AbiMethod for StrideMethod {
    const ALL: &'static [Self] = &[StrideMethod::LiquidStake];

    fn selector(self) -> [u8; 4] {
        match self {
            StrideMethod::LiquidStake => IStrideOutpost::liquidStakeCall::SELECTOR,
        }
    }

    fn signature(self) -> &'static str {
        match self {
            StrideMethod::LiquidStake => IStrideOutpost::liquidStakeCall::SIGNATURE,
        }
    }

    fn kind(self) -> MethodKind {
        MethodKind::Transaction
    }
}

pub struct StrideOutpost<T> {
    transfer: T,
    config: PrecompileConfig,
    methods: MethodTable<StrideMethod>,
}

impl<T: TransferKeeper> StrideOutpost<T> {
    pub fn new(transfer: T, config: PrecompileConfig) -> Result<Self, PrecompileError> {
        Ok(Self {
            transfer,
            config,
            methods: MethodTable::new()?,
        })
    }
}

impl<T: TransferKeeper> Precompile for StrideOutpost<T> {
    type Method = StrideMethod;

    fn address(&self) -> Address {
        STRIDE_OUTPOST_ADDRESS
    }

    fn methods(&self) -> &MethodTable<StrideMethod> {
        &self.methods
    }

    fn gas_config(&self) -> &GasConfig {
        &self.config.gas
    }

    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        method: StrideMethod,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError> {
        match method {
            StrideMethod::LiquidStake => self.liquid_stake(ctx, args),
        }
    }
}
