//! Dispatcher
//!
//! Routes raw calldata to a precompile method, meters it and turns every
//! domain error into an ABI `Error(string)` revert. Precompiles only implement
//! [`Precompile::execute`]; selector resolution, write protection, gas and
//! log addressing all happen here.

use crate::abi::{AbiMethod, MethodKind, MethodTable};
use crate::error::PrecompileError;
use crate::gas::{GasConfig, MeteredStorage};
use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Log, LogData};
use alloy::sol_types::{Revert, SolError};
use cosmwasm_std::{BlockInfo, Storage};
use thiserror::Error;

/// Execution environment of a single precompile call.
pub struct CallContext<'a> {
    /// Ledger state, shared with every keeper the call touches
    pub storage: &'a mut dyn Storage,
    pub block: &'a BlockInfo,
    /// Immediate caller (`msg.sender`)
    pub caller: Address,
    /// Transaction origin (`tx.origin`)
    pub origin: Address,
    /// Set for `STATICCALL`
    pub read_only: bool,
}

impl<'a> CallContext<'a> {
    pub fn new(
        storage: &'a mut dyn Storage,
        block: &'a BlockInfo,
        caller: Address,
        origin: Address,
    ) -> Self {
        Self {
            storage,
            block,
            caller,
            origin,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Result of a handler: ABI-encoded return data and the events it emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub output: Vec<u8>,
    pub logs: Vec<LogData>,
}

impl Execution {
    pub fn new(output: Vec<u8>) -> Self {
        Self {
            output,
            logs: vec![],
        }
    }

    pub fn with_log(mut self, log: LogData) -> Self {
        self.logs.push(log);
        self
    }
}

/// Successful precompile call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub output: Vec<u8>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

/// Failed precompile call. Logs are discarded; state rollback is up to the
/// host.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("execution reverted: {reason}")]
pub struct Reverted {
    pub reason: String,
    /// ABI-encoded `Error(string)`
    pub data: Vec<u8>,
    pub gas_used: u64,
}

impl Reverted {
    fn new(err: &PrecompileError, gas_used: u64) -> Self {
        let reason = err.revert_reason();
        let data = Revert {
            reason: reason.clone(),
        }
        .abi_encode();
        Self {
            reason,
            data,
            gas_used,
        }
    }
}

/// A native-module precompile bound to a fixed EVM address.
pub trait Precompile {
    type Method: AbiMethod;

    fn address(&self) -> Address;

    fn methods(&self) -> &MethodTable<Self::Method>;

    fn gas_config(&self) -> &GasConfig;

    /// Run one decoded method. Arity and argument types are checked by the
    /// handler itself.
    fn execute(
        &self,
        ctx: &mut CallContext<'_>,
        method: Self::Method,
        args: &[DynSolValue],
    ) -> Result<Execution, PrecompileError>;

    /// Base gas for `input`; unknown selectors require nothing.
    fn required_gas(&self, input: &[u8]) -> u64 {
        match self.methods().lookup(input) {
            Ok((entry, _)) => self
                .gas_config()
                .required_gas(input.len(), entry.method.kind()),
            Err(_) => 0,
        }
    }

    fn is_transaction(&self, input: &[u8]) -> bool {
        matches!(
            self.methods().lookup(input),
            Ok((entry, _)) if entry.method.kind() == MethodKind::Transaction
        )
    }

    /// Dispatch `input` and pack the outcome for the EVM.
    fn run(&self, ctx: &mut CallContext<'_>, input: &[u8]) -> Result<RunOutput, Reverted> {
        let address = self.address();
        let span = tracing::debug_span!("precompile", %address);
        let _enter = span.enter();

        let (entry, data) = self.methods().lookup(input).map_err(|e| {
            tracing::debug!(error = %e, "Rejected call");
            Reverted::new(&e, 0)
        })?;
        let method = entry.method;
        let kind = method.kind();
        let base_gas = self.gas_config().required_gas(input.len(), kind);

        if kind == MethodKind::Transaction && ctx.read_only {
            let err = PrecompileError::WriteProtection {
                method: method.name().to_string(),
            };
            return Err(Reverted::new(&err, base_gas));
        }

        let args = entry
            .decode(data)
            .map_err(|e| Reverted::new(&e, base_gas))?;

        tracing::debug!(method = ?method, args = args.len(), "Executing");

        let (result, gas_used) = match kind {
            MethodKind::Query => (self.execute(ctx, method, &args), base_gas),
            MethodKind::Transaction => {
                let mut metered = MeteredStorage::new(&mut *ctx.storage, *self.gas_config());
                let mut inner = CallContext {
                    storage: &mut metered,
                    block: ctx.block,
                    caller: ctx.caller,
                    origin: ctx.origin,
                    read_only: ctx.read_only,
                };
                let result = self.execute(&mut inner, method, &args);
                (result, base_gas.saturating_add(metered.gas_consumed()))
            }
        };

        match result {
            Ok(execution) => {
                tracing::debug!(method = ?method, gas_used, "Call succeeded");
                Ok(RunOutput {
                    output: execution.output,
                    gas_used,
                    logs: execution
                        .logs
                        .into_iter()
                        .map(|data| Log { address, data })
                        .collect(),
                })
            }
            Err(e) => {
                tracing::debug!(method = ?method, error = %e, gas_used, "Call reverted");
                Err(Reverted::new(&e, gas_used))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_data_is_error_string() {
        let reverted = Reverted::new(&PrecompileError::EmptyGrantee, 42);

        assert_eq!(&reverted.data[..4], &Revert::SELECTOR);
        let decoded = Revert::abi_decode(&reverted.data, true).unwrap();
        assert_eq!(decoded.reason, reverted.reason);
        assert_eq!(reverted.gas_used, 42);
    }
}
