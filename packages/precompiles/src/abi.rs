//! Precompile ABI definitions and method tables
//!
//! Uses alloy's sol! macro to declare the Solidity interfaces the precompiles
//! expose. Selectors and canonical signatures are taken from the generated
//! call types, so the dispatch tables can never drift from the ABI.

#![allow(clippy::too_many_arguments)]

use crate::error::PrecompileError;
use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::keccak256;
use alloy::sol;
use std::collections::BTreeMap;
use std::fmt;

sol! {
    /// ERC-20 facade over a single ledger denomination
    interface IERC20 {
        // ====================================================================
        // Queries
        // ====================================================================

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);

        // ====================================================================
        // Transactions
        // ====================================================================

        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);

        // ====================================================================
        // Events
        // ====================================================================

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }

    /// Cross-chain swap outpost routing tokens to Osmosis over ICS-20
    interface IOsmosisOutpost {
        struct Coin {
            string denom;
            uint256 amount;
        }

        function swap(
            address sender,
            uint256 amount,
            string receiver,
            string inputDenom,
            string outputDenom
        ) external returns (bool);

        function approveTransfer(
            address grantee,
            Coin[] spendLimit,
            string[] allowList
        ) external returns (bool);

        function increaseAllowance(
            address grantee,
            string denom,
            uint256 amount
        ) external returns (bool);

        function decreaseAllowance(
            address grantee,
            string denom,
            uint256 amount
        ) external returns (bool);

        event IBCTransfer(
            address indexed sender,
            string receiver,
            string sourcePort,
            string sourceChannel,
            string denom,
            uint256 amount,
            string memo
        );

        event TransferAuthorization(
            address indexed grantee,
            address indexed granter,
            string sourcePort,
            string sourceChannel,
            Coin[] spendLimit
        );

        event AllowanceChange(
            address indexed grantee,
            address indexed granter,
            string[] methods,
            uint256[] values
        );
    }

    /// Liquid staking outpost routing tokens to Stride over ICS-20
    interface IStrideOutpost {
        struct Coin {
            string denom;
            uint256 amount;
        }

        function liquidStake(Coin token, string receiver) external returns (bool);

        event LiquidStake(
            address indexed sender,
            string receiver,
            string sourceChannel,
            string denom,
            uint256 amount
        );
    }
}

// ============================================================================
// Method Tables
// ============================================================================

/// Gas class of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Read-only, charged a fixed base amount
    Query,
    /// State-changing, metered against actual storage access
    Transaction,
}

/// A closed set of methods exposed by one precompile.
pub trait AbiMethod: Copy + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn selector(self) -> [u8; 4];

    /// Canonical signature, e.g. `transfer(address,uint256)`
    fn signature(self) -> &'static str;

    fn kind(self) -> MethodKind;

    fn name(self) -> &'static str {
        let signature = self.signature();
        signature.split('(').next().unwrap_or(signature)
    }
}

/// A resolved method: the handler tag and the parameter types used to decode
/// its calldata.
#[derive(Debug, Clone)]
pub struct MethodEntry<M> {
    pub method: M,
    pub inputs: DynSolType,
}

impl<M: AbiMethod> MethodEntry<M> {
    /// Decode the argument portion of calldata into untyped values.
    ///
    /// Empty calldata yields no arguments at all so that arity is reported by
    /// the handler's own decoder.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<DynSolValue>, PrecompileError> {
        if data.is_empty() {
            return Ok(vec![]);
        }

        let decoded =
            self.inputs
                .abi_decode_params(data)
                .map_err(|e| PrecompileError::InvalidCalldata {
                    method: self.method.name().to_string(),
                    reason: e.to_string(),
                })?;

        match decoded {
            DynSolValue::Tuple(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }
}

/// Selector lookup table, built once per precompile instance.
#[derive(Debug, Clone)]
pub struct MethodTable<M> {
    entries: BTreeMap<[u8; 4], MethodEntry<M>>,
}

impl<M: AbiMethod> MethodTable<M> {
    pub fn new() -> Result<Self, PrecompileError> {
        let mut entries = BTreeMap::new();

        for &method in M::ALL {
            let signature = method.signature();
            let selector = method.selector();

            if keccak256(signature.as_bytes())[..4] != selector {
                return Err(PrecompileError::InvalidMethodTable {
                    reason: format!("selector mismatch for {}", signature),
                });
            }

            let inputs = parse_inputs(signature)?;
            if entries
                .insert(selector, MethodEntry { method, inputs })
                .is_some()
            {
                return Err(PrecompileError::InvalidMethodTable {
                    reason: format!("duplicate selector 0x{}", hex::encode(selector)),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Split calldata into the resolved method and its argument bytes.
    pub fn lookup<'d>(
        &self,
        input: &'d [u8],
    ) -> Result<(&MethodEntry<M>, &'d [u8]), PrecompileError> {
        if input.len() < 4 {
            return Err(PrecompileError::UnknownMethod {
                selector: hex::encode(input),
            });
        }

        let (selector, data) = input.split_at(4);
        let mut key = [0u8; 4];
        key.copy_from_slice(selector);

        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| PrecompileError::UnknownMethod {
                selector: hex::encode(key),
            })?;

        Ok((entry, data))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_inputs(signature: &str) -> Result<DynSolType, PrecompileError> {
    let params = signature
        .find('(')
        .map(|start| &signature[start..])
        .ok_or_else(|| PrecompileError::InvalidMethodTable {
            reason: format!("malformed signature {}", signature),
        })?;

    if params == "()" {
        return Ok(DynSolType::Tuple(vec![]));
    }

    DynSolType::parse(params).map_err(|e| PrecompileError::InvalidMethodTable {
        reason: format!("unparseable signature {}: {}", signature, e),
    })
}
