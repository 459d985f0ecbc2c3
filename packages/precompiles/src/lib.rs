//! Precompiles: EVM access to native ledger modules
//!
//! This crate implements stateful precompiles that let EVM contracts call into
//! the ledger's bank, authz and IBC transfer modules:
//!
//! - **ERC-20 Precompile** - An ERC-20 token backed by a bank denomination,
//!   with allowances stored as authz send grants
//! - **Osmosis Outpost** - Cross-chain swaps to Osmosis over ICS-20 with a
//!   swap memo, plus transfer allowances for contracts
//! - **Stride Outpost** - Liquid staking of the bond denomination on Stride
//!   through an autopilot memo
//! - **Dispatcher** - Selector routing, write protection, gas metering and
//!   `Error(string)` reverts shared by every precompile
//! - **Testing Module** - In-memory bank, authz and transfer keepers
//!
//! ## Usage
//!
//! ```ignore
//! use precompiles::{CallContext, Erc20Precompile, Precompile, PrecompileConfig};
//! use precompiles::testing::{MockAuthz, MockBank};
//!
//! let erc20 = Erc20Precompile::new(address, "aevmos", MockBank, MockAuthz, PrecompileConfig::load()?)?;
//! let mut ctx = CallContext::new(&mut storage, &block, caller, origin);
//! let output = erc20.run(&mut ctx, &calldata)?;
//! ```
//!
//! The ledger modules are reached only through the [`keepers`] traits, so a
//! host chain supplies its own implementations.

pub mod abi;
pub mod address_codec;
pub mod args;
pub mod authz;
pub mod bank;
pub mod config;
pub mod denom;
pub mod dispatch;
pub mod erc20;
pub mod error;
pub mod gas;
pub mod keepers;
pub mod outpost;
pub mod packet;
pub mod stride;
pub mod testing;
pub mod types;

// Re-export commonly used items at the crate root
pub use abi::{AbiMethod, IOsmosisOutpost, IStrideOutpost, MethodKind, MethodTable, IERC20};
pub use authz::{AllowanceLookup, Authorization, Grant, SEND_MSG_URL, TRANSFER_MSG_URL};
pub use config::{OutpostConfig, PrecompileConfig, StrideConfig};
pub use dispatch::{CallContext, Execution, Precompile, Reverted, RunOutput};
pub use erc20::{Erc20Method, Erc20Precompile};
pub use error::PrecompileError;
pub use gas::{GasConfig, MeteredStorage};
pub use keepers::{AuthzKeeper, BankKeeper, TransferKeeper};
pub use outpost::{OsmosisOutpost, OutpostMethod, OSMOSIS_OUTPOST_ADDRESS};
pub use packet::{TransferPacket, TransferRequest};
pub use stride::{StrideMethod, StrideOutpost, STRIDE_OUTPOST_ADDRESS};
pub use types::{Amount, Coin, DenomUnit, Height, Metadata};
