//! Positional argument decoding
//!
//! Precompile calls arrive as a loosely typed sequence of ABI values. Each
//! handler names the tuple it expects and [`decode_args`] either produces the
//! whole tuple or fails on arity or on the first mismatched position. Nothing
//! is partially decoded.

use crate::error::PrecompileError;
use alloy::dyn_abi::DynSolValue;
use crate::types::Amount;
use alloy::primitives::Address;

// ============================================================================
// Single Values
// ============================================================================

/// A domain type that can be extracted from one untyped argument.
pub trait FromArg: Sized {
    /// Human-readable name of the accepted type, used in [`PrecompileError::TypeError`].
    fn expected() -> String;

    fn from_arg(value: &DynSolValue) -> Option<Self>;
}

impl FromArg for Address {
    fn expected() -> String {
        "address".to_string()
    }

    fn from_arg(value: &DynSolValue) -> Option<Self> {
        match value {
            DynSolValue::Address(address) => Some(*address),
            _ => None,
        }
    }
}

impl FromArg for String {
    fn expected() -> String {
        "string".to_string()
    }

    fn from_arg(value: &DynSolValue) -> Option<Self> {
        match value {
            DynSolValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Big integer amounts: accepted from signed or unsigned words so negative
/// values reach domain validation instead of failing here.
impl FromArg for Amount {
    fn expected() -> String {
        "integer".to_string()
    }

    fn from_arg(value: &DynSolValue) -> Option<Self> {
        match value {
            DynSolValue::Int(i, _) => Some(Amount::Signed(*i)),
            DynSolValue::Uint(u, _) => Some(Amount::Unsigned(*u)),
            _ => None,
        }
    }
}

impl<T: FromArg> FromArg for Vec<T> {
    fn expected() -> String {
        format!("{}[]", T::expected())
    }

    fn from_arg(value: &DynSolValue) -> Option<Self> {
        match value {
            DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
                values.iter().map(T::from_arg).collect()
            }
            _ => None,
        }
    }
}

/// A `(string denom, uint256 amount)` tuple as passed by Solidity callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinArg {
    pub denom: String,
    pub amount: Amount,
}

impl FromArg for CoinArg {
    fn expected() -> String {
        "(string,uint256)".to_string()
    }

    fn from_arg(value: &DynSolValue) -> Option<Self> {
        match value {
            DynSolValue::Tuple(fields) if fields.len() == 2 => Some(CoinArg {
                denom: String::from_arg(&fields[0])?,
                amount: Amount::from_arg(&fields[1])?,
            }),
            _ => None,
        }
    }
}

/// Short type name of an untyped value for error messages.
pub fn kind_of(value: &DynSolValue) -> &'static str {
    match value {
        DynSolValue::Bool(_) => "bool",
        DynSolValue::Int(..) => "int",
        DynSolValue::Uint(..) => "uint",
        DynSolValue::Address(_) => "address",
        DynSolValue::Bytes(_) => "bytes",
        DynSolValue::String(_) => "string",
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) => "array",
        DynSolValue::Tuple(_) => "tuple",
        _ => "other",
    }
}

// ============================================================================
// Argument Tuples
// ============================================================================

/// A fixed-arity tuple of [`FromArg`] values.
pub trait DecodeArgs: Sized {
    const ARITY: usize;

    fn decode_args(args: &[DynSolValue]) -> Result<Self, PrecompileError>;
}

/// Decode the full argument list into `T`, failing before any partial value
/// is produced.
pub fn decode_args<T: DecodeArgs>(args: &[DynSolValue]) -> Result<T, PrecompileError> {
    T::decode_args(args)
}

fn check_arity(expected: usize, got: usize) -> Result<(), PrecompileError> {
    if expected != got {
        return Err(PrecompileError::ArityError { expected, got });
    }
    Ok(())
}

fn decode_at<T: FromArg>(args: &[DynSolValue], index: usize) -> Result<T, PrecompileError> {
    let value = &args[index];
    T::from_arg(value).ok_or_else(|| PrecompileError::TypeError {
        index,
        expected: T::expected(),
        got: kind_of(value).to_string(),
    })
}

macro_rules! impl_decode_args {
    ($arity:expr; $($idx:tt => $ty:ident),*) => {
        impl<$($ty: FromArg),*> DecodeArgs for ($($ty,)*) {
            const ARITY: usize = $arity;

            #[allow(unused_variables)]
            fn decode_args(args: &[DynSolValue]) -> Result<Self, PrecompileError> {
                check_arity(Self::ARITY, args.len())?;
                Ok(($(decode_at::<$ty>(args, $idx)?,)*))
            }
        }
    };
}

impl_decode_args!(0;);
impl_decode_args!(1; 0 => A);
impl_decode_args!(2; 0 => A, 1 => B);
impl_decode_args!(3; 0 => A, 1 => B, 2 => C);
impl_decode_args!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
