//! This module defines the element-wise operation layer: the operator set,
//! operand normalization and name reconciliation, plus the arithmetic
//! primitive and the numeric error policy it runs under.

use crate::error::Result;
use crate::scalar::Scalar;
use crate::values::{ArrayValues, RangeValues};
use std::fmt;

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod arithmetic;
pub mod errstate;

pub use arithmetic::arithmetic_op;
pub use errstate::{errstate, geterr, seterr, ErrAction, ErrState, ErrStateGuard, FpErrorKind};

//==================================================================================
// 2. Operators
//==================================================================================

/// A binary arithmetic operator. The `R*` variants are the reflected forms,
/// evaluated as `other <op> self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    RAdd,
    RSub,
    RMul,
    RTrueDiv,
    RFloorDiv,
    RMod,
    RPow,
}

impl ArithOp {
    pub fn is_reflected(&self) -> bool {
        matches!(
            self,
            ArithOp::RAdd
                | ArithOp::RSub
                | ArithOp::RMul
                | ArithOp::RTrueDiv
                | ArithOp::RFloorDiv
                | ArithOp::RMod
                | ArithOp::RPow
        )
    }

    /// The forward operator of a reflected one; forward operators map to
    /// themselves.
    pub fn unreflected(&self) -> ArithOp {
        match self {
            ArithOp::RAdd => ArithOp::Add,
            ArithOp::RSub => ArithOp::Sub,
            ArithOp::RMul => ArithOp::Mul,
            ArithOp::RTrueDiv => ArithOp::TrueDiv,
            ArithOp::RFloorDiv => ArithOp::FloorDiv,
            ArithOp::RMod => ArithOp::Mod,
            ArithOp::RPow => ArithOp::Pow,
            forward => *forward,
        }
    }

    /// Method-style name, e.g. `add`, `rtruediv`.
    pub fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::TrueDiv => "truediv",
            ArithOp::FloorDiv => "floordiv",
            ArithOp::Mod => "mod",
            ArithOp::Pow => "pow",
            ArithOp::RAdd => "radd",
            ArithOp::RSub => "rsub",
            ArithOp::RMul => "rmul",
            ArithOp::RTrueDiv => "rtruediv",
            ArithOp::RFloorDiv => "rfloordiv",
            ArithOp::RMod => "rmod",
            ArithOp::RPow => "rpow",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self.unreflected() {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::TrueDiv => "/",
            ArithOp::FloorDiv => "//",
            ArithOp::Mod => "%",
            _ => "**",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

//==================================================================================
// 3. Operands
//==================================================================================

/// Which named container an operand came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Series,
    Index,
}

/// The right-hand side of an element-wise operation.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A single value, broadcast against every element.
    Scalar(Scalar),
    /// Raw values with no name: a native array, masked array, object array
    /// or range.
    Array(ArrayValues),
    /// A named container's backing values.
    Container {
        values: ArrayValues,
        name: Option<String>,
        kind: ContainerKind,
    },
}

impl Operand {
    /// The operand's name, if it is a named container.
    pub fn container_name(&self) -> Option<Option<&str>> {
        match self {
            Operand::Container { name, .. } => Some(name.as_deref()),
            _ => None,
        }
    }
}

impl From<Scalar> for Operand {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Scalar(Scalar::Int(v))
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Scalar(Scalar::Int(i64::from(v)))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Scalar(Scalar::Str(v.to_string()))
    }
}

impl From<ArrayValues> for Operand {
    fn from(values: ArrayValues) -> Self {
        Operand::Array(values)
    }
}

impl From<RangeValues> for Operand {
    fn from(r: RangeValues) -> Self {
        Operand::Array(ArrayValues::Range(r))
    }
}

/// The normalized form of an operand: a broadcast scalar or raw values.
#[derive(Debug, Clone)]
pub enum Extracted {
    Scalar(Scalar),
    Array(ArrayValues),
}

/// Unwraps an operand down to raw values.
///
/// Named containers give up their backing values. With `extract_range`, a
/// container's lazy range is materialized into a native `Int64` array. A
/// bare range passed as `Operand::Array` is returned as is. Native storage is
/// already the unwrapped form, so the numpy flag has nothing to unwrap.
pub fn extract_array(operand: &Operand, _extract_numpy: bool, extract_range: bool) -> Extracted {
    match operand {
        Operand::Scalar(s) => Extracted::Scalar(s.clone()),
        Operand::Array(values) => Extracted::Array(values.clone()),
        Operand::Container { values, .. } => {
            if extract_range && values.is_range() {
                Extracted::Array(values.materialize())
            } else {
                Extracted::Array(values.clone())
            }
        }
    }
}

/// Returns `a` when both names are equal, `None` otherwise.
pub fn maybe_match_name(a: Option<&str>, b: Option<&str>) -> Option<String> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => Some(x.to_string()),
        _ => None,
    }
}

/// Name of the result of `left <op> other`.
///
/// Against a named container the names are reconciled with
/// `maybe_match_name`; against a scalar or raw array the left name is kept.
pub fn get_op_result_name(left: Option<&str>, other: &Operand) -> Option<String> {
    match other.container_name() {
        Some(right) => maybe_match_name(left, right),
        None => left.map(str::to_string),
    }
}

/// Validates that an array operand lines up with `len` elements.
pub(crate) fn check_lengths(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(crate::error::TabulaError::ValueError(format!(
            "Lengths must match to perform the operation: {} != {}",
            left, right
        )));
    }
    Ok(())
}
