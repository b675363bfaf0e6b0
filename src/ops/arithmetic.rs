//! The element-wise arithmetic primitive.
//!
//! `arithmetic_op` evaluates `left <op> right` for normalized operands and
//! returns raw values; wrapping the result back into a container is the
//! caller's job. Dtype rules:
//!
//! * int with int stays `Int64` (wrapping on overflow); `truediv` gives `Float64`.
//! * any float operand gives `Float64`; booleans are promoted to integers.
//! * integer `floordiv`/`mod` by zero promotes the whole result to `Float64`
//!   (`x // 0` is `±inf`, `0 // 0` and `x % 0` are `NaN`).
//! * a masked operand makes the result masked, with NA wherever either side
//!   is NA.
//! * string and object operands are evaluated element by element; only
//!   concatenation and repetition are defined for strings.
//!
//! Floating-point events are reported to the active `errstate` policy.

use super::errstate::{self, FpErrorKind};
use super::{check_lengths, ArithOp, Extracted};
use crate::error::{Result, TabulaError};
use crate::scalar::Scalar;
use crate::types::DType;
use crate::values::ArrayValues;

//==================================================================================
// 1. Operand Classification
//==================================================================================

#[derive(Debug, Clone, Copy)]
enum Arg<'a> {
    Array(&'a ArrayValues),
    Scalar(&'a Scalar),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Int,
    Float,
    Text,
    Na,
}

impl<'a> Arg<'a> {
    fn class(&self) -> Class {
        match self {
            Arg::Array(values) => {
                let dtype = values.dtype();
                if dtype.is_float() {
                    Class::Float
                } else if dtype.is_string_like() {
                    Class::Text
                } else {
                    Class::Int
                }
            }
            Arg::Scalar(s) => match s {
                Scalar::Null => Class::Na,
                Scalar::Float(_) => Class::Float,
                Scalar::Int(_) | Scalar::Bool(_) => Class::Int,
                Scalar::Str(_) => Class::Text,
            },
        }
    }

    fn is_masked(&self) -> bool {
        matches!(self, Arg::Array(ArrayValues::Masked(_)))
    }

    fn scalar_at(&self, i: usize) -> Scalar {
        match self {
            Arg::Array(values) => values.get(i),
            Arg::Scalar(s) => (*s).clone(),
        }
    }

    fn ints(&self, len: usize) -> Result<Vec<Option<i64>>> {
        match self {
            Arg::Array(values) => values.int_view().ok_or_else(|| {
                TabulaError::TypeError(format!("{} values have no integer view", values.dtype()))
            }),
            Arg::Scalar(s) => Ok(vec![s.as_i64(); len]),
        }
    }

    fn floats(&self, len: usize) -> Result<Vec<Option<f64>>> {
        match self {
            Arg::Array(values) => values.float_view().ok_or_else(|| {
                TabulaError::TypeError(format!("{} values have no float view", values.dtype()))
            }),
            Arg::Scalar(s) => Ok(vec![s.as_f64(); len]),
        }
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Evaluates `left <op> right` element-wise.
///
/// Reflected operators evaluate `right <op> left`. Array operands must have
/// the same length as `left`.
pub fn arithmetic_op(left: &ArrayValues, right: &Extracted, op: ArithOp) -> Result<ArrayValues> {
    let len = left.len();
    let rhs = match right {
        Extracted::Array(values) => {
            check_lengths(len, values.len())?;
            Arg::Array(values)
        }
        Extracted::Scalar(s) => Arg::Scalar(s),
    };
    let lhs = Arg::Array(left);
    let (a, b) = if op.is_reflected() { (rhs, lhs) } else { (lhs, rhs) };
    let base = op.unreflected();

    log::debug!(
        "arithmetic_op: {} ({:?} {} {:?}) over {} elements",
        op.name(),
        a.class(),
        base.symbol(),
        b.class(),
        len
    );

    let masked = a.is_masked() || b.is_masked();
    let (ca, cb) = (a.class(), b.class());

    if ca == Class::Text || cb == Class::Text {
        return object_binop(a, b, base, len, masked);
    }

    if ca == Class::Na || cb == Class::Na {
        let float = ca == Class::Float || cb == Class::Float || base == ArithOp::TrueDiv;
        return Ok(all_na(len, masked, float));
    }

    let mut use_float = ca == Class::Float || cb == Class::Float || base == ArithOp::TrueDiv;
    let mut ints = None;
    if !use_float {
        let (x, y) = (a.ints(len)?, b.ints(len)?);
        let zero_divisor = y.iter().any(|v| *v == Some(0));
        if matches!(base, ArithOp::FloorDiv | ArithOp::Mod) && zero_divisor {
            use_float = true;
        } else {
            ints = Some((x, y));
        }
    }

    match ints {
        Some((x, y)) if !use_float => int_binop(&x, &y, base, masked),
        _ => float_binop(&a.floats(len)?, &b.floats(len)?, base, masked),
    }
}

//==================================================================================
// 3. Kernels
//==================================================================================

fn all_na(len: usize, masked: bool, float: bool) -> ArrayValues {
    match (masked, float) {
        (true, true) => ArrayValues::masked_f64(vec![None; len]),
        (true, false) => ArrayValues::masked_i64(vec![None; len]),
        (false, _) => ArrayValues::from_f64(vec![f64::NAN; len]),
    }
}

fn int_binop(
    x: &[Option<i64>],
    y: &[Option<i64>],
    op: ArithOp,
    masked: bool,
) -> Result<ArrayValues> {
    let out = x
        .iter()
        .zip(y)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => int_op(*a, *b, op).map(Some),
            _ => Ok(None),
        })
        .collect::<Result<Vec<Option<i64>>>>()?;

    if masked {
        Ok(ArrayValues::masked_i64(out))
    } else {
        Ok(ArrayValues::from_i64(out.into_iter().map(|v| v.unwrap_or(0)).collect()))
    }
}

fn float_binop(
    x: &[Option<f64>],
    y: &[Option<f64>],
    op: ArithOp,
    masked: bool,
) -> Result<ArrayValues> {
    let mut events = FpEvents::default();
    let out: Vec<Option<f64>> = x
        .iter()
        .zip(y)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => {
                let r = float_op(*a, *b, op);
                events.observe(*a, *b, r, op);
                Some(r)
            }
            _ => None,
        })
        .collect();
    events.report(op)?;

    if masked {
        Ok(ArrayValues::masked_f64(out))
    } else {
        Ok(ArrayValues::from_f64(
            out.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        ))
    }
}

fn object_binop(
    a: Arg<'_>,
    b: Arg<'_>,
    op: ArithOp,
    len: usize,
    masked: bool,
) -> Result<ArrayValues> {
    let out = (0..len)
        .map(|i| object_op(&a.scalar_at(i), &b.scalar_at(i), op))
        .collect::<Result<Vec<Scalar>>>()?;

    let textual = out.iter().all(|s| s.is_na() || s.as_str().is_some());
    let dtype = if masked && textual {
        DType::MaskedString
    } else {
        DType::Object
    };
    ArrayValues::from_scalars(out, Some(dtype))
}

/// Integer arithmetic with wrapping overflow. Division by zero is handled by
/// the caller, which routes it to the float kernel.
fn int_op(a: i64, b: i64, op: ArithOp) -> Result<i64> {
    match op {
        ArithOp::Add => Ok(a.wrapping_add(b)),
        ArithOp::Sub => Ok(a.wrapping_sub(b)),
        ArithOp::Mul => Ok(a.wrapping_mul(b)),
        ArithOp::FloorDiv => Ok(floor_div(a, b)),
        ArithOp::Mod => Ok(floor_mod(a, b)),
        ArithOp::Pow => {
            if b < 0 {
                Err(TabulaError::ValueError(
                    "Integers to negative integer powers are not allowed.".to_string(),
                ))
            } else {
                Ok(wrapping_ipow(a, b as u64))
            }
        }
        other => Err(TabulaError::TypeError(format!(
            "operator {} has no integer kernel",
            other
        ))),
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

fn wrapping_ipow(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        exp >>= 1;
        if exp > 0 {
            base = base.wrapping_mul(base);
        }
    }
    acc
}

fn float_op(a: f64, b: f64, op: ArithOp) -> f64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::TrueDiv => a / b,
        ArithOp::FloorDiv => {
            if b == 0.0 {
                a / b
            } else {
                float_floor_div(a, b)
            }
        }
        ArithOp::Mod => {
            if b == 0.0 {
                f64::NAN
            } else {
                float_floor_mod(a, b)
            }
        }
        _ => a.powf(b),
    }
}

/// Floor division built from the remainder so that `1.0 // 0.1 == 9.0`.
fn float_floor_div(a: f64, b: f64) -> f64 {
    let rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 && ((b < 0.0) != (rem < 0.0)) {
        div -= 1.0;
    }
    if div == 0.0 {
        return 0.0f64.copysign(a / b);
    }
    let floor = div.floor();
    if div - floor > 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn float_floor_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r == 0.0 {
        0.0f64.copysign(b)
    } else if (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn object_op(a: &Scalar, b: &Scalar, op: ArithOp) -> Result<Scalar> {
    if a.is_na() || b.is_na() {
        return Ok(Scalar::Null);
    }
    let unsupported = || {
        TabulaError::TypeError(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ))
    };

    match (a, b) {
        (Scalar::Str(x), Scalar::Str(y)) if op == ArithOp::Add => {
            Ok(Scalar::Str(format!("{}{}", x, y)))
        }
        (Scalar::Str(s), Scalar::Int(n)) | (Scalar::Int(n), Scalar::Str(s))
            if op == ArithOp::Mul =>
        {
            let times = usize::try_from((*n).max(0)).unwrap_or(usize::MAX);
            if s.len().checked_mul(times).is_none() {
                return Err(TabulaError::ValueError(format!(
                    "repeating a string of length {} {} times overflows",
                    s.len(),
                    n
                )));
            }
            Ok(Scalar::Str(s.repeat(times)))
        }
        (Scalar::Str(_), _) | (_, Scalar::Str(_)) => Err(unsupported()),
        _ => {
            let divides = matches!(op, ArithOp::TrueDiv | ArithOp::FloorDiv | ArithOp::Mod);
            if divides && b.as_f64() == Some(0.0) {
                return Err(TabulaError::ValueError("division by zero".to_string()));
            }
            match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) if op != ArithOp::TrueDiv => int_op(x, y, op).map(Scalar::Int),
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => Ok(Scalar::Float(float_op(x, y, op))),
                    _ => Err(unsupported()),
                },
            }
        }
    }
}

//==================================================================================
// 4. Floating-Point Event Tracking
//==================================================================================

#[derive(Debug, Default)]
struct FpEvents {
    divide: bool,
    over: bool,
    under: bool,
    invalid: bool,
}

impl FpEvents {
    fn observe(&mut self, a: f64, b: f64, r: f64, op: ArithOp) {
        if a.is_nan() || b.is_nan() {
            return;
        }
        let divides = matches!(op, ArithOp::TrueDiv | ArithOp::FloorDiv);
        if divides && b == 0.0 {
            if a == 0.0 {
                self.invalid = true;
            } else {
                self.divide = true;
            }
        } else if op == ArithOp::Mod && b == 0.0 {
            self.invalid = true;
        } else if r.is_nan() {
            self.invalid = true;
        } else if r.is_infinite() && a.is_finite() && b.is_finite() {
            self.over = true;
        } else if r == 0.0 && a != 0.0 && a.is_finite() && b.is_finite() {
            if (op == ArithOp::Mul && b != 0.0) || op == ArithOp::TrueDiv {
                self.under = true;
            }
        }
    }

    fn report(&self, op: ArithOp) -> Result<()> {
        let name = op.name();
        if self.divide {
            errstate::report(FpErrorKind::Divide, name)?;
        }
        if self.over {
            errstate::report(FpErrorKind::Overflow, name)?;
        }
        if self.under {
            errstate::report(FpErrorKind::Underflow, name)?;
        }
        if self.invalid {
            errstate::report(FpErrorKind::Invalid, name)?;
        }
        Ok(())
    }
}
