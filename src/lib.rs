//! This file is the root of the `tabula` Rust crate.
//!
//! `tabula` is the base object layer for Arrow-backed tabular containers. It
//! provides the selection-resolution protocol (`SelectionMixin`), element-wise
//! operation dispatch (`IndexOpsMixin`), the attribute freeze, and the
//! concrete `Series`, `Index`, `DataFrame` and `ColumnSelector` types that
//! exercise them.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod algorithms;
pub mod base;
pub mod config;
pub mod error;
pub mod frame;
pub mod ops;
pub mod scalar;
pub mod types;
pub mod values;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use base::{AggFunc, AggResult, AttributeStore, IndexOpsMixin, Selection, SelectionMixin};
pub use config::TabulaConfig;
pub use error::{Result, TabulaError};
pub use frame::{ColumnSelector, DataFrame, FrameObject, Index, Series};
pub use observability::enable_verbose_logging;
pub use ops::{errstate, ArithOp, ErrAction, ErrState, Operand};
pub use scalar::Scalar;
pub use types::DType;
pub use values::ArrayValues;
