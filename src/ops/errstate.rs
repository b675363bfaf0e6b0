//! Scoped floating-point error policy.
//!
//! Every element-wise kernel reports the floating-point events it observed
//! (division by zero, overflow, underflow, invalid results) through `report`.
//! What happens next depends on the active `ErrState`: the event is ignored,
//! logged as a warning, or turned into a `FloatingPointError`.
//!
//! The active policy is thread-local. `errstate` swaps in a new policy and
//! returns an `ErrStateGuard` that restores the previous one when it is
//! dropped, on normal exit, early `?` return or unwinding alike.

use crate::error::{Result, TabulaError};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

/// What to do when a floating-point event is observed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrAction {
    Ignore,
    #[default]
    Warn,
    Raise,
}

/// The categories of floating-point events a kernel can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpErrorKind {
    Divide,
    Overflow,
    Underflow,
    Invalid,
}

impl fmt::Display for FpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FpErrorKind::Divide => "divide by zero",
            FpErrorKind::Overflow => "overflow",
            FpErrorKind::Underflow => "underflow",
            FpErrorKind::Invalid => "invalid value",
        };
        write!(f, "{}", text)
    }
}

/// A complete policy: one action per event category.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ErrState {
    pub divide: ErrAction,
    pub over: ErrAction,
    pub under: ErrAction,
    pub invalid: ErrAction,
}

impl Default for ErrState {
    /// Warn on everything except underflow, which is ignored.
    fn default() -> Self {
        Self {
            divide: ErrAction::Warn,
            over: ErrAction::Warn,
            under: ErrAction::Ignore,
            invalid: ErrAction::Warn,
        }
    }
}

impl ErrState {
    /// The same action for every category.
    pub fn all(action: ErrAction) -> Self {
        Self {
            divide: action,
            over: action,
            under: action,
            invalid: action,
        }
    }

    pub fn action_for(&self, kind: FpErrorKind) -> ErrAction {
        match kind {
            FpErrorKind::Divide => self.divide,
            FpErrorKind::Overflow => self.over,
            FpErrorKind::Underflow => self.under,
            FpErrorKind::Invalid => self.invalid,
        }
    }
}

thread_local! {
    static CURRENT: Cell<ErrState> = Cell::new(ErrState::default());
}

/// The policy active on this thread.
pub fn geterr() -> ErrState {
    CURRENT.with(Cell::get)
}

/// Replaces the policy active on this thread and returns the previous one.
pub fn seterr(state: ErrState) -> ErrState {
    CURRENT.with(|current| current.replace(state))
}

/// Restores the previous policy on drop.
///
/// The guard is tied to the thread that created it.
#[must_use = "the policy is restored as soon as the guard is dropped"]
pub struct ErrStateGuard {
    previous: ErrState,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ErrStateGuard {
    fn drop(&mut self) {
        seterr(self.previous);
    }
}

/// Activates `state` until the returned guard is dropped.
pub fn errstate(state: ErrState) -> ErrStateGuard {
    ErrStateGuard {
        previous: seterr(state),
        _not_send: PhantomData,
    }
}

/// Reports one floating-point event observed while evaluating `op`.
pub fn report(kind: FpErrorKind, op: &str) -> Result<()> {
    match geterr().action_for(kind) {
        ErrAction::Ignore => Ok(()),
        ErrAction::Warn => {
            log::warn!("RuntimeWarning: {} encountered in {}", kind, op);
            Ok(())
        }
        ErrAction::Raise => Err(TabulaError::FloatingPointError(format!(
            "{} encountered in {}",
            kind, op
        ))),
    }
}
