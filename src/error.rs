// In: src/error.rs

//! This module defines the single, unified error type for the entire tabula library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! The variants mirror the error taxonomy of the base object layer: selection
//! failures (`KeyError`, `IndexError`), attribute freezing (`AttributeError`),
//! caller misuse (`ValueError`, `TypeError`) and numeric policy violations
//! (`FloatingPointError`). All of them propagate straight to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabulaError {
    // =========================================================================
    // === Selection Errors
    // =========================================================================
    /// A requested label is absent from the collection's label space.
    #[error("KeyError: {0}")]
    KeyError(String),

    /// A selection was attempted on an object that already carries one.
    #[error("IndexError: {0}")]
    IndexError(String),

    // =========================================================================
    // === Attribute Freezing
    // =========================================================================
    #[error("AttributeError: {0}")]
    AttributeError(String),

    // =========================================================================
    // === Misuse / Type Errors
    // =========================================================================
    #[error("ValueError: {0}")]
    ValueError(String),

    #[error("TypeError: {0}")]
    TypeError(String),

    /// Raised when the active numeric error policy is `Raise` for an event.
    #[error("FloatingPointError: {0}")]
    FloatingPointError(String),

    /// An operation that the concrete container does not support.
    #[error("NotImplementedError: {0}")]
    NotImplemented(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the Serde JSON library, typically while loading a config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TabulaError>;

impl TabulaError {
    /// Short kind name, matching the leading tag of the `Display` output.
    pub fn kind(&self) -> &'static str {
        match self {
            TabulaError::KeyError(_) => "KeyError",
            TabulaError::IndexError(_) => "IndexError",
            TabulaError::AttributeError(_) => "AttributeError",
            TabulaError::ValueError(_) => "ValueError",
            TabulaError::TypeError(_) => "TypeError",
            TabulaError::FloatingPointError(_) => "FloatingPointError",
            TabulaError::NotImplemented(_) => "NotImplementedError",
            TabulaError::Arrow(_) => "ArrowError",
            TabulaError::SerdeJson(_) => "SerdeJsonError",
            TabulaError::Io(_) => "IoError",
        }
    }
}
