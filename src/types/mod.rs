//! This module defines the core, strongly-typed data representations used
//! throughout the tabula base layer.
//!
//! It currently includes the canonical `DType` enum which replaces
//! fragile string-based dtype names with a safe, serializable, and
//! Arrow-compatible enum.

pub mod dtype;

// Re-export the main type(s) for easier access.
pub use dtype::DType;
