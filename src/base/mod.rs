//! This module defines the base layer shared by every container: the
//! selection protocol, element-wise operation dispatch and the attribute
//! freeze.
//!
//! The two mixins are traits with required hooks. A concrete container
//! implements the hooks (`obj`/`selection`/`gotitem`/`aggregate` or
//! `values`/`name`/`construct_result`) and gets the rest of the protocol as
//! provided methods.

pub mod frozen;
pub mod index_ops;
pub mod selection;

pub use frozen::AttributeStore;
pub use index_ops::{FactorizedUniques, IndexOpsMixin, Positions, SearchValue};
pub use selection::{AggFunc, AggResult, Selection, SelectionMixin};
