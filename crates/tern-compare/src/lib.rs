//! Cycle detection and structural deep equality for tern values.
//!
//! Equality is total: it never fails and always terminates. Cyclic operands
//! are treated as opaque leaves that compare equal, and containers the
//! caller holds mutably borrowed are compared by reference.
//!
//! # Key Types
//!
//! - [`Comparer`] -- Equality engine bound to a [`tern_types::Host`], with one public comparator per kind
//! - [`Override`] -- Caller-supplied verdict consulted before dispatch
//! - [`has_cycles`] / [`has_cycles_with`] -- Circular-reference detection
//! - [`strip_functions_and_elements`] -- Data-only projection of a value

pub mod comparators;
pub mod cycle;
pub mod equals;
pub mod strip;

pub use cycle::{has_cycles, has_cycles_with};
pub use equals::{equals, equals_with, Comparer, Override};
pub use strip::strip_functions_and_elements;
