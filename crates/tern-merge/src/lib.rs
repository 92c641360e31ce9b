//! Three-way deep merge for tern values.
//!
//! Reconciles a `defaults` baseline, an incoming `value`, and a previously
//! accepted `old` value into one result. The result prefers `value`, fills
//! absent data from `defaults`, and hands back `old` by reference wherever
//! nothing semantically changed so identity-based change detection stays
//! quiet.
//!
//! # Key Types
//!
//! - [`Merger`] -- Merge engine bound to a [`tern_types::Host`]
//! - [`MergeOptions`] -- Array/object deep-merge switches and `undefined`/`null` policy
//! - [`MergeError`] / [`MergeFault`] -- The single wrapped merge failure and its cause

pub mod error;
pub mod merge;
pub mod options;

pub use error::{MergeError, MergeFault, MergeResult};
pub use merge::{merge, Merger};
pub use options::MergeOptions;
