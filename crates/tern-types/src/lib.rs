//! Value model for tern.
//!
//! Defines the dynamic value universe that the equality and merge engines
//! operate on, the kind classification both engines dispatch on, and the
//! host predicates that let an embedding environment mark framework nodes,
//! reference cells and binary payloads.
//!
//! # Key Types
//!
//! - [`Value`] -- Dynamically typed value; reference variants share identity through `Rc`
//! - [`ObjectRef`] / [`ArrayRef`] / [`MapRef`] / [`SetRef`] -- Shared, possibly cyclic containers
//! - [`Kind`] -- Closed classification used by comparison and merge dispatch
//! - [`Host`] / [`StandardHost`] -- Injected element, ref-handle and payload predicates
//! - [`KeyFilter`] -- Framework bookkeeping keys skipped by every traversal
//! - [`TypeError`] -- Errors raised by the value model

pub mod error;
pub mod host;
pub mod json;
pub mod kind;
pub mod render;
pub mod value;

pub use error::TypeError;
pub use host::{
    Host, KeyFilter, KeyFilterConfig, StandardHost, DEFAULT_EXCLUDED_KEYS,
    DEFAULT_EXCLUDED_PATTERN, ELEMENT_TAG, ELEMENT_TAG_KEY, REF_SLOT,
};
pub use kind::Kind;
pub use value::{
    ArrayBuffer, ArrayRef, Blob, Date, Function, MapKey, MapRef, ObjectData, ObjectRef, RegExp,
    SetRef, Symbol, Value, ARRAY_CLASS, PLAIN_CLASS,
};
