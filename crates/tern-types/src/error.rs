use thiserror::Error;

/// Errors produced by value conversions and host configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("cannot serialize a cyclic value (revisited {0})")]
    Cyclic(String),

    #[error("value of type {0} cannot be serialized")]
    Unserializable(&'static str),

    #[error("{0} value is mutably borrowed elsewhere")]
    Unreadable(&'static str),

    #[error("invalid excluded-key pattern: {0}")]
    InvalidPattern(String),
}
