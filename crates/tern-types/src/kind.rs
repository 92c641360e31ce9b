//! Kind classification shared by the equality and merge engines.

use std::fmt;

use crate::host::Host;
use crate::value::Value;

/// The closed set of kinds both engines dispatch on.
///
/// Host predicates take precedence over structural classification: a
/// record recognised as an element is an [`Kind::Element`], never an
/// [`Kind::Object`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Nullish,
    Element,
    RefHandle,
    Payload,
    Function,
    Date,
    Map,
    Set,
    ArrayBuffer,
    RegExp,
    Array,
    Object,
    Primitive,
    /// Anything else (symbols, unrecognised payloads).
    Other,
}

impl Kind {
    /// Classify a single value.
    pub fn of(value: &Value, host: &dyn Host) -> Self {
        match value {
            Value::Undefined | Value::Null => Kind::Nullish,
            _ if host.is_element(value) => Kind::Element,
            _ if host.is_ref_handle(value) => Kind::RefHandle,
            _ if host.is_opaque_payload(value) => Kind::Payload,
            Value::Bool(_) | Value::Number(_) | Value::BigInt(_) | Value::String(_) => {
                Kind::Primitive
            }
            Value::Function(_) => Kind::Function,
            Value::Date(_) => Kind::Date,
            Value::Map(_) => Kind::Map,
            Value::Set(_) => Kind::Set,
            Value::ArrayBuffer(_) => Kind::ArrayBuffer,
            Value::RegExp(_) => Kind::RegExp,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Symbol(_) | Value::Blob(_) => Kind::Other,
        }
    }

    /// Classify both operands of a comparison.
    pub fn pair(a: &Value, b: &Value, host: &dyn Host) -> (Self, Self) {
        (Self::of(a, host), Self::of(b, host))
    }

    /// Kinds whose values are keyed or indexed records (`typeof` object
    /// with enumerable structure).
    pub fn is_record_like(self) -> bool {
        matches!(self, Kind::Array | Kind::Object | Kind::RefHandle | Kind::Element)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Nullish => "nullish",
            Kind::Element => "element",
            Kind::RefHandle => "ref-handle",
            Kind::Payload => "payload",
            Kind::Function => "function",
            Kind::Date => "date",
            Kind::Map => "map",
            Kind::Set => "set",
            Kind::ArrayBuffer => "array-buffer",
            Kind::RegExp => "regexp",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Primitive => "primitive",
            Kind::Other => "other",
        };
        f.write_str(name)
    }
}
