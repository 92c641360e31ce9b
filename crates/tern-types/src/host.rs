//! Host-embedding predicates and the shared excluded-key filter.
//!
//! The engines never hard-code what a UI-framework node or a reference cell
//! looks like. They ask a [`Host`], which also supplies the one
//! [`KeyFilter`] every traversal must honour.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::value::{ObjectRef, Symbol, Value, PLAIN_CLASS};

/// Framework bookkeeping keys skipped by every traversal.
pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &[
    "_owner",
    "_self",
    "__NEXT_PAGE__",
    "_reactRootContainer",
    "__N_SSG",
    "__N_SSP",
    "__N_RSC",
    "__source",
];

/// Pattern of framework-internal keys skipped by every traversal.
pub const DEFAULT_EXCLUDED_PATTERN: &str = r"^__(reactFiber|reactProps|reactEvents)\$";

/// Slot holding the element marker symbol.
pub const ELEMENT_TAG_KEY: &str = "$$typeof";

/// Description of the marker symbol that identifies elements.
pub const ELEMENT_TAG: &str = "tern.element";

/// The single slot of a reference handle.
pub const REF_SLOT: &str = "current";

thread_local! {
    static ELEMENT_SYMBOL: Symbol = Symbol::new(ELEMENT_TAG);
}

/// Serializable form of a [`KeyFilter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFilterConfig {
    /// Exact key names to skip.
    pub names: Vec<String>,
    /// Regular expression of keys to skip.
    pub pattern: String,
}

impl Default for KeyFilterConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_EXCLUDED_KEYS.iter().map(|k| k.to_string()).collect(),
            pattern: DEFAULT_EXCLUDED_PATTERN.to_string(),
        }
    }
}

/// Key names and a key pattern excluded from recursive traversal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "KeyFilterConfig", into = "KeyFilterConfig")]
pub struct KeyFilter {
    names: Vec<String>,
    pattern: Regex,
}

impl KeyFilter {
    /// Build a filter, compiling `pattern`.
    pub fn new(names: Vec<String>, pattern: &str) -> Result<Self, TypeError> {
        let pattern = Regex::new(pattern).map_err(|e| TypeError::InvalidPattern(e.to_string()))?;
        Ok(Self { names, pattern })
    }

    /// Returns `true` if `key` must be skipped.
    pub fn is_excluded(&self, key: &str) -> bool {
        self.names.iter().any(|n| n == key) || self.pattern.is_match(key)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::try_from(KeyFilterConfig::default()).expect("default excluded-key pattern compiles")
    }
}

impl TryFrom<KeyFilterConfig> for KeyFilter {
    type Error = TypeError;

    fn try_from(config: KeyFilterConfig) -> Result<Self, Self::Error> {
        Self::new(config.names, &config.pattern)
    }
}

impl From<KeyFilter> for KeyFilterConfig {
    fn from(filter: KeyFilter) -> Self {
        Self {
            pattern: filter.pattern.as_str().to_string(),
            names: filter.names,
        }
    }
}

/// Capabilities injected by the embedding environment.
pub trait Host {
    /// An opaque framework node that is never traversed or merged.
    fn is_element(&self, value: &Value) -> bool;

    /// A single-slot reference cell. It may point back at its owner and is
    /// compared through its referenced content.
    fn is_ref_handle(&self, value: &Value) -> bool;

    /// An atomic binary payload copied through unmerged.
    fn is_opaque_payload(&self, value: &Value) -> bool;

    /// Keys skipped by cycle detection, equality and merge alike.
    fn excluded_keys(&self) -> &KeyFilter;
}

/// The default host.
///
/// - elements carry a `tern.element` symbol in their `$$typeof` slot
///   (see [`Value::element`]);
/// - reference handles are locked records with a single `current` slot
///   (see [`Value::ref_handle`]);
/// - every [`Value::Blob`] is an opaque payload.
#[derive(Clone, Debug, Default)]
pub struct StandardHost {
    keys: KeyFilter,
}

impl StandardHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom excluded-key filter.
    pub fn with_key_filter(keys: KeyFilter) -> Self {
        Self { keys }
    }
}

impl Host for StandardHost {
    fn is_element(&self, value: &Value) -> bool {
        matches!(
            value.get(ELEMENT_TAG_KEY),
            Some(Value::Symbol(tag)) if tag.description() == ELEMENT_TAG
        )
    }

    fn is_ref_handle(&self, value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };
        let Ok(data) = object.try_borrow() else {
            return false;
        };
        data.is_locked() && data.len() == 1 && data.contains_key(REF_SLOT)
    }

    fn is_opaque_payload(&self, value: &Value) -> bool {
        matches!(value, Value::Blob(_))
    }

    fn excluded_keys(&self) -> &KeyFilter {
        &self.keys
    }
}

impl Value {
    /// Create an element recognised by [`StandardHost`].
    ///
    /// `element_type` is a tag name or a component function; `props` is
    /// normally a plain object. All elements built on one thread share the
    /// same marker symbol.
    pub fn element(element_type: Value, props: Value) -> Self {
        let tag = ELEMENT_SYMBOL.with(|symbol| Value::Symbol(symbol.clone()));
        Value::object_from([
            (ELEMENT_TAG_KEY, tag),
            ("type", element_type),
            ("key", Value::Null),
            ("props", props),
        ])
    }

    /// Create a reference handle recognised by [`StandardHost`].
    pub fn ref_handle(current: Value) -> Self {
        let mut props = IndexMap::new();
        props.insert(REF_SLOT.to_string(), current);
        Value::Object(ObjectRef::locked(PLAIN_CLASS, props))
    }
}
