//! The dynamic value universe compared and merged by tern.
//!
//! [`Value`] is a closed enum. Primitives are stored inline and compared by
//! value; every other variant is a reference type backed by an [`Rc`], so two
//! clones of the same value share one allocation and [`Value::ptr_eq`] can
//! tell a preserved reference apart from an equal copy.
//!
//! Composite containers (objects, arrays, maps, sets, buffers) sit behind a
//! [`RefCell`] so callers can build cyclic graphs. Reads go through
//! `try_borrow`, which fails with [`TypeError::Unreadable`] instead of
//! panicking while a caller holds a mutable borrow.

use std::cell::{Ref, RefCell, RefMut};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};

use crate::error::TypeError;

/// Class name given to plain keyed records.
pub const PLAIN_CLASS: &str = "Object";

/// Class name reported for arrays when compared against records.
pub const ARRAY_CLASS: &str = "Array";

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent data.
    #[default]
    Undefined,
    /// Explicitly empty data.
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(Rc<str>),
    /// A unique token; never equal to another symbol with the same description.
    Symbol(Symbol),
    Function(Function),
    Date(Date),
    RegExp(RegExp),
    ArrayBuffer(ArrayBuffer),
    /// An opaque binary payload (file or blob contents).
    Blob(Blob),
    Map(MapRef),
    Set(SetRef),
    Array(ArrayRef),
    Object(ObjectRef),
}

impl Value {
    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an empty plain object.
    pub fn object() -> Self {
        Value::Object(ObjectRef::new(PLAIN_CLASS))
    }

    /// Create a plain object from key/value pairs, keeping their order.
    pub fn object_from<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::object_of_class(PLAIN_CLASS, entries)
    }

    /// Create an object whose constructor is `class`.
    pub fn object_of_class<K, I>(class: &str, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = ObjectRef::new(class);
        {
            let mut data = object.borrow_mut();
            for (key, value) in entries {
                data.insert(key, value);
            }
        }
        Value::Object(object)
    }

    /// Create a dense array.
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(ArrayRef::new(items.into_iter().map(Some).collect()))
    }

    /// Create an array that may contain holes (`None`).
    pub fn sparse_array(slots: Vec<Option<Value>>) -> Self {
        Value::Array(ArrayRef::new(slots))
    }

    /// Create a map from key/value pairs. Later duplicates overwrite earlier ones.
    pub fn map<I: IntoIterator<Item = (Value, Value)>>(entries: I) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (MapKey::new(k), v))
            .collect::<IndexMap<_, _>>();
        Value::Map(MapRef(Rc::new(RefCell::new(map))))
    }

    /// Create a set from members. Duplicates (by SameValueZero) collapse.
    pub fn set<I: IntoIterator<Item = Value>>(members: I) -> Self {
        let set = members.into_iter().map(MapKey::new).collect::<IndexSet<_>>();
        Value::Set(SetRef(Rc::new(RefCell::new(set))))
    }

    /// Create a date from epoch milliseconds.
    pub fn date_millis(millis: i64) -> Self {
        Value::Date(Date::from_millis(millis))
    }

    /// Create a regular expression value from its source and flags.
    pub fn regexp(source: &str, flags: &str) -> Self {
        Value::RegExp(RegExp::new(source, flags))
    }

    /// Create a named function handle.
    pub fn function(name: &str) -> Self {
        Value::Function(Function::new(name))
    }

    /// Create a fresh symbol.
    pub fn symbol(description: &str) -> Self {
        Value::Symbol(Symbol::new(description))
    }

    /// Create an array buffer holding `bytes`.
    pub fn array_buffer(bytes: Vec<u8>) -> Self {
        Value::ArrayBuffer(ArrayBuffer::new(bytes))
    }

    /// Create an opaque binary payload.
    pub fn blob(media_type: &str, bytes: impl Into<Bytes>) -> Self {
        Value::Blob(Blob::new(media_type, bytes))
    }

    // ---------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------

    /// Returns `true` for `Undefined` and `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for values that can hold other values.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Map(_) | Value::Set(_) | Value::Array(_) | Value::Object(_)
        )
    }

    /// Name of the value's runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Date(_) => "Date",
            Value::RegExp(_) => "RegExp",
            Value::ArrayBuffer(_) => "ArrayBuffer",
            Value::Blob(_) => "Blob",
            Value::Map(_) => "Map",
            Value::Set(_) => "Set",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    /// Truthiness: `false`, `0`, `NaN`, `""`, `0n`, `null` and `undefined` are falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(i) => *i != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Stable address of a reference value; `None` for primitives.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Symbol(v) => Some(addr(&v.0)),
            Value::Function(v) => Some(addr(&v.0)),
            Value::Date(v) => Some(addr(&v.0)),
            Value::RegExp(v) => Some(addr(&v.0)),
            Value::ArrayBuffer(v) => Some(addr(&v.0)),
            Value::Blob(v) => Some(addr(&v.0)),
            Value::Map(v) => Some(addr(&v.0)),
            Value::Set(v) => Some(addr(&v.0)),
            Value::Array(v) => Some(addr(&v.0)),
            Value::Object(v) => Some(addr(&v.0)),
            _ => None,
        }
    }

    /// Reference identity. Always `false` when either side is a primitive.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// SameValueZero: primitives by value (`NaN` equals `NaN`, `+0` equals
    /// `-0`), reference values by identity.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => self.ptr_eq(other),
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Own property `key` of an object, or `None` when absent, not an
    /// object, or unreadable.
    pub fn get(&self, key: &str) -> Option<Value> {
        let object = self.as_object()?;
        let data = object.try_borrow().ok()?;
        data.get(key).cloned()
    }

    /// Element at `index` of an array; `None` for holes and out-of-range indices.
    pub fn at(&self, index: usize) -> Option<Value> {
        let array = self.as_array()?;
        let slots = array.try_borrow().ok()?;
        slots.get(index).cloned().flatten()
    }

    /// Set own property `key` on an object. Returns `false` if `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self {
            Value::Object(object) => {
                object.borrow_mut().insert(key, value.into());
                true
            }
            _ => false,
        }
    }

    /// Append to an array. Returns `false` if `self` is not an array.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match self {
            Value::Array(array) => {
                array.borrow_mut().push(Some(value.into()));
                true
            }
            _ => false,
        }
    }
}

fn addr<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

// ---------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(Date::from_datetime(dt))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

// ---------------------------------------------------------------
// Leaf reference types
// ---------------------------------------------------------------

/// A unique token.
#[derive(Clone)]
pub struct Symbol(Rc<String>);

impl Symbol {
    pub fn new(description: &str) -> Self {
        Self(Rc::new(description.to_string()))
    }

    pub fn description(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A callable handle. Functions are only ever equal to themselves.
#[derive(Clone)]
pub struct Function(Rc<String>);

impl Function {
    pub fn new(name: &str) -> Self {
        Self(Rc::new(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A point in time with millisecond precision. `None` is an invalid date.
#[derive(Clone)]
pub struct Date(Rc<Option<i64>>);

impl Date {
    pub fn from_millis(millis: i64) -> Self {
        Self(Rc::new(Some(millis)))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_millis(dt.timestamp_millis())
    }

    /// A date whose time value is not a number.
    pub fn invalid() -> Self {
        Self(Rc::new(None))
    }

    /// Milliseconds since the UNIX epoch, or `None` for an invalid date.
    pub fn epoch_millis(&self) -> Option<i64> {
        *self.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.epoch_millis().and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn ptr_eq(&self, other: &Date) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

struct RegExpData {
    source: String,
    flags: String,
}

/// A regular expression, identified by its source pattern and flags.
///
/// Flags are normalized to canonical order, so `"gi"` and `"ig"` read back
/// as the same flag string.
#[derive(Clone)]
pub struct RegExp(Rc<RegExpData>);

impl RegExp {
    const FLAG_ORDER: &'static str = "dgimsuvy";

    pub fn new(source: &str, flags: &str) -> Self {
        let mut normalized: String = Self::FLAG_ORDER
            .chars()
            .filter(|c| flags.contains(*c))
            .collect();
        normalized.extend(flags.chars().filter(|c| !Self::FLAG_ORDER.contains(*c)));
        Self(Rc::new(RegExpData {
            source: source.to_string(),
            flags: normalized,
        }))
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }

    pub fn flags(&self) -> &str {
        &self.0.flags
    }

    pub fn ptr_eq(&self, other: &RegExp) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A mutable, fixed-purpose byte buffer.
#[derive(Clone)]
pub struct ArrayBuffer(Rc<RefCell<Vec<u8>>>);

impl ArrayBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Rc::new(RefCell::new(bytes)))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Vec<u8>>, TypeError> {
        self.0
            .try_borrow()
            .map_err(|_| TypeError::Unreadable("ArrayBuffer"))
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<u8>> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ArrayBuffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

struct BlobData {
    media_type: String,
    bytes: Bytes,
}

/// An immutable binary payload with a media type.
#[derive(Clone)]
pub struct Blob(Rc<BlobData>);

impl Blob {
    pub fn new(media_type: &str, bytes: impl Into<Bytes>) -> Self {
        Self(Rc::new(BlobData {
            media_type: media_type.to_string(),
            bytes: bytes.into(),
        }))
    }

    pub fn media_type(&self) -> &str {
        &self.0.media_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0.bytes
    }

    pub fn size(&self) -> usize {
        self.0.bytes.len()
    }

    pub fn ptr_eq(&self, other: &Blob) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// ---------------------------------------------------------------
// Keyed collections
// ---------------------------------------------------------------

/// A map key or set member, hashed and compared by SameValueZero.
#[derive(Clone)]
pub struct MapKey(Value);

impl MapKey {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_value_zero(&other.0)
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => 0u8.hash(state),
            Value::Null => 1u8.hash(state),
            Value::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                3u8.hash(state);
                let canonical = if *n == 0.0 {
                    0.0f64
                } else if n.is_nan() {
                    f64::NAN
                } else {
                    *n
                };
                canonical.to_bits().hash(state);
            }
            Value::BigInt(i) => {
                4u8.hash(state);
                i.hash(state);
            }
            Value::String(s) => {
                5u8.hash(state);
                s.hash(state);
            }
            other => {
                6u8.hash(state);
                other.identity().hash(state);
            }
        }
    }
}

/// Shared, insertion-ordered map.
#[derive(Clone)]
pub struct MapRef(Rc<RefCell<IndexMap<MapKey, Value>>>);

impl MapRef {
    pub fn try_borrow(&self) -> Result<Ref<'_, IndexMap<MapKey, Value>>, TypeError> {
        self.0.try_borrow().map_err(|_| TypeError::Unreadable("Map"))
    }

    pub fn borrow_mut(&self) -> RefMut<'_, IndexMap<MapKey, Value>> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shared, insertion-ordered set.
#[derive(Clone)]
pub struct SetRef(Rc<RefCell<IndexSet<MapKey>>>);

impl SetRef {
    pub fn try_borrow(&self) -> Result<Ref<'_, IndexSet<MapKey>>, TypeError> {
        self.0.try_borrow().map_err(|_| TypeError::Unreadable("Set"))
    }

    pub fn borrow_mut(&self) -> RefMut<'_, IndexSet<MapKey>> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &SetRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// ---------------------------------------------------------------
// Arrays and records
// ---------------------------------------------------------------

/// Shared array. `None` slots are holes.
#[derive(Clone)]
pub struct ArrayRef(Rc<RefCell<Vec<Option<Value>>>>);

impl ArrayRef {
    pub fn new(slots: Vec<Option<Value>>) -> Self {
        Self(Rc::new(RefCell::new(slots)))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Vec<Option<Value>>>, TypeError> {
        self.0.try_borrow().map_err(|_| TypeError::Unreadable("Array"))
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Option<Value>>> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Contents of a keyed record.
pub struct ObjectData {
    class: Rc<str>,
    props: IndexMap<String, Value>,
    locked: bool,
}

impl ObjectData {
    /// Constructor name. Records only compare equal to records of the same class.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn is_plain(&self) -> bool {
        &*self.class == PLAIN_CLASS
    }

    /// Whether the record's slots are non-configurable.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.props.insert(key.into(), value)
    }

    /// Remove own property `key`. Locked records keep their slots.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if self.locked {
            return None;
        }
        self.props.shift_remove(key)
    }
}

/// Shared keyed record.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

impl ObjectRef {
    /// Create an empty record of the given class.
    pub fn new(class: &str) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            class: Rc::from(class),
            props: IndexMap::new(),
            locked: false,
        })))
    }

    /// Create a record whose slots cannot be removed.
    pub fn locked(class: &str, props: IndexMap<String, Value>) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            class: Rc::from(class),
            props,
            locked: true,
        })))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, ObjectData>, TypeError> {
        self.0.try_borrow().map_err(|_| TypeError::Unreadable("Object"))
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
