//! Three-way merge of `defaults`, `value` and `old`.
//!
//! `value` wins, `defaults` fills absent data, and `old` is returned by
//! reference whenever it is semantically equal to what the merge would
//! otherwise produce. Inputs are never mutated.

use indexmap::IndexSet;
use tern_compare::{has_cycles_with, Comparer};
use tern_types::{Host, Kind, ObjectRef, StandardHost, Value};
use tracing::{trace, warn};

use crate::error::{MergeError, MergeFault, MergeResult};
use crate::options::MergeOptions;

/// Merge engine bound to a host.
pub struct Merger<'h> {
    comparer: Comparer<'h>,
}

impl<'h> Merger<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            comparer: Comparer::new(host),
        }
    }

    fn host(&self) -> &'h dyn Host {
        self.comparer.host()
    }

    /// Merge `value` over `defaults`, keeping `old` where nothing changed.
    ///
    /// Any internal failure is reported as a single [`MergeError::Failed`]
    /// carrying renderings of `defaults` and `value`. Recursion depth follows
    /// the nesting depth of `value`.
    pub fn merge(
        &self,
        defaults: &Value,
        value: &Value,
        old: &Value,
        options: &MergeOptions,
    ) -> MergeResult<Value> {
        self.merge_value(defaults, value, old, options)
            .map_err(|source| MergeError::Failed {
                defaults: defaults.to_string(),
                value: value.to_string(),
                source,
            })
    }

    fn merge_value(
        &self,
        defaults: &Value,
        value: &Value,
        old: &Value,
        options: &MergeOptions,
    ) -> Result<Value, MergeFault> {
        match Kind::of(value, self.host()) {
            Kind::Element | Kind::Payload => return Ok(value.clone()),
            Kind::Nullish => return Ok(substitute(defaults, value, options)),
            _ => {}
        }
        if self.is_cyclic(value) {
            warn!(value = %value, "cyclic value copied through unmerged");
            return Ok(value.clone());
        }
        self.merge_kind(defaults, value, old, options)
    }

    /// Kind dispatch for a value that is neither nullish, opaque nor cyclic.
    fn merge_kind(
        &self,
        defaults: &Value,
        value: &Value,
        old: &Value,
        options: &MergeOptions,
    ) -> Result<Value, MergeFault> {
        let kind = Kind::of(value, self.host());
        trace!(%kind, "merge dispatch");
        let c = &self.comparer;
        let merged = match kind {
            Kind::Primitive => self.settle(kind, defaults, value, old, |a, b| {
                std::mem::discriminant(a) == std::mem::discriminant(b) && c.equals(a, b)
            }),
            Kind::Function => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_function(a, b, None) == Some(true)
            }),
            Kind::Date => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_date(a, b, None) == Some(true)
            }),
            Kind::Map => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_map(a, b, None) == Some(true)
            }),
            Kind::Set => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_set(a, b, None) == Some(true)
            }),
            Kind::ArrayBuffer => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_array_buffer(a, b, None) == Some(true)
            }),
            Kind::RegExp => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_regexp(a, b, None) == Some(true)
            }),
            Kind::RefHandle => self.settle(kind, defaults, value, old, |a, b| {
                c.equals_ref_handle(a, b, None) == Some(true)
            }),
            Kind::Array => self.merge_array(defaults, value, old, options)?,
            Kind::Object => self.merge_object(defaults, value, old, options)?,
            Kind::Other => self.fallback(defaults, value, old),
            Kind::Nullish | Kind::Element | Kind::Payload => value.clone(),
        };
        Ok(merged)
    }

    /// Leaf policy: keep `old` when it is the same kind and equal, else take
    /// `value`; when `value` is not of `kind`, fall back to `defaults`.
    fn settle(
        &self,
        kind: Kind,
        defaults: &Value,
        value: &Value,
        old: &Value,
        same: impl Fn(&Value, &Value) -> bool,
    ) -> Value {
        let is_kind = |v: &Value| Kind::of(v, self.host()) == kind;
        if is_kind(value) {
            if is_kind(old) && same(value, old) {
                old.clone()
            } else {
                value.clone()
            }
        } else if is_kind(defaults) {
            defaults.clone()
        } else {
            Value::Undefined
        }
    }

    fn merge_array(
        &self,
        defaults: &Value,
        value: &Value,
        old: &Value,
        options: &MergeOptions,
    ) -> Result<Value, MergeFault> {
        let Some(array) = value.as_array() else {
            return Ok(value.clone());
        };

        if let Some(defaults_array) = defaults.as_array() {
            let defaults_slots = defaults_array.try_borrow()?;
            if !defaults_slots.is_empty() {
                let slots = array.try_borrow()?;
                let old_slots = old.as_array().map(|a| a.try_borrow()).transpose()?;

                let len = slots.len().max(defaults_slots.len());
                let combined: Vec<Value> = (0..len)
                    .filter_map(|idx| match slots.get(idx) {
                        Some(Some(item)) => Some(item.clone()),
                        _ if options.deep_merge_arrays => {
                            defaults_slots.get(idx).cloned().flatten()
                        }
                        _ => None,
                    })
                    .collect();

                let mut merged = Vec::with_capacity(combined.len());
                for (idx, item) in combined.iter().enumerate() {
                    let default = defaults_slots.get(idx).cloned().flatten().unwrap_or_default();
                    if item.is_nullish() {
                        merged.push(default);
                        continue;
                    }
                    let previous = old_slots
                        .as_ref()
                        .and_then(|s| s.get(idx).cloned().flatten())
                        .unwrap_or_default();
                    merged.push(self.merge_value(&default, item, &previous, options)?);
                }
                return Ok(Value::array(merged));
            }
        }

        if old.as_array().is_some() && self.comparer.equals_arrays(value, old, None) == Some(true) {
            return Ok(old.clone());
        }
        Ok(value.clone())
    }

    fn merge_object(
        &self,
        defaults: &Value,
        value: &Value,
        old: &Value,
        options: &MergeOptions,
    ) -> Result<Value, MergeFault> {
        let Some(object) = value.as_object() else {
            return Ok(value.clone());
        };
        let data = object.try_borrow()?;
        let defaults_data = defaults.as_object().map(|o| o.try_borrow()).transpose()?;
        let defaults_slots = defaults.as_array().map(|a| a.try_borrow()).transpose()?;
        let old_data = old.as_object().map(|o| o.try_borrow()).transpose()?;
        let old_slots = old.as_array().map(|a| a.try_borrow()).transpose()?;

        let mut keys = IndexSet::new();
        if options.deep_merge_objects {
            if let Some(d) = &defaults_data {
                keys.extend(d.keys().map(str::to_string));
            }
            if let Some(slots) = &defaults_slots {
                let present = slots.iter().enumerate().filter(|(_, slot)| slot.is_some());
                keys.extend(present.map(|(idx, _)| idx.to_string()));
            }
        }
        keys.extend(data.keys().map(str::to_string));
        if keys.is_empty() {
            return Ok(value.clone());
        }

        let filter = self.host().excluded_keys();
        let merged = ObjectRef::new(data.class());
        for key in keys.iter().filter(|k| !filter.is_excluded(k)) {
            let current = data.get(key).cloned().unwrap_or_default();
            let default = match (&defaults_data, &defaults_slots) {
                (Some(d), _) => d.get(key).cloned(),
                (None, Some(slots)) => slot_at(slots, key),
                (None, None) => None,
            }
            .unwrap_or_default();
            let previous = match (&old_data, &old_slots) {
                (Some(o), _) => o.get(key).cloned(),
                (None, Some(slots)) => slot_at(slots, key),
                (None, None) => None,
            }
            .unwrap_or_default();

            let entry = match Kind::of(&current, self.host()) {
                Kind::Element | Kind::Payload => current,
                Kind::Nullish => substitute(&default, &current, options),
                _ if self.is_cyclic(&current) => {
                    warn!(key = %key, value = %current, "cyclic value copied through unmerged");
                    current
                }
                _ => self.merge_kind(&default, &current, &previous, options)?,
            };
            merged.borrow_mut().insert(key.clone(), entry);
        }
        Ok(Value::Object(merged))
    }

    /// Values of unrecognised kinds.
    fn fallback(&self, defaults: &Value, value: &Value, old: &Value) -> Value {
        if !self.comparer.equals(value, old) {
            return value.clone();
        }
        if !old.is_nullish() {
            return old.clone();
        }
        if value.as_str() == Some("") || value.truthy() {
            value.clone()
        } else {
            defaults.clone()
        }
    }

    fn is_cyclic(&self, value: &Value) -> bool {
        has_cycles_with(value, &mut Vec::new(), self.host())
    }
}

/// Array slot addressed by a canonical index key (`"1"`, not `"01"`).
fn slot_at(slots: &[Option<Value>], key: &str) -> Option<Value> {
    let idx: usize = key.parse().ok()?;
    if idx.to_string() != key {
        return None;
    }
    slots.get(idx).cloned().flatten()
}

/// `undefined`/`null` policy.
fn substitute(defaults: &Value, value: &Value, options: &MergeOptions) -> Value {
    let use_default = if value.is_undefined() {
        options.get_default_for_undefined
    } else {
        options.get_default_for_null
    };
    if use_default {
        defaults.clone()
    } else {
        value.clone()
    }
}

/// Merge with the standard host.
pub fn merge(
    defaults: &Value,
    value: &Value,
    old: &Value,
    options: &MergeOptions,
) -> MergeResult<Value> {
    let host = StandardHost::new();
    Merger::new(&host).merge(defaults, value, old, options)
}
