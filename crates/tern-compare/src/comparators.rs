//! Per-kind comparators.
//!
//! Each comparator returns `None` when neither operand is of its kind,
//! `Some(false)` when exactly one is, and otherwise the verdict for the
//! pair. The override is consulted only once both operands are known to be
//! of the comparator's kind.

use tern_types::{Kind, Value, REF_SLOT};

use crate::equals::{Comparer, Override};

impl Comparer<'_> {
    /// Elements: same rendered `type`, same filtered prop keys, equal props.
    ///
    /// Elements whose props are both missing or non-record fall through
    /// (`None`) and are compared as plain records.
    pub fn equals_element(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::Element)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }

        let slot = |v: &Value, key: &str| v.get(key).unwrap_or_default();
        if slot(a, "type").to_string() != slot(b, "type").to_string() {
            return Some(false);
        }
        let (props_a, props_b) = (slot(a, "props"), slot(b, "props"));
        match (props_a.as_object(), props_b.as_object()) {
            (None, None) => None,
            (Some(_), Some(_)) => Some(self.records(&props_a, &props_b)),
            _ => Some(false),
        }
    }

    /// Reference handles compare their `current` slots.
    pub fn equals_ref_handle(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::RefHandle)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        let current_a = a.get(REF_SLOT).unwrap_or_default();
        let current_b = b.get(REF_SLOT).unwrap_or_default();
        Some(self.equals(&current_a, &current_b))
    }

    /// Opaque payloads: the same reference, or blobs with the same media
    /// type and contents.
    pub fn equals_payload(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::Payload)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        Some(match (a, b) {
            (Value::Blob(x), Value::Blob(y)) => {
                x.ptr_eq(y) || (x.media_type() == y.media_type() && x.bytes() == y.bytes())
            }
            _ => a.ptr_eq(b),
        })
    }

    /// Functions are equal only to themselves.
    pub fn equals_function(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::Function)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        Some(a.ptr_eq(b))
    }

    /// Dates are equal when they hold the same epoch millisecond. Two
    /// invalid dates are equal.
    pub fn equals_date(&self, a: &Value, b: &Value, custom: Option<Override<'_>>) -> Option<bool> {
        if !self.both(a, b, Kind::Date)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        match (a, b) {
            (Value::Date(x), Value::Date(y)) => Some(x.epoch_millis() == y.epoch_millis()),
            _ => Some(a.ptr_eq(b)),
        }
    }

    /// Maps: same size, and every key of `a` present in `b` with an equal value.
    pub fn equals_map(&self, a: &Value, b: &Value, custom: Option<Override<'_>>) -> Option<bool> {
        if !self.both(a, b, Kind::Map)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        let (Some(x), Some(y)) = (a.as_map(), b.as_map()) else {
            return Some(a.ptr_eq(b));
        };
        let (Ok(left), Ok(right)) = (x.try_borrow(), y.try_borrow()) else {
            return Some(a.ptr_eq(b));
        };
        if left.len() != right.len() {
            return Some(false);
        }
        Some(left.iter().all(|(key, value)| match right.get(key) {
            Some(other) => self.equals(value, other),
            None => false,
        }))
    }

    /// Sets: same size; primitive members by membership, reference members
    /// against the member at the same insertion position.
    pub fn equals_set(&self, a: &Value, b: &Value, custom: Option<Override<'_>>) -> Option<bool> {
        if !self.both(a, b, Kind::Set)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        let (Some(x), Some(y)) = (a.as_set(), b.as_set()) else {
            return Some(a.ptr_eq(b));
        };
        let (Ok(left), Ok(right)) = (x.try_borrow(), y.try_borrow()) else {
            return Some(a.ptr_eq(b));
        };
        if left.len() != right.len() {
            return Some(false);
        }
        Some(left.iter().enumerate().all(|(index, member)| {
            let value = member.value();
            if is_object_like(value) {
                right
                    .get_index(index)
                    .is_some_and(|other| self.equals(value, other.value()))
            } else {
                right.contains(member)
            }
        }))
    }

    /// Array buffers: same length and identical bytes.
    pub fn equals_array_buffer(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::ArrayBuffer)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        let (Value::ArrayBuffer(x), Value::ArrayBuffer(y)) = (a, b) else {
            return Some(a.ptr_eq(b));
        };
        Some(match (x.try_borrow(), y.try_borrow()) {
            (Ok(left), Ok(right)) => *left == *right,
            _ => x.ptr_eq(y),
        })
    }

    /// Regular expressions: same source and flags.
    pub fn equals_regexp(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        if !self.both(a, b, Kind::RegExp)? {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        match (a, b) {
            (Value::RegExp(x), Value::RegExp(y)) => {
                Some(x.source() == y.source() && x.flags() == y.flags())
            }
            _ => Some(a.ptr_eq(b)),
        }
    }

    /// Records and arrays.
    ///
    /// Applies when either operand is record-like. Arrays only equal arrays
    /// (see [`Comparer::equals_arrays`]); records need the same class, the
    /// same filtered key set, and equal values under each key.
    pub fn equals_object(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        let (kind_a, kind_b) = Kind::pair(a, b, self.host());
        match (kind_a.is_record_like(), kind_b.is_record_like()) {
            (false, false) => return None,
            (true, true) => {}
            _ => return Some(false),
        }
        if (kind_a == Kind::Array) != (kind_b == Kind::Array) {
            return Some(false);
        }
        if !same_class(a, b) {
            return Some(false);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        if kind_a == Kind::Array {
            return self.equals_arrays(a, b, None);
        }
        Some(self.records(a, b))
    }

    /// Arrays: same length and index-wise equal. A hole only equals a hole.
    pub fn equals_arrays(
        &self,
        a: &Value,
        b: &Value,
        custom: Option<Override<'_>>,
    ) -> Option<bool> {
        let (Some(x), Some(y)) = (a.as_array(), b.as_array()) else {
            return match (a.as_array(), b.as_array()) {
                (None, None) => None,
                _ => Some(false),
            };
        };
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return Some(verdict);
        }
        let (Ok(left), Ok(right)) = (x.try_borrow(), y.try_borrow()) else {
            return Some(x.ptr_eq(y));
        };
        if left.len() != right.len() {
            return Some(false);
        }
        Some(left.iter().zip(right.iter()).all(|pair| match pair {
            (Some(p), Some(q)) => self.equals(p, q),
            (None, None) => true,
            _ => false,
        }))
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// `None` if neither operand is `kind`, `Some(true)` if both are,
    /// `Some(false)` if exactly one is.
    fn both(&self, a: &Value, b: &Value, kind: Kind) -> Option<bool> {
        let (kind_a, kind_b) = Kind::pair(a, b, self.host());
        match (kind_a == kind, kind_b == kind) {
            (false, false) => None,
            (true, true) => Some(true),
            _ => Some(false),
        }
    }

    /// Field-wise record comparison over keys not excluded by the host.
    fn records(&self, a: &Value, b: &Value) -> bool {
        let (Some(x), Some(y)) = (a.as_object(), b.as_object()) else {
            return a.ptr_eq(b);
        };
        let (Ok(left), Ok(right)) = (x.try_borrow(), y.try_borrow()) else {
            return x.ptr_eq(y);
        };
        let keys = self.host().excluded_keys();
        let left_keys: Vec<&str> = left.keys().filter(|k| !keys.is_excluded(k)).collect();
        let right_len = right.keys().filter(|k| !keys.is_excluded(k)).count();
        if left_keys.len() != right_len {
            return false;
        }
        left_keys.into_iter().all(|key| match (left.get(key), right.get(key)) {
            (Some(p), Some(q)) => self.equals(p, q),
            _ => false,
        })
    }
}

/// Reference values other than symbols.
fn is_object_like(value: &Value) -> bool {
    value.identity().is_some() && !matches!(value, Value::Symbol(_))
}

fn same_class(a: &Value, b: &Value) -> bool {
    match (a.as_object(), b.as_object()) {
        (Some(x), Some(y)) => match (x.try_borrow(), y.try_borrow()) {
            (Ok(left), Ok(right)) => left.class() == right.class(),
            _ => true,
        },
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tern_types::StandardHost;

    use super::*;

    fn comparer(host: &StandardHost) -> Comparer<'_> {
        Comparer::new(host)
    }

    #[test]
    fn comparators_are_inapplicable_to_other_kinds() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let (a, b) = (Value::from(1), Value::from(2));
        assert_eq!(c.equals_date(&a, &b, None), None);
        assert_eq!(c.equals_map(&a, &b, None), None);
        assert_eq!(c.equals_set(&a, &b, None), None);
        assert_eq!(c.equals_regexp(&a, &b, None), None);
        assert_eq!(c.equals_object(&a, &b, None), None);
        assert_eq!(c.equals_element(&a, &b, None), None);
    }

    #[test]
    fn one_sided_kind_is_false() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let date = Value::date_millis(0);
        assert_eq!(c.equals_date(&date, &Value::from(0), None), Some(false));
        assert_eq!(c.equals_date(&Value::from(0), &date, None), Some(false));
        assert_eq!(c.equals_map(&Value::map([]), &Value::object(), None), Some(false));
    }

    #[test]
    fn dates() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::date_millis(1_000);
        assert_eq!(c.equals_date(&a, &Value::date_millis(1_000), None), Some(true));
        assert_eq!(c.equals_date(&a, &Value::date_millis(1_001), None), Some(false));
    }

    #[test]
    fn maps() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::map([(Value::from(1), Value::from("a"))]);
        let b = Value::map([(Value::from(1), Value::from("a"))]);
        assert_eq!(c.equals_map(&a, &b, None), Some(true));

        let different_value = Value::map([(Value::from(1), Value::from("b"))]);
        assert_eq!(c.equals_map(&a, &different_value, None), Some(false));

        let bigger = Value::map([
            (Value::from(1), Value::from("a")),
            (Value::from(2), Value::from("b")),
        ]);
        assert_eq!(c.equals_map(&a, &bigger, None), Some(false));

        let other_key = Value::map([(Value::from(2), Value::from("a"))]);
        assert_eq!(c.equals_map(&a, &other_key, None), Some(false));
    }

    #[test]
    fn map_values_compare_deeply() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::map([(Value::from("k"), Value::array([Value::from(1)]))]);
        let b = Value::map([(Value::from("k"), Value::array([Value::from(1)]))]);
        assert_eq!(c.equals_map(&a, &b, None), Some(true));
    }

    #[test]
    fn sets() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::set([Value::from(1), Value::from(2)]);
        let reordered = Value::set([Value::from(2), Value::from(1)]);
        assert_eq!(c.equals_set(&a, &reordered, None), Some(true));
        let other = Value::set([Value::from(1), Value::from(3)]);
        assert_eq!(c.equals_set(&a, &other, None), Some(false));
        let smaller = Value::set([Value::from(1)]);
        assert_eq!(c.equals_set(&a, &smaller, None), Some(false));
    }

    #[test]
    fn set_reference_members_are_position_correlated() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let record = |n: i32| Value::object_from([("n", Value::from(n))]);
        let a = Value::set([record(1), record(2)]);
        let same_order = Value::set([record(1), record(2)]);
        let swapped = Value::set([record(2), record(1)]);
        assert_eq!(c.equals_set(&a, &same_order, None), Some(true));
        assert_eq!(c.equals_set(&a, &swapped, None), Some(false));
    }

    #[test]
    fn array_buffers() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::array_buffer(vec![1, 2, 3]);
        assert_eq!(
            c.equals_array_buffer(&a, &Value::array_buffer(vec![1, 2, 3]), None),
            Some(true)
        );
        assert_eq!(
            c.equals_array_buffer(&a, &Value::array_buffer(vec![1, 2, 4]), None),
            Some(false)
        );
        assert_eq!(c.equals_array_buffer(&a, &Value::array_buffer(vec![1, 2]), None), Some(false));
        assert_eq!(
            c.equals_array_buffer(
                &Value::array_buffer(vec![0; 8]),
                &Value::array_buffer(vec![0; 8]),
                None
            ),
            Some(true)
        );
    }

    #[test]
    fn regexps() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::regexp("^abc$", "i");
        assert_eq!(c.equals_regexp(&a, &Value::regexp("^abc$", "i"), None), Some(true));
        assert_eq!(c.equals_regexp(&a, &Value::regexp("^abc$", "g"), None), Some(false));
        assert_eq!(c.equals_regexp(&a, &Value::regexp("^abd$", "i"), None), Some(false));
    }

    #[test]
    fn functions_by_identity() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let f = Value::function("handler");
        assert_eq!(c.equals_function(&f, &f.clone(), None), Some(true));
        assert_eq!(c.equals_function(&f, &Value::function("handler"), None), Some(false));
    }

    #[test]
    fn records_need_same_class_and_keys() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let point = Value::object_of_class("Point", [("x", Value::from(1))]);
        let plain = Value::object_from([("x", Value::from(1))]);
        assert_eq!(c.equals_object(&point, &plain, None), Some(false));

        let a = Value::object_from([("a", Value::Undefined)]);
        let b = Value::object_from([("b", Value::Undefined)]);
        assert_eq!(c.equals_object(&a, &b, None), Some(false));
        assert_eq!(c.equals_object(&Value::object(), &Value::object(), None), Some(true));
    }

    #[test]
    fn arrays_compare_index_wise() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::array([Value::from(1), Value::from(2)]);
        assert_eq!(
            c.equals_arrays(&a, &Value::array([Value::from(1), Value::from(2)]), None),
            Some(true)
        );
        assert_eq!(
            c.equals_arrays(&a, &Value::array([Value::from(2), Value::from(1)]), None),
            Some(false)
        );
        assert_eq!(c.equals_arrays(&a, &Value::array([Value::from(1)]), None), Some(false));

        let holey = Value::sparse_array(vec![Some(Value::from(1)), None]);
        let filled = Value::sparse_array(vec![Some(Value::from(1)), Some(Value::Undefined)]);
        assert_eq!(c.equals_arrays(&holey, &filled, None), Some(false));
        assert_eq!(
            c.equals_arrays(&holey, &Value::sparse_array(vec![Some(Value::from(1)), None]), None),
            Some(true)
        );
    }

    #[test]
    fn override_applies_after_kind_check() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let lenient = |_: &Value, _: &Value| Some(true);
        let a = Value::date_millis(1);
        let b = Value::date_millis(2);
        assert_eq!(c.equals_date(&a, &b, Some(&lenient)), Some(true));
        assert_eq!(c.equals_date(&a, &Value::from(1), Some(&lenient)), Some(false));
    }

    #[test]
    fn elements() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let el = |label: &str| {
            Value::element(
                Value::from("button"),
                Value::object_from([("label", Value::from(label)), ("_owner", Value::object())]),
            )
        };
        assert_eq!(c.equals_element(&el("a"), &el("a"), None), Some(true));
        assert_eq!(c.equals_element(&el("a"), &el("b"), None), Some(false));

        let other_type =
            Value::element(Value::from("a"), Value::object_from([("label", Value::from("a"))]));
        assert_eq!(c.equals_element(&el("a"), &other_type, None), Some(false));
        assert_eq!(c.equals_element(&el("a"), &Value::object(), None), Some(false));
    }

    #[test]
    fn elements_without_props_fall_through() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::element(Value::from("br"), Value::Null);
        let b = Value::element(Value::from("br"), Value::Null);
        assert_eq!(c.equals_element(&a, &b, None), None);
        assert!(c.equals(&a, &b));
    }

    #[test]
    fn ref_handles_compare_current() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::ref_handle(Value::array([Value::from(1)]));
        let b = Value::ref_handle(Value::array([Value::from(1)]));
        assert_eq!(c.equals_ref_handle(&a, &b, None), Some(true));
        let other = Value::ref_handle(Value::from(5));
        assert_eq!(c.equals_ref_handle(&a, &other, None), Some(false));
        assert_eq!(c.equals_ref_handle(&a, &Value::object(), None), Some(false));
    }

    #[test]
    fn payloads() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::blob("text/plain", &b"hello"[..]);
        assert_eq!(c.equals_payload(&a, &a.clone(), None), Some(true));
        assert_eq!(
            c.equals_payload(&a, &Value::blob("text/plain", &b"hello"[..]), None),
            Some(true)
        );
        assert_eq!(
            c.equals_payload(&a, &Value::blob("text/html", &b"hello"[..]), None),
            Some(false)
        );
        assert_eq!(
            c.equals_payload(&a, &Value::array_buffer(b"hello".to_vec()), None),
            Some(false)
        );
    }

    #[test]
    fn borrowed_operands_compare_by_identity() {
        let host = StandardHost::new();
        let c = comparer(&host);
        let a = Value::object_from([("v", Value::from(1))]);
        let b = Value::object_from([("v", Value::from(1))]);
        let _guard = b.as_object().unwrap().borrow_mut();
        assert!(!c.equals(&a, &b));
    }
}
