//! Structural deep equality.
//!
//! [`Comparer::equals`] dispatches on the operands' kinds in a fixed order:
//! element, reference handle, payload, function, date, then (when `a` is a
//! cyclic container) an opaque `true`, then map, set, array buffer, regexp,
//! record/array, and finally SameValueZero.

use std::cell::RefCell;

use tern_types::{Host, StandardHost, Value};
use tracing::debug;

use crate::cycle::has_cycles_with;

/// A caller-supplied equality override. `None` defers to the engine.
pub type Override<'a> = &'a dyn Fn(&Value, &Value) -> Option<bool>;

/// Equality engine bound to a host.
///
/// A `Comparer` keeps the pairs of containers it is currently comparing; a
/// pair that is reached again while still open compares as equal, so the
/// comparison terminates even on graphs the cycle detector exempts.
pub struct Comparer<'h> {
    host: &'h dyn Host,
    open: RefCell<Vec<(usize, usize)>>,
}

impl<'h> Comparer<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Self {
            host,
            open: RefCell::new(Vec::new()),
        }
    }

    pub fn host(&self) -> &'h dyn Host {
        self.host
    }

    /// Deep equality without an override.
    ///
    /// Recursion depth follows the nesting depth of the operands; only the
    /// cycle check walks an explicit stack.
    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        self.equals_with_override(a, b, None)
    }

    /// Deep equality. The override applies to this pair only; nested pairs
    /// are compared by the engine.
    pub fn equals_with_override(&self, a: &Value, b: &Value, custom: Option<Override<'_>>) -> bool {
        if a.is_nullish() || b.is_nullish() {
            return a.same_value_zero(b);
        }
        if let Some(verdict) = custom.and_then(|f| f(a, b)) {
            return verdict;
        }
        if a.ptr_eq(b) {
            return true;
        }

        let pair = match (a.is_container() && b.is_container(), a.identity(), b.identity()) {
            (true, Some(x), Some(y)) => Some((x, y)),
            _ => None,
        };
        if let Some(pair) = pair {
            if self.open.borrow().contains(&pair) {
                return true;
            }
            self.open.borrow_mut().push(pair);
        }

        let verdict = self.dispatch(a, b);

        if pair.is_some() {
            self.open.borrow_mut().pop();
        }
        verdict
    }

    fn dispatch(&self, a: &Value, b: &Value) -> bool {
        if let Some(verdict) = self.equals_element(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_ref_handle(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_payload(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_function(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_date(a, b, None) {
            return verdict;
        }

        if has_cycles_with(a, &mut Vec::new(), self.host) {
            debug!(value = %a, "cyclic operand compared as equal");
            return true;
        }

        if let Some(verdict) = self.equals_map(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_set(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_array_buffer(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_regexp(a, b, None) {
            return verdict;
        }
        if let Some(verdict) = self.equals_object(a, b, None) {
            return verdict;
        }

        a.same_value_zero(b)
    }
}

/// Deep equality using the standard host.
pub fn equals(a: &Value, b: &Value) -> bool {
    let host = StandardHost::new();
    Comparer::new(&host).equals(a, b)
}

/// Deep equality with an explicit host and an optional top-level override.
pub fn equals_with(a: &Value, b: &Value, host: &dyn Host, custom: Option<Override<'_>>) -> bool {
    Comparer::new(host).equals_with_override(a, b, custom)
}
