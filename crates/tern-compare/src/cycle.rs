//! Circular-reference detection.
//!
//! A value is cyclic when following its children revisits one of its
//! ancestors. Reference handles are allowed to point back at their owner:
//! a cyclic verdict raised by a handle child does not make the parent cyclic.
//!
//! The walk runs on an explicit frame stack, so deeply nested input cannot
//! exhaust the call stack.

use std::vec::IntoIter;

use tern_types::{Host, StandardHost, Value};
use tracing::trace;

/// Returns `true` if `value` contains a circular reference, using the
/// standard host.
pub fn has_cycles(value: &Value) -> bool {
    has_cycles_with(value, &mut Vec::new(), &StandardHost::new())
}

/// Returns `true` if `value` is already one of `ancestors`, or if any of its
/// children (keys in the host's excluded-key filter skipped) revisits an
/// ancestor.
///
/// `ancestors` is left exactly as it was passed in.
pub fn has_cycles_with(value: &Value, ancestors: &mut Vec<Value>, host: &dyn Host) -> bool {
    if !value.is_container() {
        return false;
    }
    if is_ancestor(value, ancestors) {
        return true;
    }

    let base = ancestors.len();
    ancestors.push(value.clone());
    let mut frames = vec![Frame::new(value.clone(), host)];
    let mut child_cyclic = false;

    while let Some(frame) = frames.last_mut() {
        if child_cyclic {
            // The node on top of the stack has a cyclic, non-exempt child.
            let node = frame.node.clone();
            frames.pop();
            ancestors.pop();
            if frames.is_empty() {
                ancestors.truncate(base);
                return true;
            }
            if host.is_ref_handle(&node) {
                trace!(node = node.type_name(), "cycle through reference handle ignored");
                child_cyclic = false;
            }
            continue;
        }

        let Some(child) = frame.children.next() else {
            frames.pop();
            ancestors.pop();
            continue;
        };
        if !child.is_container() {
            continue;
        }
        if is_ancestor(&child, ancestors) {
            child_cyclic = !host.is_ref_handle(&child);
            continue;
        }
        ancestors.push(child.clone());
        frames.push(Frame::new(child, host));
    }

    false
}

fn is_ancestor(value: &Value, ancestors: &[Value]) -> bool {
    ancestors.iter().any(|ancestor| ancestor.ptr_eq(value))
}

struct Frame {
    node: Value,
    children: IntoIter<Value>,
}

impl Frame {
    fn new(node: Value, host: &dyn Host) -> Self {
        let children = children(&node, host).into_iter();
        Self { node, children }
    }
}

/// Enumerable children of a container. Unreadable containers are leaves.
fn children(value: &Value, host: &dyn Host) -> Vec<Value> {
    let keys = host.excluded_keys();
    match value {
        Value::Object(object) => object
            .try_borrow()
            .map(|data| {
                data.iter()
                    .filter(|(key, _)| !keys.is_excluded(key))
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default(),
        Value::Array(array) => array
            .try_borrow()
            .map(|slots| slots.iter().flatten().cloned().collect())
            .unwrap_or_default(),
        Value::Map(map) => map
            .try_borrow()
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|(k, v)| [k.value().clone(), v.clone()])
                    .collect()
            })
            .unwrap_or_default(),
        Value::Set(set) => set
            .try_borrow()
            .map(|members| members.iter().map(|m| m.value().clone()).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_and_leaves_are_never_cyclic() {
        assert!(!has_cycles(&Value::from(1)));
        assert!(!has_cycles(&Value::Undefined));
        assert!(!has_cycles(&Value::function("f")));
        assert!(!has_cycles(&Value::date_millis(0)));
    }

    #[test]
    fn self_reference_is_cyclic() {
        let obj = Value::object();
        obj.insert("self", obj.clone());
        assert!(has_cycles(&obj));
    }

    #[test]
    fn indirect_cycle_is_detected() {
        let a = Value::object();
        let b = Value::array([a.clone()]);
        a.insert("list", b.clone());
        assert!(has_cycles(&a));
        assert!(has_cycles(&b));
    }

    #[test]
    fn shared_siblings_are_not_cycles() {
        let shared = Value::object_from([("x", Value::from(1))]);
        let root = Value::object_from([("a", shared.clone()), ("b", shared.clone())]);
        let list = Value::array([shared.clone(), shared]);
        assert!(!has_cycles(&root));
        assert!(!has_cycles(&list));
    }

    #[test]
    fn excluded_keys_are_skipped() {
        let obj = Value::object();
        obj.insert("_owner", obj.clone());
        obj.insert("__reactFiber$abc", obj.clone());
        obj.insert("value", Value::from(1));
        assert!(!has_cycles(&obj));
    }

    #[test]
    fn excluded_key_does_not_hide_later_cycles() {
        let obj = Value::object();
        obj.insert("_self", Value::from(1));
        obj.insert("loop", obj.clone());
        assert!(has_cycles(&obj));
    }

    #[test]
    fn reference_handles_may_point_at_their_owner() {
        let owner = Value::object();
        let handle = Value::ref_handle(owner.clone());
        owner.insert("ref", handle.clone());
        assert!(!has_cycles(&owner));
        // The walk from the handle reaches it again as a handle child.
        assert!(!has_cycles(&handle));
    }

    #[test]
    fn exemption_keeps_ancestors_consistent() {
        let owner = Value::object();
        let handle = Value::ref_handle(owner.clone());
        let sibling = Value::object_from([("n", Value::from(1))]);
        owner.insert("ref", handle);
        owner.insert("sibling", sibling);
        let mut ancestors = Vec::new();
        assert!(!has_cycles_with(&owner, &mut ancestors, &StandardHost::new()));
        assert!(ancestors.is_empty());
    }

    #[test]
    fn cycles_inside_maps_and_sets() {
        let map = Value::map([]);
        if let Value::Map(inner) = &map {
            inner
                .borrow_mut()
                .insert(tern_types::MapKey::new(Value::from("me")), map.clone());
        }
        assert!(has_cycles(&map));

        let holder = Value::object();
        holder.insert("members", Value::set([holder.clone()]));
        assert!(has_cycles(&holder));
    }

    #[test]
    fn caller_supplied_ancestors_are_honoured() {
        let child = Value::object();
        let mut ancestors = vec![child.clone()];
        assert!(has_cycles_with(&child, &mut ancestors, &StandardHost::new()));
        assert_eq!(ancestors.len(), 1);
    }

    #[test]
    fn ancestors_restored_after_cycle() {
        let obj = Value::object();
        obj.insert("inner", Value::object_from([("back", obj.clone())]));
        let mut ancestors = Vec::new();
        assert!(has_cycles_with(&obj, &mut ancestors, &StandardHost::new()));
        assert!(ancestors.is_empty());
    }

    #[test]
    fn borrowed_containers_are_leaves() {
        let obj = Value::object();
        obj.insert("self", obj.clone());
        let _guard = obj.as_object().unwrap().borrow_mut();
        assert!(!has_cycles(&obj));
    }

    #[test]
    fn deep_nesting_is_walked_iteratively() {
        let mut value = Value::from(0);
        for _ in 0..2_000 {
            value = Value::array([value]);
        }
        assert!(!has_cycles(&value));
    }
}
