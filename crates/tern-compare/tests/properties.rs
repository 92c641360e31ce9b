//! Property-based tests for deep equality.
//!
//!  - Reflexivity: equals(x, x) for every acyclic x
//!  - Copies: equals(x, copy(x)) where copy allocates fresh containers
//!  - Symmetry: equals(a, b) == equals(b, a)
//!  - Kind mismatch: values of different kinds are never equal

use proptest::prelude::*;
use tern_compare::{equals, has_cycles};
use tern_types::{Kind, StandardHost, Value};

// ============================================================================
// Strategies
// ============================================================================

/// Shape of a value, built into a fresh `Value` on demand so the same shape
/// can be materialized twice without sharing references.
#[derive(Clone, Debug)]
enum Shape {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Date(i64),
    RegExp(String, String),
    Buffer(Vec<u8>),
    Array(Vec<Option<Shape>>),
    Object(Vec<(String, Shape)>),
    Map(Vec<(i32, Shape)>),
    Set(Vec<i32>),
}

impl Shape {
    fn build(&self) -> Value {
        match self {
            Shape::Undefined => Value::Undefined,
            Shape::Null => Value::Null,
            Shape::Bool(b) => Value::from(*b),
            Shape::Number(n) => Value::from(*n),
            Shape::Str(s) => Value::from(s.as_str()),
            Shape::Date(ms) => Value::date_millis(*ms),
            Shape::RegExp(source, flags) => Value::regexp(source, flags),
            Shape::Buffer(bytes) => Value::array_buffer(bytes.clone()),
            Shape::Array(slots) => {
                Value::sparse_array(slots.iter().map(|s| s.as_ref().map(Shape::build)).collect())
            }
            Shape::Object(entries) => {
                Value::object_from(entries.iter().map(|(k, v)| (k.clone(), v.build())))
            }
            Shape::Map(entries) => {
                Value::map(entries.iter().map(|(k, v)| (Value::from(*k), v.build())))
            }
            Shape::Set(members) => Value::set(members.iter().map(|m| Value::from(*m))),
        }
    }
}

fn leaf_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Undefined),
        Just(Shape::Null),
        any::<bool>().prop_map(Shape::Bool),
        prop_oneof![any::<f64>(), Just(f64::NAN), Just(-0.0)].prop_map(Shape::Number),
        "[a-z]{0,6}".prop_map(Shape::Str),
        (-1_000_000i64..1_000_000).prop_map(Shape::Date),
        ("[a-z^$]{1,5}", "[gimsuy]{0,3}").prop_map(|(s, f)| Shape::RegExp(s, f)),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Shape::Buffer),
        prop::collection::vec(-5i32..5, 0..5).prop_map(Shape::Set),
    ]
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    leaf_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(prop::option::weighted(0.9, inner.clone()), 0..6)
                .prop_map(Shape::Array),
            prop::collection::vec(("[a-z]{1,4}", inner.clone()), 0..6).prop_map(Shape::Object),
            prop::collection::vec((-5i32..5, inner), 0..4).prop_map(Shape::Map),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn equality_is_reflexive(shape in shape_strategy()) {
        let value = shape.build();
        prop_assert!(!has_cycles(&value));
        prop_assert!(equals(&value, &value));
    }

    #[test]
    fn equal_shapes_build_equal_values(shape in shape_strategy()) {
        prop_assert!(equals(&shape.build(), &shape.build()));
    }

    #[test]
    fn equality_is_symmetric(a in shape_strategy(), b in shape_strategy()) {
        let (a, b) = (a.build(), b.build());
        prop_assert_eq!(equals(&a, &b), equals(&b, &a));
    }

    #[test]
    fn different_kinds_are_never_equal(a in shape_strategy(), b in shape_strategy()) {
        let host = StandardHost::new();
        let (a, b) = (a.build(), b.build());
        let (kind_a, kind_b) = Kind::pair(&a, &b, &host);
        prop_assume!(kind_a != kind_b);
        prop_assert!(!equals(&a, &b));
    }
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn kind_mismatch_examples() {
    assert!(!equals(&Value::from(1), &Value::from("1")));
    assert!(!equals(&Value::date_millis(0), &Value::from(0)));
    assert!(!equals(&Value::array([]), &Value::object()));
}

#[test]
fn map_equality_examples() {
    let one = || Value::map([(Value::from(1), Value::from("a"))]);
    assert!(equals(&one(), &one()));
    let two = Value::map([
        (Value::from(1), Value::from("a")),
        (Value::from(2), Value::from("b")),
    ]);
    assert!(!equals(&one(), &two));
    assert!(!equals(&one(), &Value::map([(Value::from(1), Value::from("b"))])));
}

#[test]
fn self_reference_terminates() {
    let a = Value::object();
    a.insert("self", a.clone());
    assert!(has_cycles(&a));
    assert!(equals(&a, &a));
    let b = Value::object();
    b.insert("self", b.clone());
    assert!(equals(&a, &b));
}
