//! tests/properties.rs
//!
//! Property-based tests for the invariants the structural type system, the
//! value equality relation, and the evaluator's currying/short-circuit
//! behavior are required to hold over arbitrary inputs, not just the
//! hand-picked cases in `tests/types.rs` and `tests/interpreter.rs`.

use mindscript::types::{is_subtype, type_of, Type};
use mindscript::value::{value_eq, ValueKind};
use mindscript::{EchoOracle, Flow, Interpreter, MindError, Value};
use num_bigint::BigInt;
use proptest::prelude::*;

struct NullLoader;

impl mindscript::ModuleLoader for NullLoader {
    fn load(&self, path: &str) -> Result<String, MindError> {
        Err(MindError::value_error(format!("no module named '{}'", path), None))
    }
}

fn run(src: &str) -> Value {
    let interp = Interpreter::new(Box::new(EchoOracle), Box::new(NullLoader), Box::new(Vec::<u8>::new()));
    let program = mindscript::parse_source(src).expect("failed to parse source");
    match interp.eval_program(&program, &interp.root) {
        Ok(v) => v,
        Err(Flow::Error(e)) => panic!("evaluation error: {}", e),
        Err(Flow::Signal(s)) => panic!("unexpected escaping signal: {:?}", s),
    }
}

/// A small recursive generator for `Type` terms, depth-bounded so array/arrow
/// nesting terminates. Skips `Object`/`Enum`/`Optional` here — those are
/// covered by the targeted unit tests in `tests/types.rs`.
fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::Null),
        Just(Type::Bool),
        Just(Type::Int),
        Just(Type::Num),
        Just(Type::Str),
        Just(Type::Any),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| Type::Array(Box::new(t))),
            (inner.clone(), inner).prop_map(|(p, r)| Type::Arrow(Box::new(p), Box::new(r))),
        ]
    })
}

fn arb_simple_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::null()),
        any::<bool>().prop_map(Value::bool),
        any::<i32>().prop_map(|n| Value::int(BigInt::from(n))),
        any::<i16>().prop_map(|n| Value::num(n as f64)),
        "[a-z]{0,8}".prop_map(Value::str),
    ]
}

proptest! {
    /// `typeOf(v) <= Any` for any simple runtime value.
    #[test]
    fn prop_type_of_is_always_subtype_of_any(v in arb_simple_value()) {
        prop_assert!(is_subtype(&type_of(&v), &Type::Any));
    }

    /// `isSubtype` is reflexive over any generated type term.
    #[test]
    fn prop_is_subtype_reflexive(t in arb_type()) {
        prop_assert!(is_subtype(&t, &t));
    }

    /// `isSubtype` is transitive: if `a <= b` and `b <= c` then `a <= c`.
    /// Constructed directly via the widening chain `Int <= Num <= Any` wrapped
    /// in a generated number of `Array`/`Arrow` layers, since transitivity
    /// over independently-sampled triples rarely yields a true premise.
    #[test]
    fn prop_is_subtype_transitive_through_widening_chain(wrap_array in any::<bool>()) {
        let (a, b, c) = if wrap_array {
            (Type::Array(Box::new(Type::Int)), Type::Array(Box::new(Type::Num)), Type::Array(Box::new(Type::Any)))
        } else {
            (Type::Int, Type::Num, Type::Any)
        };
        prop_assert!(is_subtype(&a, &b));
        prop_assert!(is_subtype(&b, &c));
        prop_assert!(is_subtype(&a, &c));
    }

    /// `[A] <= [B] <=> A <= B`, checked both directions over a widening pair.
    #[test]
    fn prop_array_subtyping_iff_element_subtyping(widen in any::<bool>()) {
        let (elem_a, elem_b) = if widen { (Type::Int, Type::Num) } else { (Type::Num, Type::Int) };
        let expect = is_subtype(&elem_a, &elem_b);
        let actual = is_subtype(&Type::Array(Box::new(elem_a)), &Type::Array(Box::new(elem_b)));
        prop_assert_eq!(expect, actual);
    }

    /// `(A -> B) <= (C -> D) <=> C <= A and B <= D` (contravariant param,
    /// covariant return), checked over a small fixed set of widening pairs.
    #[test]
    fn prop_arrow_subtyping_matches_contravariant_covariant_rule(
        param_widen in any::<bool>(),
        ret_widen in any::<bool>(),
    ) {
        let (pa, pc) = if param_widen { (Type::Int, Type::Num) } else { (Type::Num, Type::Int) };
        let (rb, rd) = if ret_widen { (Type::Int, Type::Num) } else { (Type::Num, Type::Int) };
        let lhs = Type::Arrow(Box::new(pa.clone()), Box::new(rb.clone()));
        let rhs = Type::Arrow(Box::new(pc.clone()), Box::new(rd.clone()));
        let expect = is_subtype(&pc, &pa) && is_subtype(&rb, &rd);
        prop_assert_eq!(expect, is_subtype(&lhs, &rhs));
    }

    /// Equality is reflexive, symmetric, and transitive over simple values
    /// (transitivity checked via a third value structurally equal to the
    /// first, since independently-sampled triples rarely form an equal chain).
    #[test]
    fn prop_equality_reflexive_symmetric_transitive(v in arb_simple_value(), w in arb_simple_value()) {
        prop_assert!(value_eq(&v, &v));
        prop_assert_eq!(value_eq(&v, &w), value_eq(&w, &v));
        if value_eq(&v, &w) {
            let v_clone = clone_like(&v);
            prop_assert!(value_eq(&v, &v_clone));
            prop_assert!(value_eq(&w, &v_clone));
        }
    }

    /// A type term's `Display` rendering, re-lexed and re-parsed as a `type`
    /// expression, reifies back to the same `Type` term.
    #[test]
    fn prop_type_round_trips_through_display_and_reparse(t in arb_type()) {
        let text = format!("type {}", t);
        let value = run(&text);
        match &value.kind {
            ValueKind::Type(reparsed) => prop_assert_eq!(reparsed.as_ref(), &t),
            other => prop_assert!(false, "expected a Type value, got {:?}", other),
        }
    }

    /// `false and e` never evaluates `e`; `true or e` never evaluates `e`.
    /// Uses an undefined name as `e` so evaluating it would raise a NameError.
    #[test]
    fn prop_and_or_short_circuit(flag in any::<bool>()) {
        let src = if flag { "true or undefinedName" } else { "false and undefinedName" };
        let result = run(src);
        prop_assert_eq!(result.truthy(), flag);
    }

    /// Currying: a two-parameter declared function applied fully in one call
    /// equals the same function applied one argument at a time.
    #[test]
    fn prop_currying_equals_full_application(a in -1000i64..1000, b in -1000i64..1000) {
        let src = format!(
            "let f = fun (x: Int, y: Int) do x * 31 + y end;
             let full = f({a}, {b});
             let partial = f({a})({b});
             full == partial",
            a = a, b = b,
        );
        let result = run(&src);
        prop_assert!(result.truthy());
    }
}

/// Helper for the transitivity leg of `prop_equality_reflexive_symmetric_transitive`:
/// builds a value structurally equal to `v` without sharing its identity,
/// standing in for "an independently-constructed equal value".
fn clone_like(v: &Value) -> Value {
    match &v.kind {
        ValueKind::Null => Value::null(),
        ValueKind::Bool(b) => Value::bool(*b),
        ValueKind::Int(n) => Value::int(n.clone()),
        ValueKind::Num(n) => Value::num(*n),
        ValueKind::Str(s) => Value::str(s.as_ref()),
        _ => v.clone(),
    }
}
