//! src/builtins.rs

/********************************************************************************
 *                              BUILTINS MODULE
 *-------------------------------------------------------------------------------*
 * The fixed builtin seed bound into every root environment: I/O (`print`,
 * `println`), reflection (`typeOf`, `isSubtype`, `getEnv`), iteration
 * (`iter`), module loading (`import`, `netImport`), and the small
 * collection/arithmetic helpers (`len`, `push`, `keys`, `values`, `range`,
 * `abs`, `min`, `max`). Each is installed as a `Builtin` value, curried one
 * argument at a time by `Interpreter::apply_builtin`; `call` executes one
 * once every argument has arrived.
 ********************************************************************************/

use std::io::Write as _;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::ast::Literal;
use crate::env::Environment;
use crate::error::{EvalResult, MindError};
use crate::interpreter::Interpreter;
use crate::types;
use crate::value::{Builtin, BuiltinId, IteratorState, Value, ValueKind};

/// Seeds a fresh root environment with every builtin, each starting out
/// unapplied (`bound` empty).
pub fn install(env: &Environment) {
    for id in ALL {
        env.bind(id.name(), Value::new(ValueKind::Builtin(Rc::new(Builtin { id, bound: Vec::new() }))));
    }
}

const ALL: [BuiltinId; 18] = [
    BuiltinId::Print,
    BuiltinId::Println,
    BuiltinId::Str,
    BuiltinId::Assert,
    BuiltinId::Iter,
    BuiltinId::TypeOf,
    BuiltinId::IsSubtype,
    BuiltinId::GetEnv,
    BuiltinId::Import,
    BuiltinId::NetImport,
    BuiltinId::Len,
    BuiltinId::Push,
    BuiltinId::Keys,
    BuiltinId::Values,
    BuiltinId::Range,
    BuiltinId::Abs,
    BuiltinId::Min,
    BuiltinId::Max,
];

/// Reifies an AST literal (from an enum's declared value set) into a runtime
/// value. Used by `crate::oracle::base_value` and by this module's own enum
/// handling; infallible since the parser only ever produces literal AST nodes.
pub fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::null(),
        Literal::Bool(b) => Value::bool(*b),
        Literal::Int(i) => Value::int(i.clone()),
        Literal::Num(n) => Value::num(*n),
        Literal::Str(s) => Value::str(s.as_str()),
    }
}

/// Executes a fully-applied builtin. `args.len()` is guaranteed to equal
/// `id.arity()` by `Interpreter::apply_builtin`.
pub fn call(interp: &Interpreter, id: BuiltinId, args: &[Value]) -> EvalResult {
    match id {
        BuiltinId::Print => {
            write!(interp.stdout.borrow_mut(), "{}", crate::value::stringify(&args[0]))
                .map_err(|e| MindError::internal(format!("write failed: {}", e)))?;
            Ok(Value::null())
        }
        BuiltinId::Println => {
            writeln!(interp.stdout.borrow_mut(), "{}", crate::value::stringify(&args[0]))
                .map_err(|e| MindError::internal(format!("write failed: {}", e)))?;
            Ok(Value::null())
        }
        BuiltinId::Str => Ok(Value::str(crate::value::stringify(&args[0]))),
        BuiltinId::Assert => {
            if args[0].truthy() {
                Ok(Value::null())
            } else {
                Err(MindError::value_error("assertion failed", None).into())
            }
        }
        BuiltinId::Iter => iter(&args[0]),
        BuiltinId::TypeOf => Ok(Value::new(ValueKind::Type(Rc::new(types::type_of(&args[0]))))),
        BuiltinId::IsSubtype => is_subtype(&args[0], &args[1]),
        BuiltinId::GetEnv => {
            let snapshot = interp.root.snapshot();
            Ok(Value::object(snapshot))
        }
        BuiltinId::Import => import(interp, &args[0], false),
        BuiltinId::NetImport => import(interp, &args[0], true),
        BuiltinId::Len => len(&args[0]),
        BuiltinId::Push => push(&args[0], args[1].clone()),
        BuiltinId::Keys => keys(&args[0]),
        BuiltinId::Values => values(&args[0]),
        BuiltinId::Range => range(&args[0], &args[1]),
        BuiltinId::Abs => abs(&args[0]),
        BuiltinId::Min => min_max(&args[0], &args[1], true),
        BuiltinId::Max => min_max(&args[0], &args[1], false),
    }
}

fn iter(value: &Value) -> EvalResult {
    match &value.kind {
        ValueKind::Array(items) => Ok(Value::new(ValueKind::Iterator(Rc::new(std::cell::RefCell::new(IteratorState::Array {
            items: Rc::clone(items),
            next: 0,
        }))))),
        ValueKind::Object(fields) => Ok(Value::new(ValueKind::Iterator(Rc::new(std::cell::RefCell::new(IteratorState::Object {
            pairs: Rc::clone(fields),
            next: 0,
        }))))),
        ValueKind::Function(_) | ValueKind::Oracle(_) | ValueKind::Builtin(_) | ValueKind::Iterator(_) => Ok(value.clone()),
        _ => Err(MindError::type_error(format!("cannot make an iterator from a {}", value.kind_name()), None).into()),
    }
}

fn is_subtype(a: &Value, b: &Value) -> EvalResult {
    match (&a.kind, &b.kind) {
        (ValueKind::Type(ta), ValueKind::Type(tb)) => Ok(Value::bool(types::is_subtype(ta, tb))),
        _ => Err(MindError::type_error("isSubtype expects two Type values", None).into()),
    }
}

fn import(interp: &Interpreter, path: &Value, net: bool) -> EvalResult {
    let path = match &path.kind {
        ValueKind::Str(s) => s.clone(),
        _ => return Err(MindError::type_error("import expects a Str path", None).into()),
    };
    let source = if net {
        crate::loader::HttpLoader.load(&path)
    } else {
        interp.loader.load(&path)
    }?;
    let tokens = crate::lexer::Lexer::new(&source).tokenize()?;
    let program = crate::parser::parse(tokens)?;
    let module_env = Environment::child(&interp.root);
    interp.eval_program(&program, &module_env)?;
    Ok(Value::object(module_env.local_snapshot()))
}

fn len(value: &Value) -> EvalResult {
    match &value.kind {
        ValueKind::Array(items) => Ok(Value::int(BigInt::from(items.borrow().len()))),
        ValueKind::Object(fields) => Ok(Value::int(BigInt::from(fields.borrow().len()))),
        ValueKind::Str(s) => Ok(Value::int(BigInt::from(s.chars().count()))),
        _ => Err(MindError::type_error(format!("len is undefined for a {}", value.kind_name()), None).into()),
    }
}

fn push(array: &Value, item: Value) -> EvalResult {
    match &array.kind {
        ValueKind::Array(items) => {
            items.borrow_mut().push(item);
            Ok(array.clone())
        }
        _ => Err(MindError::type_error("push expects an Array", None).into()),
    }
}

fn keys(object: &Value) -> EvalResult {
    match &object.kind {
        ValueKind::Object(fields) => Ok(Value::array(fields.borrow().keys().map(|k| Value::str(Rc::clone(k))).collect())),
        _ => Err(MindError::type_error("keys expects an Object", None).into()),
    }
}

fn values(object: &Value) -> EvalResult {
    match &object.kind {
        ValueKind::Object(fields) => Ok(Value::array(fields.borrow().values().cloned().collect())),
        _ => Err(MindError::type_error("values expects an Object", None).into()),
    }
}

fn range(start: &Value, end: &Value) -> EvalResult {
    match (&start.kind, &end.kind) {
        (ValueKind::Int(a), ValueKind::Int(b)) => Ok(Value::new(ValueKind::Iterator(Rc::new(std::cell::RefCell::new(
            IteratorState::Range { current: a.clone(), end: b.clone() },
        ))))),
        _ => Err(MindError::type_error("range expects two Int bounds", None).into()),
    }
}

fn abs(value: &Value) -> EvalResult {
    match &value.kind {
        ValueKind::Int(i) => Ok(Value::int(i.abs())),
        ValueKind::Num(n) => Ok(Value::num(n.abs())),
        _ => Err(MindError::type_error("abs expects an Int or Num", None).into()),
    }
}

fn min_max(a: &Value, b: &Value, want_min: bool) -> EvalResult {
    let (fa, fb) = match (numeric_f64(a), numeric_f64(b)) {
        (Some(fa), Some(fb)) => (fa, fb),
        _ => return Err(MindError::type_error("min/max expect numeric operands", None).into()),
    };
    let a_wins = if want_min { fa <= fb } else { fa >= fb };
    Ok(if a_wins { a.clone() } else { b.clone() })
}

fn numeric_f64(v: &Value) -> Option<f64> {
    match &v.kind {
        ValueKind::Int(i) => i.to_f64(),
        ValueKind::Num(n) => Some(*n),
        _ => None,
    }
}
