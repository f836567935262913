//! src/interpreter/mod.rs

/********************************************************************************
 *                             INTERPRETER MODULE
 *-------------------------------------------------------------------------------*
 * The tree-walking evaluator. `Interpreter` bundles the collaborators that
 * live outside the pure language core (the oracle adapter, the module
 * loader, the output sink) and `eval_expr` is the single recursive function
 * that drives evaluation; non-local exits travel through `Flow` rather than
 * through Rust panics or extra interpreter state.
 *
 * `control` holds the block/if/for evaluation helpers; this module owns
 * literal/identifier/call/member/index/binary evaluation and function/oracle
 * application.
 ********************************************************************************/

mod control;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::ast::{BinaryOp, Expr, Literal, LValue, Pattern};
use crate::env::Environment;
use crate::error::{EvalResult, Flow, MindError, Signal};
use crate::oracle::{OracleAdapter, OracleRequest};
use crate::loader::ModuleLoader;
use crate::types::{self, Type};
use crate::value::{Builtin, FunctionValue, IteratorState, OracleValue, Value, ValueKind};

pub struct Interpreter {
    pub root: Environment,
    pub oracle: Box<dyn OracleAdapter>,
    pub loader: Box<dyn ModuleLoader>,
    pub stdout: RefCell<Box<dyn Write>>,
}

/// Where a function application's `this` should come from.
///
/// A member call (`obj.method(...)`) supplies `Receiver` on its first
/// applied argument only; every later argument of that same call applies as
/// `Continuation`, leaving `this` unbound so lookup falls through the
/// closure chain to the frame the receiver was actually bound in (this is
/// what makes multi-parameter methods, curried at parse time into nested
/// single-parameter closures, see the same `this` at every step). Any other
/// application — a plain identifier call, a call through a variable holding
/// a function, a freshly invoked nested closure — is `Standalone` and binds
/// `this` to `null` explicitly, so it can never inherit a `this` left over
/// from an unrelated enclosing method.
pub enum ThisBinding {
    Receiver(Value),
    Continuation,
    Standalone,
}

impl Interpreter {
    pub fn new(oracle: Box<dyn OracleAdapter>, loader: Box<dyn ModuleLoader>, stdout: Box<dyn Write>) -> Self {
        let root = Environment::root();
        let interp = Self { root, oracle, loader, stdout: RefCell::new(stdout) };
        crate::builtins::install(&interp.root);
        interp
    }

    pub fn eval_program(&self, program: &crate::ast::Program, env: &Environment) -> EvalResult {
        self.eval_block_body(&program.expressions, env)
    }

    pub fn eval_expr(&self, expr: &Expr, env: &Environment) -> EvalResult {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Identifier(name) => env.get(name).map_err(Flow::from),
            Expr::This => env.get("this").or_else(|_| Ok(Value::null())),
            Expr::Let { pattern, value } => {
                let v = self.eval_expr(value, env)?;
                self.bind_pattern(pattern, v.clone(), env, true)?;
                Ok(v)
            }
            Expr::Assign { target, value } => self.eval_assign(target, value, env),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                Ok(Value::array(values))
            }
            Expr::Object(fields) => {
                let mut map = IndexMap::new();
                for (key, value_expr) in fields {
                    let value = self.eval_expr(value_expr, env)?;
                    map.insert(Rc::from(key.as_str()), value);
                }
                Ok(Value::object(map))
            }
            Expr::Member { object, name } => {
                let obj = self.eval_expr(object, env)?;
                self.get_member(&obj, name).map_err(Flow::from)
            }
            Expr::Index { object, index } => {
                let obj = self.eval_expr(object, env)?;
                let idx = self.eval_expr(index, env)?;
                self.get_index(&obj, &idx).map_err(Flow::from)
            }
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
            Expr::Function(lit) => Ok(Value::new(ValueKind::Function(Rc::new(FunctionValue {
                param: lit.param.clone(),
                return_type: lit.return_type.clone(),
                body: Rc::new((*lit.body).clone()),
                closure: env.clone(),
            })))),
            Expr::Oracle(lit) => {
                let mut examples = Vec::with_capacity(lit.examples.len());
                for (arg_expr, result_expr) in &lit.examples {
                    let arg = self.eval_expr(arg_expr, env)?;
                    let result = self.eval_expr(result_expr, env)?;
                    examples.push((arg, result));
                }
                Ok(Value::new(ValueKind::Oracle(Rc::new(OracleValue {
                    param: lit.param.clone(),
                    return_type: lit.return_type.clone(),
                    examples,
                }))))
            }
            Expr::TypeExpr(type_expr) => Ok(Value::new(ValueKind::Type(Rc::new(types::from_type_expr(type_expr))))),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, env),
            Expr::Neg(inner) => self.eval_neg(inner, env),
            Expr::Not(inner) => {
                let v = self.eval_expr(inner, env)?;
                Ok(Value::bool(!v.truthy()))
            }
            Expr::Annotation { text, expr } => {
                let v = self.eval_expr(expr, env)?;
                Ok(v.with_annotation(text.as_str()))
            }
            Expr::If { branches, else_branch } => self.eval_if(branches, else_branch, env),
            Expr::Block(exprs) => {
                let child = Environment::child(env);
                self.eval_block_body(exprs, &child)
            }
            Expr::For { pattern, iter, body } => self.eval_for(pattern, iter, body, env),
            Expr::Return(inner) => {
                let v = self.eval_optional(inner, env)?;
                Err(Flow::Signal(Signal::Return(v)))
            }
            Expr::Break(inner) => {
                let v = self.eval_optional(inner, env)?;
                Err(Flow::Signal(Signal::Break(v)))
            }
            Expr::Continue(inner) => {
                let v = self.eval_optional(inner, env)?;
                Err(Flow::Signal(Signal::Continue(v)))
            }
        }
    }

    fn eval_optional(&self, expr: &Option<Box<Expr>>, env: &Environment) -> EvalResult {
        match expr {
            Some(e) => self.eval_expr(e, env),
            None => Ok(Value::null()),
        }
    }

    pub(crate) fn eval_block_body(&self, exprs: &[Expr], env: &Environment) -> EvalResult {
        let mut last = Value::null();
        for e in exprs {
            last = self.eval_expr(e, env)?;
        }
        Ok(last)
    }

    //--------------------------------------------------------------------------
    // ASSIGNMENT / DESTRUCTURING
    //--------------------------------------------------------------------------

    fn eval_assign(&self, target: &LValue, value_expr: &Expr, env: &Environment) -> EvalResult {
        let value = self.eval_expr(value_expr, env)?;
        match target {
            LValue::Pattern(pattern) => {
                self.bind_pattern(pattern, value.clone(), env, false)?;
                Ok(value)
            }
            LValue::Member { object, name } => {
                let obj = self.eval_expr(object, env)?;
                self.set_member(&obj, name, value.clone())?;
                Ok(value)
            }
            LValue::Index { object, index } => {
                let obj = self.eval_expr(object, env)?;
                let idx = self.eval_expr(index, env)?;
                self.set_index(&obj, &idx, value.clone())?;
                Ok(value)
            }
        }
    }

    /// `always_bind = true` for `let` expressions, where every leaf
    /// introduces regardless of whether it's written `let NAME` or bare
    /// `NAME`. For bare pattern assignment, bare `NAME` leaves reassign and
    /// only `let NAME` leaves introduce.
    fn bind_pattern(&self, pattern: &Pattern, value: Value, env: &Environment, always_bind: bool) -> Result<(), MindError> {
        match pattern {
            Pattern::Binding(name) => {
                env.bind(name.as_str(), value);
                Ok(())
            }
            Pattern::Identifier(name) => {
                if always_bind {
                    env.bind(name.as_str(), value);
                    Ok(())
                } else {
                    env.assign(name, value)
                }
            }
            Pattern::Array(patterns) => {
                let items = match &value.kind {
                    ValueKind::Array(cell) => cell.borrow().clone(),
                    _ => return Err(MindError::value_error("cannot destructure a non-array value as an array pattern", None)),
                };
                if items.len() < patterns.len() {
                    return Err(MindError::value_error(
                        format!("array pattern expects at least {} elements, found {}", patterns.len(), items.len()),
                        None,
                    ));
                }
                for (pat, item) in patterns.iter().zip(items.into_iter()) {
                    self.bind_pattern(pat, item, env, always_bind)?;
                }
                Ok(())
            }
            Pattern::Object(fields) => {
                let map = match &value.kind {
                    ValueKind::Object(cell) => cell.borrow().clone(),
                    _ => return Err(MindError::value_error("cannot destructure a non-object value as an object pattern", None)),
                };
                for field in fields {
                    let item = map
                        .get(field.key.as_str())
                        .cloned()
                        .ok_or_else(|| MindError::value_error(format!("missing field '{}' in object destructure", field.key), None))?;
                    self.bind_pattern(&field.pattern, item, env, always_bind)?;
                }
                Ok(())
            }
        }
    }

    //--------------------------------------------------------------------------
    // MEMBER / INDEX
    //--------------------------------------------------------------------------

    fn get_member(&self, object: &Value, name: &str) -> Result<Value, MindError> {
        match &object.kind {
            ValueKind::Object(fields) => fields
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| MindError::value_error(format!("object has no field '{}'", name), None)),
            _ => Err(MindError::type_error(format!("cannot access member '{}' of a {}", name, object.kind_name()), None)),
        }
    }

    fn set_member(&self, object: &Value, name: &str, value: Value) -> Result<(), MindError> {
        match &object.kind {
            ValueKind::Object(fields) => {
                fields.borrow_mut().insert(Rc::from(name), value);
                Ok(())
            }
            _ => Err(MindError::type_error(format!("cannot assign member '{}' of a {}", name, object.kind_name()), None)),
        }
    }

    fn get_index(&self, object: &Value, index: &Value) -> Result<Value, MindError> {
        match (&object.kind, &index.kind) {
            (ValueKind::Array(items), ValueKind::Int(i)) => {
                let items = items.borrow();
                let idx = bigint_to_index(i, items.len())?;
                Ok(items[idx].clone())
            }
            (ValueKind::Object(fields), ValueKind::Str(key)) => fields
                .borrow()
                .get(key.as_ref())
                .cloned()
                .ok_or_else(|| MindError::value_error(format!("object has no key '{}'", key), None)),
            _ => Err(MindError::type_error("invalid index operation", None)),
        }
    }

    fn set_index(&self, object: &Value, index: &Value, value: Value) -> Result<(), MindError> {
        match (&object.kind, &index.kind) {
            (ValueKind::Array(items), ValueKind::Int(i)) => {
                let mut items = items.borrow_mut();
                let idx = bigint_to_index(i, items.len())?;
                items[idx] = value;
                Ok(())
            }
            (ValueKind::Object(fields), ValueKind::Str(key)) => {
                fields.borrow_mut().insert(Rc::clone(key), value);
                Ok(())
            }
            _ => Err(MindError::type_error("invalid index assignment", None)),
        }
    }

    //--------------------------------------------------------------------------
    // CALL / APPLY
    //--------------------------------------------------------------------------

    fn eval_call(&self, callee: &Expr, args: &[Expr], env: &Environment) -> EvalResult {
        let (mut callee_val, origin) = match callee {
            Expr::Member { object, name } => {
                let obj = self.eval_expr(object, env)?;
                let member = self.get_member(&obj, name).map_err(Flow::from)?;
                (member, ThisBinding::Receiver(obj))
            }
            _ => (self.eval_expr(callee, env)?, ThisBinding::Standalone),
        };
        let mut origin = Some(origin);
        if args.is_empty() {
            // `f()` still performs one application, mirroring the parser's
            // own zero-parameter default (a sentinel `_: Null` parameter).
            return self.apply(callee_val, Value::null(), origin.take().unwrap());
        }
        // `this` is bound (to the receiver, or explicitly to `null` for a
        // non-member callee) only on the first application; once the callee
        // has consumed one argument, every further application in this same
        // call continues the same curried chain.
        for arg_expr in args {
            let arg = self.eval_expr(arg_expr, env)?;
            let binding = origin.take().unwrap_or(ThisBinding::Continuation);
            callee_val = self.apply(callee_val, arg, binding)?;
        }
        Ok(callee_val)
    }

    /// Applies one argument to a callable value: a function (possibly a
    /// member, binding `this`), an oracle (delegating to the adapter), a
    /// partially-applied builtin, or an iterator (advancing its cursor).
    pub fn apply(&self, callee: Value, arg: Value, this_binding: ThisBinding) -> EvalResult {
        match &callee.kind {
            ValueKind::Function(f) => self.apply_function(f, arg, this_binding),
            ValueKind::Oracle(o) => self.apply_oracle(o, arg, callee.annotation.as_deref()),
            ValueKind::Builtin(b) => self.apply_builtin(b, arg),
            ValueKind::Iterator(state) => {
                if !matches!(arg.kind, ValueKind::Null) {
                    return Err(MindError::type_error("iterators are called with null", None).into());
                }
                Ok(advance_iterator(state))
            }
            _ => Err(MindError::type_error(format!("{} is not callable", callee.kind_name()), None).into()),
        }
    }

    fn apply_function(&self, f: &Rc<FunctionValue>, arg: Value, this_binding: ThisBinding) -> EvalResult {
        if let Some(ty_expr) = &f.param.type_annotation {
            let ty = types::from_type_expr(ty_expr);
            if !types::conforms(&arg, &ty) {
                return Err(MindError::type_error(
                    format!("argument to '{}' does not conform to declared type {}", f.param.name, ty),
                    None,
                )
                .into());
            }
        }
        let call_env = Environment::child(&f.closure);
        call_env.bind(f.param.name.as_str(), arg);
        // A receiver binds `this` to itself; a continuation step of the same
        // curried call leaves `this` unbound so lookup falls through to the
        // frame the receiver was actually bound in; any other (standalone)
        // application binds `this` to `null` explicitly, so it can never
        // inherit a `this` left bound by an unrelated enclosing method.
        match this_binding {
            ThisBinding::Receiver(receiver) => call_env.bind("this", receiver),
            ThisBinding::Standalone => call_env.bind("this", Value::null()),
            ThisBinding::Continuation => {}
        }

        let result = match self.eval_expr(&f.body, &call_env) {
            Ok(v) => v,
            Err(Flow::Signal(Signal::Return(v))) => v,
            Err(Flow::Signal(Signal::Break(_))) | Err(Flow::Signal(Signal::Continue(_))) => {
                return Err(MindError::value_error("break/continue used outside of a loop", None).into());
            }
            Err(other) => return Err(other),
        };

        if let Some(ret_expr) = &f.return_type {
            let ret_ty = types::from_type_expr(ret_expr);
            if !types::conforms(&result, &ret_ty) {
                return Err(MindError::type_error(format!("return value does not conform to declared type {}", ret_ty), None).into());
            }
        }
        Ok(result)
    }

    fn apply_oracle(&self, o: &Rc<OracleValue>, arg: Value, annotation: Option<&str>) -> EvalResult {
        let param_ty = o.param.type_annotation.as_ref().map(types::from_type_expr).unwrap_or(Type::Any);
        if !types::conforms(&arg, &param_ty) {
            return Err(MindError::type_error(format!("argument to oracle does not conform to declared type {}", param_ty), None).into());
        }
        let return_ty = o.return_type.as_ref().map(types::from_type_expr).unwrap_or(Type::Any);
        let request = OracleRequest {
            param_type: &param_ty,
            return_type: &return_ty,
            annotation,
            examples: &o.examples,
            argument: &arg,
        };
        tracing::debug!(param = %param_ty, ret = %return_ty, "consulting oracle");
        let result = self.oracle.consult(&request).map_err(|e| MindError::oracle(e.to_string()))?;
        if !types::conforms(&result, &return_ty) {
            return Err(MindError::oracle(format!("oracle returned a value not conforming to declared type {}", return_ty)).into());
        }
        Ok(result)
    }

    fn apply_builtin(&self, b: &Rc<Builtin>, arg: Value) -> EvalResult {
        let mut bound = b.bound.clone();
        bound.push(arg);
        if bound.len() < b.id.arity() {
            return Ok(Value::new(ValueKind::Builtin(Rc::new(Builtin { id: b.id, bound }))));
        }
        crate::builtins::call(self, b.id, &bound)
    }

    //--------------------------------------------------------------------------
    // UNARY / BINARY OPERATORS
    //--------------------------------------------------------------------------

    fn eval_neg(&self, inner: &Expr, env: &Environment) -> EvalResult {
        let v = self.eval_expr(inner, env)?;
        match &v.kind {
            ValueKind::Int(i) => Ok(Value::int(-i.clone())),
            ValueKind::Num(n) => Ok(Value::num(-n)),
            _ => Err(MindError::type_error(format!("cannot negate a {}", v.kind_name()), None).into()),
        }
    }

    fn eval_binary(&self, op: BinaryOp, left: &Expr, right: &Expr, env: &Environment) -> EvalResult {
        // `and`/`or` short-circuit: the right operand is not evaluated unless needed.
        match op {
            BinaryOp::And => {
                let l = self.eval_expr(left, env)?;
                return if l.truthy() { self.eval_expr(right, env) } else { Ok(l) };
            }
            BinaryOp::Or => {
                let l = self.eval_expr(left, env)?;
                return if l.truthy() { Ok(l) } else { self.eval_expr(right, env) };
            }
            _ => {}
        }

        let l = self.eval_expr(left, env)?;
        let r = self.eval_expr(right, env)?;
        match op {
            BinaryOp::Eq => Ok(Value::bool(crate::value::value_eq(&l, &r))),
            BinaryOp::NotEq => Ok(Value::bool(!crate::value::value_eq(&l, &r))),
            BinaryOp::Add => self.eval_add(&l, &r),
            BinaryOp::Sub => numeric_binop(&l, &r, "-", |a, b| a - b, |a, b| a - b),
            BinaryOp::Mul => numeric_binop(&l, &r, "*", |a, b| a * b, |a, b| a * b),
            BinaryOp::Div => self.eval_div(&l, &r),
            BinaryOp::Mod => self.eval_mod(&l, &r),
            BinaryOp::Lt => numeric_compare(&l, &r, |o| o.is_lt()),
            BinaryOp::LtEq => numeric_compare(&l, &r, |o| o.is_le()),
            BinaryOp::Gt => numeric_compare(&l, &r, |o| o.is_gt()),
            BinaryOp::GtEq => numeric_compare(&l, &r, |o| o.is_ge()),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_add(&self, l: &Value, r: &Value) -> EvalResult {
        match (&l.kind, &r.kind) {
            (ValueKind::Str(a), ValueKind::Str(b)) => Ok(Value::str(format!("{}{}", a, b))),
            (ValueKind::Array(a), ValueKind::Array(b)) => {
                let mut out = a.borrow().clone();
                out.extend(b.borrow().iter().cloned());
                Ok(Value::array(out))
            }
            _ => numeric_binop(l, r, "+", |a, b| a + b, |a, b| a + b),
        }
    }

    fn eval_div(&self, l: &Value, r: &Value) -> EvalResult {
        match (&l.kind, &r.kind) {
            (ValueKind::Int(a), ValueKind::Int(b)) => {
                if b == &BigInt::from(0) {
                    return Err(MindError::value_error("division by zero", None).into());
                }
                Ok(Value::num(crate::value::bigint_to_f64(a) / crate::value::bigint_to_f64(b)))
            }
            _ => {
                let (a, b) = coerce_nums(l, r).ok_or_else(|| MindError::type_error("'/' requires numeric operands", None))?;
                if b == 0.0 {
                    return Err(MindError::value_error("division by zero", None).into());
                }
                Ok(Value::num(a / b))
            }
        }
    }

    fn eval_mod(&self, l: &Value, r: &Value) -> EvalResult {
        match (&l.kind, &r.kind) {
            (ValueKind::Int(a), ValueKind::Int(b)) => {
                if b == &BigInt::from(0) {
                    return Err(MindError::value_error("division by zero", None).into());
                }
                Ok(Value::int(a % b))
            }
            _ => {
                let (a, b) = coerce_nums(l, r).ok_or_else(|| MindError::type_error("'%' requires numeric operands", None))?;
                if b == 0.0 {
                    return Err(MindError::value_error("division by zero", None).into());
                }
                Ok(Value::num(a % b))
            }
        }
    }

    fn eval_if(&self, branches: &[crate::ast::Branch], else_branch: &Option<Box<Expr>>, env: &Environment) -> EvalResult {
        self.control_eval_if(branches, else_branch, env)
    }

    fn eval_for(&self, pattern: &Pattern, iter: &Expr, body: &Expr, env: &Environment) -> EvalResult {
        self.control_eval_for(pattern, iter, body, env)
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::int(i.clone()),
        Literal::Num(n) => Value::num(*n),
        Literal::Str(s) => Value::str(s.as_str()),
        Literal::Bool(b) => Value::bool(*b),
        Literal::Null => Value::null(),
    }
}

fn bigint_to_index(i: &BigInt, len: usize) -> Result<usize, MindError> {
    let idx: i64 = i
        .to_i64()
        .ok_or_else(|| MindError::value_error("array index out of range", None))?;
    if idx < 0 || idx as usize >= len {
        return Err(MindError::value_error(format!("array index {} out of range for length {}", idx, len), None));
    }
    Ok(idx as usize)
}

fn coerce_nums(l: &Value, r: &Value) -> Option<(f64, f64)> {
    let a = match &l.kind {
        ValueKind::Int(i) => crate::value::bigint_to_f64(i),
        ValueKind::Num(n) => *n,
        _ => return None,
    };
    let b = match &r.kind {
        ValueKind::Int(i) => crate::value::bigint_to_f64(i),
        ValueKind::Num(n) => *n,
        _ => return None,
    };
    Some((a, b))
}

fn numeric_binop(
    l: &Value,
    r: &Value,
    op_name: &str,
    int_op: impl Fn(&BigInt, &BigInt) -> BigInt,
    num_op: impl Fn(f64, f64) -> f64,
) -> EvalResult {
    match (&l.kind, &r.kind) {
        (ValueKind::Int(a), ValueKind::Int(b)) => Ok(Value::int(int_op(a, b))),
        _ => match coerce_nums(l, r) {
            Some((a, b)) => Ok(Value::num(num_op(a, b))),
            None => Err(MindError::type_error(format!("'{}' requires numeric operands, found {} and {}", op_name, l.kind_name(), r.kind_name()), None).into()),
        },
    }
}

fn numeric_compare(l: &Value, r: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> EvalResult {
    let (a, b) = coerce_nums(l, r).ok_or_else(|| MindError::type_error("comparison requires numeric operands", None))?;
    match a.partial_cmp(&b) {
        Some(ord) => Ok(Value::bool(accept(ord))),
        None => Ok(Value::bool(false)),
    }
}

fn advance_iterator(state: &Rc<RefCell<IteratorState>>) -> Value {
    let mut state = state.borrow_mut();
    match &mut *state {
        IteratorState::Array { items, next } => {
            let items = items.borrow();
            if *next < items.len() {
                let v = items[*next].clone();
                *next += 1;
                v
            } else {
                Value::null()
            }
        }
        IteratorState::Object { pairs, next } => {
            let pairs = pairs.borrow();
            if let Some((k, v)) = pairs.get_index(*next) {
                let pair = Value::array(vec![Value::str(Rc::clone(k)), v.clone()]);
                *next += 1;
                pair
            } else {
                Value::null()
            }
        }
        IteratorState::Range { current, end } => {
            if current < end {
                let v = Value::int(current.clone());
                *current += BigInt::from(1);
                v
            } else {
                Value::null()
            }
        }
    }
}
