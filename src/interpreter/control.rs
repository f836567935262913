//! src/interpreter/control.rs

/********************************************************************************
 *                          INTERPRETER CONTROL FLOW
 *-------------------------------------------------------------------------------*
 * `if`/`for` evaluation. Both are ordinary expressions: `if` yields the value
 * of whichever branch ran (or `null` if none did), `for` yields the last
 * body value evaluated, or the value carried by `break`, or `null` if the
 * loop never ran. Iteration follows the same null-terminated protocol a
 * builtin iterator exposes: call with `null`, get the next element back, or
 * `null` when exhausted.
 ********************************************************************************/

use crate::ast::{Branch, Expr, Pattern};
use crate::env::Environment;
use crate::error::{EvalResult, Flow, Signal};
use crate::value::{Value, ValueKind};

use super::Interpreter;

impl Interpreter {
    pub(super) fn control_eval_if(
        &self,
        branches: &[Branch],
        else_branch: &Option<Box<Expr>>,
        env: &Environment,
    ) -> EvalResult {
        for branch in branches {
            let cond = self.eval_expr(&branch.condition, env)?;
            if cond.truthy() {
                return self.eval_expr(&branch.body, env);
            }
        }
        match else_branch {
            Some(body) => self.eval_expr(body, env),
            None => Ok(Value::null()),
        }
    }

    pub(super) fn control_eval_for(
        &self,
        pattern: &Pattern,
        iter: &Expr,
        body: &Expr,
        env: &Environment,
    ) -> EvalResult {
        let source = self.eval_expr(iter, env)?;
        let iterator = crate::builtins::call(self, crate::value::BuiltinId::Iter, &[source])?;
        if !iterator.is_callable() {
            return Err(crate::error::MindError::type_error(
                format!("cannot iterate over a {}", iterator.kind_name()),
                None,
            )
            .into());
        }

        let mut last = Value::null();
        loop {
            let item = self.apply(iterator.clone(), Value::null(), super::ThisBinding::Standalone)?;
            if matches!(item.kind, ValueKind::Null) {
                break;
            }
            let loop_env = Environment::child(env);
            self.bind_pattern(pattern, item, &loop_env, true)
                .map_err(Flow::from)?;
            match self.eval_expr(body, &loop_env) {
                Ok(v) => last = v,
                Err(Flow::Signal(Signal::Break(v))) => {
                    last = v;
                    break;
                }
                Err(Flow::Signal(Signal::Continue(v))) => {
                    last = v;
                    continue;
                }
                Err(other) => return Err(other),
            }
        }
        Ok(last)
    }
}
