//! src/env.rs

/********************************************************************************
 *                             ENVIRONMENT MODULE
 *-------------------------------------------------------------------------------*
 * Lexical scoping: a chain of frames, each an ordered mapping from name to
 * an assignable cell. Lookup walks from the innermost frame outward.
 * Closures capture the `Environment` (a frame handle) in which their
 * literal was evaluated, not a copy of its bindings, so assignments made
 * after a closure is created are visible to it.
 ********************************************************************************/

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::MindError;
use crate::value::Value;

/// An assignable slot. Shared by every closure that captured the frame
/// holding it, so one closure's assignment is visible to all others sharing
/// that frame.
pub type Cell = Rc<RefCell<Value>>;

pub struct Frame {
    bindings: IndexMap<Rc<str>, Cell>,
    parent: Option<Environment>,
}

/// A handle to a frame. Cloning an `Environment` clones the `Rc`, not the
/// frame; two clones see the same bindings.
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Frame>>);

impl Environment {
    pub fn root() -> Self {
        Environment(Rc::new(RefCell::new(Frame { bindings: IndexMap::new(), parent: None })))
    }

    pub fn child(parent: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(Frame {
            bindings: IndexMap::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// Introduces a fresh cell in this frame, shadowing any outer binding of
    /// the same name. Used by `let NAME` leaves.
    pub fn bind(&self, name: impl Into<Rc<str>>, value: Value) {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.into(), Rc::new(RefCell::new(value)));
    }

    /// Rebinds the nearest existing cell named `name`. Fails with a
    /// `NameError` if no such cell exists anywhere in the chain.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), MindError> {
        match self.lookup_cell(name) {
            Some(cell) => {
                *cell.borrow_mut() = value;
                Ok(())
            }
            None => Err(MindError::name(format!("undefined name '{}'", name), None)),
        }
    }

    pub fn get(&self, name: &str) -> Result<Value, MindError> {
        self.lookup_cell(name)
            .map(|cell| cell.borrow().clone())
            .ok_or_else(|| MindError::name(format!("undefined name '{}'", name), None))
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup_cell(name).is_some()
    }

    fn lookup_cell(&self, name: &str) -> Option<Cell> {
        let frame = self.0.borrow();
        if let Some(cell) = frame.bindings.get(name) {
            return Some(Rc::clone(cell));
        }
        frame.parent.as_ref().and_then(|p| p.lookup_cell(name))
    }

    /// Snapshot of every binding visible from this frame (innermost wins on
    /// name collision), used by the `getEnv` builtin.
    pub fn snapshot(&self) -> IndexMap<Rc<str>, Value> {
        let mut out = IndexMap::new();
        self.snapshot_into(&mut out);
        out
    }

    /// Snapshot of only this frame's own bindings, ignoring any parent
    /// frame. Used by `import`/`netImport` to expose a module's top-level
    /// bindings without also re-exporting the root's builtins.
    pub fn local_snapshot(&self) -> IndexMap<Rc<str>, Value> {
        self.0.borrow().bindings.iter().map(|(k, cell)| (Rc::clone(k), cell.borrow().clone())).collect()
    }

    fn snapshot_into(&self, out: &mut IndexMap<Rc<str>, Value>) {
        let frame = self.0.borrow();
        if let Some(parent) = &frame.parent {
            parent.snapshot_into(out);
        }
        for (name, cell) in frame.bindings.iter() {
            out.insert(Rc::clone(name), cell.borrow().clone());
        }
    }
}
