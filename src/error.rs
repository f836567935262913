//! src/error.rs

/****************************************************************************
 *                               ERROR MODULE
 *--------------------------------------------------------------------------
 * Defines `MindError`, the single error type threaded through lexing,
 * parsing, and evaluation, along with the non-local control-flow unwinds
 * (`Signal`/`Flow`) the interpreter uses for `return`/`break`/`continue`.
 *
 * `MindError` carries a `ErrorKind` drawn from the seven-way taxonomy the
 * language defines (lex/parse/name/type/value/oracle/internal) plus an
 * optional source `Position`, so every failure mode in the language can be
 * reported uniformly regardless of which stage raised it.
 ****************************************************************************/

use std::fmt;

use crate::tokens::Position;
use crate::value::Value;

/// The seven error kinds the language distinguishes. These are kinds, not
/// Rust types: every one of them is carried by the single `MindError` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("LexError")]
    Lex,
    #[error("ParseError")]
    Parse,
    #[error("NameError")]
    Name,
    #[error("TypeError")]
    Type,
    #[error("ValueError")]
    Value,
    #[error("OracleError")]
    Oracle,
    #[error("InternalError")]
    Internal,
}

/// A single error carrying its kind, a human-readable message, and the
/// source position it occurred at (when known — some internal errors have
/// no meaningful position).
#[derive(Debug, Clone, PartialEq)]
pub struct MindError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Option<Position>,
}

impl MindError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Option<Position>) -> Self {
        Self { kind, message: message.into(), position }
    }

    pub fn lex(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Lex, message, Some(position))
    }

    pub fn parse(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Parse, message, Some(position))
    }

    pub fn name(message: impl Into<String>, position: Option<Position>) -> Self {
        Self::new(ErrorKind::Name, message, position)
    }

    pub fn type_error(message: impl Into<String>, position: Option<Position>) -> Self {
        Self::new(ErrorKind::Type, message, position)
    }

    pub fn value_error(message: impl Into<String>, position: Option<Position>) -> Self {
        Self::new(ErrorKind::Value, message, position)
    }

    pub fn oracle(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Oracle, message, None)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message, None)
    }
}

impl fmt::Display for MindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(pos) = &self.position {
            write!(f, " at {}", pos)?;
        }
        Ok(())
    }
}

impl std::error::Error for MindError {}

/// Non-local exits a function/loop body can unwind through. These propagate
/// alongside `MindError` in `Flow`, rather than as Rust panics, keeping the
/// evaluator a single recursive function with one failure channel.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Break(Value),
    Continue(Value),
}

/// The unwind channel for `eval_expr`: either a language-level control
/// transfer (`return`/`break`/`continue`) or a reportable `MindError`.
#[derive(Debug, Clone)]
pub enum Flow {
    Signal(Signal),
    Error(MindError),
}

impl From<MindError> for Flow {
    fn from(e: MindError) -> Self {
        Flow::Error(e)
    }
}

/// The result type every evaluation step returns.
pub type EvalResult = Result<Value, Flow>;
