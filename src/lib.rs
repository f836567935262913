//! src/lib.rs

/********************************************************************************
 *                                 MINDSCRIPT
 *-------------------------------------------------------------------------------*
 * A dynamically-typed, expression-oriented scripting language whose
 * defining trait is that formal (deterministic) and informal (oracle-
 * consulting) evaluation are interchangeable at every arrow type: a caller
 * applying a value can't tell, and shouldn't need to, whether the body
 * behind it is a `fun` or an `oracle`.
 *
 * Pipeline: `lexer` turns source text into `tokens`; `parser` builds an
 * `ast`; `interpreter` walks the tree against an `env`, reifying and
 * checking shapes through `types` and producing `value`s. `oracle` is the
 * seam a host implements to answer informal calls; `loader` is the seam a
 * host implements to resolve `import`/`netImport` paths. `builtins` is the
 * fixed seed seeded into every root environment. `error` carries both
 * reportable failures and the `return`/`break`/`continue` unwinds.
 ********************************************************************************/

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod loader;
pub mod oracle;
pub mod parser;
pub mod tokens;
pub mod types;
pub mod value;

pub use env::Environment;
pub use error::{ErrorKind, EvalResult, Flow, MindError, Signal};
pub use interpreter::{Interpreter, ThisBinding};
pub use oracle::{EchoOracle, FailOracle, OracleAdapter, OracleError, OracleRequest};
pub use loader::{FsLoader, HttpLoader, ModuleLoader};
pub use value::Value;

/// Lexes and parses `source` into a `Program`, the unit `Interpreter::eval_program` runs.
pub fn parse_source(source: &str) -> Result<ast::Program, MindError> {
    let tokens = lexer::Lexer::new(source).tokenize()?;
    parser::parse(tokens)
}
