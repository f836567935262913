//! src/oracle.rs

/********************************************************************************
 *                              ORACLE MODULE
 *-------------------------------------------------------------------------------*
 * The abstract capability an oracle value delegates to. `OracleAdapter` is the
 * single seam between the deterministic core and whatever informal process
 * (a language model, a human, a stub) answers an oracle call; the core
 * contains no prompt templates and enforces conformance of whatever the
 * adapter returns.
 ********************************************************************************/

use crate::types::Type;
use crate::value::Value;

/// Everything an adapter needs to answer one oracle call: its declared
/// shape, any worked examples the literal carried, the informal annotation
/// (if the oracle value was tagged with `#`), and the concrete argument.
pub struct OracleRequest<'a> {
    pub param_type: &'a Type,
    pub return_type: &'a Type,
    pub annotation: Option<&'a str>,
    pub examples: &'a [(Value, Value)],
    pub argument: &'a Value,
}

#[derive(Debug, Clone)]
pub struct OracleError {
    pub message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for OracleError {}

pub trait OracleAdapter {
    fn consult(&self, request: &OracleRequest) -> Result<Value, OracleError>;
}

/// A deterministic adapter with no model behind it: returns the declared
/// result of the first example whose argument equals the call's argument,
/// otherwise the base value of the declared return type. Useful for tests
/// and as a default when no adapter is configured; not a model backend.
pub struct EchoOracle;

impl OracleAdapter for EchoOracle {
    fn consult(&self, request: &OracleRequest) -> Result<Value, OracleError> {
        for (arg, result) in request.examples {
            if crate::value::value_eq(arg, request.argument) {
                return Ok(result.clone());
            }
        }
        base_value(request.return_type)
            .ok_or_else(|| OracleError::new(format!("EchoOracle has no base value for {}", request.return_type)))
    }
}

/// An adapter that always refuses, useful for exercising `OracleError`
/// propagation from the CLI (`--oracle fail`).
pub struct FailOracle;

impl OracleAdapter for FailOracle {
    fn consult(&self, _request: &OracleRequest) -> Result<Value, OracleError> {
        Err(OracleError::new("oracle consultation disabled"))
    }
}

fn base_value(ty: &Type) -> Option<Value> {
    match ty {
        Type::Null => Some(Value::null()),
        Type::Bool => Some(Value::bool(false)),
        Type::Int => Some(Value::int(num_bigint::BigInt::from(0))),
        Type::Num => Some(Value::num(0.0)),
        Type::Str => Some(Value::str("")),
        Type::Any => Some(Value::null()),
        Type::Array(_) => Some(Value::array(Vec::new())),
        Type::Object(_) => Some(Value::object(indexmap::IndexMap::new())),
        Type::Optional(_) => Some(Value::null()),
        Type::Enum(_, values) => values.first().map(|lit| crate::builtins::literal_to_value(lit)),
        Type::Fun | Type::Arrow(_, _) | Type::Type => None,
    }
}
