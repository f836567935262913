//! src/types.rs

/********************************************************************************
 *                               TYPE MODULE
 *-------------------------------------------------------------------------------*
 * The structural type system: reified `Type` terms and the two core
 * operations over them, `type_of` and `is_subtype`. Types are plain data
 * (no interning, no unification) — MindScript has no static inference, so a
 * `Type` only ever exists because a program wrote one down or `typeOf`
 * reified one from a runtime value.
 ********************************************************************************/

use std::fmt;

use crate::ast::{self, Literal};
use crate::value::{Value, ValueKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Null,
    Bool,
    Int,
    Num,
    Str,
    Type,
    Any,
    /// Top of all arrows; not expressible as a concrete `Arrow` because
    /// contravariance in the parameter position has no top element there.
    Fun,
    Array(Box<Type>),
    Object(Vec<ObjectField>),
    Arrow(Box<Type>, Box<Type>),
    Optional(Box<Type>),
    Enum(Box<Type>, Vec<Literal>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub ty: Type,
    pub required: bool,
}

impl Type {
    pub fn optional(self) -> Type {
        match self {
            Type::Optional(_) => self,
            other => Type::Optional(Box::new(other)),
        }
    }
}

/// Reifies a `TypeExpr` parsed from a `type ...` form into a runtime `Type`
/// term. Infallible: the grammar only produces well-formed type expressions.
pub fn from_type_expr(expr: &ast::TypeExpr) -> Type {
    match expr {
        ast::TypeExpr::Primitive(ast::Primitive::Null) => Type::Null,
        ast::TypeExpr::Primitive(ast::Primitive::Bool) => Type::Bool,
        ast::TypeExpr::Primitive(ast::Primitive::Int) => Type::Int,
        ast::TypeExpr::Primitive(ast::Primitive::Num) => Type::Num,
        ast::TypeExpr::Primitive(ast::Primitive::Str) => Type::Str,
        ast::TypeExpr::Primitive(ast::Primitive::Type) => Type::Type,
        ast::TypeExpr::Primitive(ast::Primitive::Any) => Type::Any,
        ast::TypeExpr::Fun => Type::Fun,
        ast::TypeExpr::Array(elem) => Type::Array(Box::new(from_type_expr(elem))),
        ast::TypeExpr::Object(fields) => Type::Object(
            fields
                .iter()
                .map(|f| ObjectField {
                    name: f.name.clone(),
                    ty: from_type_expr(&f.type_expr),
                    required: f.required,
                })
                .collect(),
        ),
        ast::TypeExpr::Arrow(param, ret) => {
            Type::Arrow(Box::new(from_type_expr(param)), Box::new(from_type_expr(ret)))
        }
        ast::TypeExpr::Optional(inner) => from_type_expr(inner).optional(),
        ast::TypeExpr::Enum(base, values) => {
            Type::Enum(Box::new(from_type_expr(base)), values.clone())
        }
    }
}

/// `typeOf(v)`: the most precise type term describing a runtime value.
pub fn type_of(value: &Value) -> Type {
    match &value.kind {
        ValueKind::Null => Type::Null,
        ValueKind::Bool(_) => Type::Bool,
        ValueKind::Int(_) => Type::Int,
        ValueKind::Num(_) => Type::Num,
        ValueKind::Str(_) => Type::Str,
        ValueKind::Array(items) => {
            let items = items.borrow();
            if items.is_empty() {
                Type::Array(Box::new(Type::Any))
            } else {
                let mut elem = type_of(&items[0]);
                for item in items.iter().skip(1) {
                    elem = least_upper_bound(&elem, &type_of(item));
                }
                Type::Array(Box::new(elem))
            }
        }
        ValueKind::Object(fields) => {
            let fields = fields.borrow();
            Type::Object(
                fields
                    .iter()
                    .map(|(k, v)| ObjectField {
                        name: k.to_string(),
                        ty: type_of(v),
                        required: true,
                    })
                    .collect(),
            )
        }
        ValueKind::Function(f) => {
            let param_ty = f
                .param
                .type_annotation
                .as_ref()
                .map(from_type_expr)
                .unwrap_or(Type::Any);
            let ret_ty = f.return_type.as_ref().map(from_type_expr).unwrap_or(Type::Any);
            Type::Arrow(Box::new(param_ty), Box::new(ret_ty))
        }
        ValueKind::Oracle(o) => {
            let param_ty = o
                .param
                .type_annotation
                .as_ref()
                .map(from_type_expr)
                .unwrap_or(Type::Any);
            let ret_ty = o.return_type.as_ref().map(from_type_expr).unwrap_or(Type::Any);
            Type::Arrow(Box::new(param_ty), Box::new(ret_ty))
        }
        ValueKind::Builtin(_) => Type::Fun,
        ValueKind::Type(_) => Type::Type,
    }
}

/// Least upper bound used to infer an array literal's element type: the
/// tightest type both `a` and `b` are subtypes of. Falls back to `Any` when
/// neither side is a subtype of the other (no true join is computed).
fn least_upper_bound(a: &Type, b: &Type) -> Type {
    if is_subtype(a, b) {
        b.clone()
    } else if is_subtype(b, a) {
        a.clone()
    } else {
        Type::Any
    }
}

/// `isSubtype(a, b)`: structural subtyping per the rules in the language's
/// type system. Recursive, terminating because every recursive call strictly
/// decreases the term size of at least one side.
pub fn is_subtype(a: &Type, b: &Type) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (_, Type::Any) => true,
        (Type::Int, Type::Num) => true,
        (Type::Array(ea), Type::Array(eb)) => is_subtype(ea, eb),
        (Type::Object(fa), Type::Object(fb)) => fb.iter().all(|field_b| {
            match fa.iter().find(|field_a| field_a.name == field_b.name) {
                Some(field_a) => {
                    is_subtype(&field_a.ty, &field_b.ty) && (!field_b.required || field_a.required)
                }
                None => !field_b.required,
            }
        }),
        (Type::Arrow(pa, ra), Type::Arrow(pb, rb)) => is_subtype(pb, pa) && is_subtype(ra, rb),
        (Type::Arrow(_, _), Type::Fun) => true,
        (Type::Optional(ia), Type::Optional(ib)) => is_subtype(ia, ib),
        (Type::Null, Type::Optional(_)) => true,
        (_, Type::Optional(ib)) => is_subtype(a, ib),
        (Type::Enum(base, values), Type::Enum(other_base, other_values)) => {
            is_subtype(base, other_base) && values.iter().all(|v| other_values.contains(v))
        }
        (Type::Enum(base, _), _) => is_subtype(base, b),
        _ => false,
    }
}

/// Whether a concrete value conforms to a declared type. Identical to
/// `isSubtype(typeOf(value), ty)` except at enums, which are checked by set
/// membership against the value itself rather than by subtyping `typeOf`.
pub fn conforms(value: &Value, ty: &Type) -> bool {
    match ty {
        Type::Enum(base, values) => {
            values.iter().any(|lit| literal_equals_value(lit, value)) && conforms(value, base)
        }
        Type::Optional(inner) => matches!(value.kind, ValueKind::Null) || conforms(value, inner),
        _ => is_subtype(&type_of(value), ty),
    }
}

fn literal_equals_value(lit: &Literal, value: &Value) -> bool {
    match (lit, &value.kind) {
        (Literal::Null, ValueKind::Null) => true,
        (Literal::Bool(a), ValueKind::Bool(b)) => a == b,
        (Literal::Int(a), ValueKind::Int(b)) => a == b,
        (Literal::Num(a), ValueKind::Num(b)) => a == b,
        (Literal::Int(a), ValueKind::Num(b)) => crate::value::bigint_to_f64(a) == *b,
        (Literal::Str(a), ValueKind::Str(b)) => a.as_str() == b.as_ref(),
        _ => false,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "Null"),
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Num => write!(f, "Num"),
            Type::Str => write!(f, "Str"),
            Type::Type => write!(f, "Type"),
            Type::Any => write!(f, "Any"),
            Type::Fun => write!(f, "Fun"),
            Type::Array(elem) => write!(f, "[{}]", elem),
            Type::Object(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}{}: {}", field.name, if field.required { "!" } else { "" }, field.ty)?;
                }
                write!(f, "}}")
            }
            Type::Arrow(param, ret) => write!(f, "{} -> {}", param, ret),
            Type::Optional(inner) => write!(f, "{}?", inner),
            Type::Enum(base, values) => {
                write!(f, "Enum({}, [", base)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", literal_display(v))?;
                }
                write!(f, "])")
            }
        }
    }
}

fn literal_display(lit: &Literal) -> String {
    match lit {
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Num(n) => n.to_string(),
        Literal::Str(s) => format!("\"{}\"", s),
    }
}
