//! tests/parser.rs

use mindscript::ast::{
    Branch, Expr, FunctionLit, LValue, Literal, ObjectPatternField, Param, Pattern, Primitive,
    Program, TypeExpr,
};
use mindscript::lexer::Lexer;
use mindscript::parser::parse;
use mindscript::{ErrorKind, MindError};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn parse_input(input: &str) -> Program {
    let tokens = Lexer::new(input).tokenize().expect("failed to tokenize input");
    parse(tokens).expect("failed to parse input")
}

fn parse_err(input: &str) -> MindError {
    let tokens = Lexer::new(input).tokenize().expect("failed to tokenize input");
    parse(tokens).expect_err("expected a parse error")
}

/// Tests parsing of a `let` binding followed by a use of the bound name.
#[test]
fn test_let_binding_with_trailing_use() {
    // Arrange
    let input = "let x = 42; x";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![
                Expr::Let {
                    pattern: Pattern::Identifier("x".to_string()),
                    value: Box::new(Expr::Literal(Literal::Int(BigInt::from(42)))),
                },
                Expr::Identifier("x".to_string()),
            ],
        }
    );
}

/// Tests parsing of an `if`/`else` expression with `do`/`end` delimiters.
#[test]
fn test_if_else_expression() {
    // Arrange
    let input = "if x > 0 do 1 else 2 end";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::If {
                branches: vec![Branch {
                    condition: Expr::Binary {
                        op: mindscript::ast::BinaryOp::Gt,
                        left: Box::new(Expr::Identifier("x".to_string())),
                        right: Box::new(Expr::Literal(Literal::Int(BigInt::from(0)))),
                    },
                    body: Expr::Block(vec![Expr::Literal(Literal::Int(BigInt::from(1)))]),
                }],
                else_branch: Some(Box::new(Expr::Block(vec![Expr::Literal(Literal::Int(BigInt::from(2)))]))),
            }],
        }
    );
}

/// Tests parsing of an `if`/`elif`/`else` chain collects one branch per arm.
#[test]
fn test_if_elif_else_collects_all_branches() {
    // Arrange
    let input = "if a do 1 elif b do 2 else 3 end";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::If { branches, else_branch } => {
            assert_eq!(branches.len(), 2);
            assert!(else_branch.is_some());
        }
        other => panic!("expected an If expression, got {:?}", other),
    }
}

/// Tests parsing of a single-parameter function literal with a type
/// annotation and an arithmetic body.
#[test]
fn test_function_literal_single_param() {
    // Arrange
    let input = "fun (x: Int) do x + 1 end";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Function(FunctionLit {
                param: Param { name: "x".to_string(), type_annotation: Some(TypeExpr::Primitive(Primitive::Int)) },
                return_type: None,
                body: Box::new(Expr::Block(vec![Expr::Binary {
                    op: mindscript::ast::BinaryOp::Add,
                    left: Box::new(Expr::Identifier("x".to_string())),
                    right: Box::new(Expr::Literal(Literal::Int(BigInt::from(1)))),
                }])),
            })],
        }
    );
}

/// Tests that a multi-parameter function literal is curried at parse time
/// into nested single-parameter `FunctionLit`s, with only the innermost
/// carrying the body.
#[test]
fn test_function_literal_curries_multiple_params() {
    // Arrange
    let input = "fun (x: Int, y: Int) -> Int do x + y end";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::Function(outer) => {
            assert_eq!(outer.param.name, "x");
            assert_eq!(outer.return_type, None);
            match outer.body.as_ref() {
                Expr::Function(inner) => {
                    assert_eq!(inner.param.name, "y");
                    assert_eq!(inner.return_type, Some(TypeExpr::Primitive(Primitive::Int)));
                }
                other => panic!("expected a nested Function, got {:?}", other),
            }
        }
        other => panic!("expected a Function, got {:?}", other),
    }
}

/// Tests parsing of an `oracle` literal with a worked example.
#[test]
fn test_oracle_literal_with_examples() {
    // Arrange
    let input = "oracle (x: Int) -> Bool from [[1, true]]";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::Oracle(lit) => {
            assert_eq!(lit.param.name, "x");
            assert_eq!(lit.return_type, Some(TypeExpr::Primitive(Primitive::Bool)));
            assert_eq!(lit.examples.len(), 1);
            assert_eq!(lit.examples[0].0, Expr::Literal(Literal::Int(BigInt::from(1))));
            assert_eq!(lit.examples[0].1, Expr::Literal(Literal::Bool(true)));
        }
        other => panic!("expected an Oracle, got {:?}", other),
    }
}

/// Tests parsing of a `for` loop over an array literal.
#[test]
fn test_for_loop_over_array() {
    // Arrange
    let input = "for x in [1, 2, 3] do print(x) end";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::For { pattern, iter, body } => {
            assert_eq!(*pattern, Pattern::Identifier("x".to_string()));
            assert_eq!(
                **iter,
                Expr::Array(vec![
                    Expr::Literal(Literal::Int(BigInt::from(1))),
                    Expr::Literal(Literal::Int(BigInt::from(2))),
                    Expr::Literal(Literal::Int(BigInt::from(3))),
                ])
            );
            match body.as_ref() {
                Expr::Block(exprs) => assert_eq!(exprs.len(), 1),
                other => panic!("expected a Block body, got {:?}", other),
            }
        }
        other => panic!("expected a For expression, got {:?}", other),
    }
}

/// Tests parsing of a call expression chained onto a member access.
#[test]
fn test_member_call_chain() {
    // Arrange
    let input = "obj.method(1, 2)";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Call {
                callee: Box::new(Expr::Member { object: Box::new(Expr::Identifier("obj".to_string())), name: "method".to_string() }),
                args: vec![Expr::Literal(Literal::Int(BigInt::from(1))), Expr::Literal(Literal::Int(BigInt::from(2)))],
            }],
        }
    );
}

/// Tests parsing of an index expression following an array literal.
#[test]
fn test_index_expression() {
    // Arrange
    let input = "[1, 2, 3][0]";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Index {
                object: Box::new(Expr::Array(vec![
                    Expr::Literal(Literal::Int(BigInt::from(1))),
                    Expr::Literal(Literal::Int(BigInt::from(2))),
                    Expr::Literal(Literal::Int(BigInt::from(3))),
                ])),
                index: Box::new(Expr::Literal(Literal::Int(BigInt::from(0)))),
            }],
        }
    );
}

/// Tests parsing of a destructuring array-pattern assignment.
#[test]
fn test_array_pattern_assignment() {
    // Arrange
    let input = "[a, let b] = [1, 2]";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Assign {
                target: LValue::Pattern(Pattern::Array(vec![
                    Pattern::Identifier("a".to_string()),
                    Pattern::Binding("b".to_string()),
                ])),
                value: Box::new(Expr::Array(vec![
                    Expr::Literal(Literal::Int(BigInt::from(1))),
                    Expr::Literal(Literal::Int(BigInt::from(2))),
                ])),
            }],
        }
    );
}

/// Tests parsing of a destructuring object pattern inside a `let`.
#[test]
fn test_let_with_object_pattern() {
    // Arrange
    let input = "let {a: a, b: let c} = obj";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Let {
                pattern: Pattern::Object(vec![
                    ObjectPatternField { key: "a".to_string(), pattern: Pattern::Identifier("a".to_string()) },
                    ObjectPatternField { key: "b".to_string(), pattern: Pattern::Binding("c".to_string()) },
                ]),
                value: Box::new(Expr::Identifier("obj".to_string())),
            }],
        }
    );
}

/// Tests that a member assignment target is recognized without `let`.
#[test]
fn test_member_assignment() {
    // Arrange
    let input = "obj.field = 1";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Assign {
                target: LValue::Member { object: Box::new(Expr::Identifier("obj".to_string())), name: "field".to_string() },
                value: Box::new(Expr::Literal(Literal::Int(BigInt::from(1)))),
            }],
        }
    );
}

/// Tests operator precedence: `and`/`or` bind looser than arithmetic and
/// comparison, matching a left-to-right chain of binary nodes.
#[test]
fn test_logical_precedence_over_arithmetic() {
    // Arrange
    let input = "a + b and f(x) or c * d";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::Binary { op: mindscript::ast::BinaryOp::Or, left, right } => {
            match left.as_ref() {
                Expr::Binary { op: mindscript::ast::BinaryOp::And, .. } => {}
                other => panic!("expected the left side to be an And node, got {:?}", other),
            }
            match right.as_ref() {
                Expr::Binary { op: mindscript::ast::BinaryOp::Mul, .. } => {}
                other => panic!("expected the right side to be a Mul node, got {:?}", other),
            }
        }
        other => panic!("expected a top-level Or node, got {:?}", other),
    }
}

/// Tests parsing of an annotation attached to an expression.
#[test]
fn test_annotation_expression() {
    // Arrange
    let input = r#"# "a running total" x + 1"#;

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![Expr::Annotation {
                text: "a running total".to_string(),
                expr: Box::new(Expr::Binary {
                    op: mindscript::ast::BinaryOp::Add,
                    left: Box::new(Expr::Identifier("x".to_string())),
                    right: Box::new(Expr::Literal(Literal::Int(BigInt::from(1)))),
                }),
            }],
        }
    );
}

/// Tests parsing of an arrow type expression used in a parameter annotation.
#[test]
fn test_arrow_type_in_parameter() {
    // Arrange
    let input = "fun (f: Int -> Bool) do f(1) end";

    // Act
    let program = parse_input(input);

    // Assert
    match &program.expressions[0] {
        Expr::Function(lit) => assert_eq!(
            lit.param.type_annotation,
            Some(TypeExpr::Arrow(Box::new(TypeExpr::Primitive(Primitive::Int)), Box::new(TypeExpr::Primitive(Primitive::Bool)))),
        ),
        other => panic!("expected a Function, got {:?}", other),
    }
}

/// Tests that an empty source text parses to a program with no expressions.
#[test]
fn test_empty_program_has_no_expressions() {
    // Arrange
    let tokens = Lexer::new("").tokenize().unwrap();

    // Act
    let result = parse(tokens);

    // Assert
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), Program { expressions: vec![] });
}

/// Tests that an unterminated `if` (missing `end`) is reported as a parse error.
#[test]
fn test_missing_end_is_parse_error() {
    // Arrange / Act
    let err = parse_err("if x do 1");

    // Assert
    assert_eq!(err.kind, ErrorKind::Parse);
}

/// Tests that a semicolon-separated sequence of top-level expressions
/// parses into a flat `Program`, not a nested block.
#[test]
fn test_top_level_sequence_is_flat() {
    // Arrange
    let input = "1; 2; 3";

    // Act
    let program = parse_input(input);

    // Assert
    assert_eq!(
        program,
        Program {
            expressions: vec![
                Expr::Literal(Literal::Int(BigInt::from(1))),
                Expr::Literal(Literal::Int(BigInt::from(2))),
                Expr::Literal(Literal::Int(BigInt::from(3))),
            ],
        }
    );
}
