//! src/parser.rs

/*******************************************************************************
 *                          RECURSIVE DESCENT PARSER
 *-------------------------------------------------------------------------------
 * Top-down parser mapping each grammar rule to a dedicated `parse_*` method,
 * chained to express operator precedence (low to high): assignment, or, and,
 * equality, comparison, additive, multiplicative, unary, postfix
 * (call/member/index), primary.
 *
 * `[`/`{` are ambiguous between array/object literals and destructuring
 * patterns on the left of `=`. `parse_assignment` resolves this by snapshotting
 * the cursor and attempting a pattern parse first; if that doesn't end in `=`,
 * the cursor is rewound and the literal grammar takes over.
 ******************************************************************************/

use crate::ast::{
    Branch, Expr, FunctionLit, LValue, Literal, ObjectPatternField, ObjectTypeField, OracleLit,
    Param, Pattern, Primitive, Program, TypeExpr,
};
use crate::error::MindError;
use crate::tokens::{Position, Spanned, Token};

pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self { tokens, current: 0 }
    }

    //--------------------------------------------------------------------------
    // PROGRAM
    //--------------------------------------------------------------------------

    /// program = expr { ";" expr } [ ";" ]
    pub fn parse_program(&mut self) -> Result<Program, MindError> {
        let mut expressions = Vec::new();
        while !self.check(&Token::Eof) {
            expressions.push(self.parse_expr()?);
            if !self.match_token(&Token::Semicolon) {
                break;
            }
        }
        self.consume_token(&Token::Eof, "expected end of input")?;
        Ok(Program { expressions })
    }

    fn parse_expr(&mut self) -> Result<Expr, MindError> {
        self.parse_assignment()
    }

    //--------------------------------------------------------------------------
    // ASSIGNMENT (lowest precedence, right-associative)
    //--------------------------------------------------------------------------

    fn parse_assignment(&mut self) -> Result<Expr, MindError> {
        if matches!(self.current_token(), Token::LBracket | Token::LBrace) {
            if let Some(pattern) = self.try_parse_pattern_assignment_lhs() {
                self.consume_token(&Token::Assign, "expected '=' after destructuring pattern")?;
                let value = self.parse_assignment()?;
                return Ok(Expr::Assign { target: LValue::Pattern(pattern), value: Box::new(value) });
            }
        }

        let expr = self.parse_or()?;
        if self.match_token(&Token::Assign) {
            let value = self.parse_assignment()?;
            let target = self.expr_to_lvalue(expr)?;
            return Ok(Expr::Assign { target, value: Box::new(value) });
        }
        Ok(expr)
    }

    fn expr_to_lvalue(&self, expr: Expr) -> Result<LValue, MindError> {
        match expr {
            Expr::Identifier(name) => Ok(LValue::Pattern(Pattern::Identifier(name))),
            Expr::Member { object, name } => Ok(LValue::Member { object, name }),
            Expr::Index { object, index } => Ok(LValue::Index { object, index }),
            _ => Err(MindError::parse("invalid assignment target", self.current_pos())),
        }
    }

    /// Attempts to parse `[`/`{` as a destructuring pattern followed by `=`.
    /// Restores the cursor and returns `None` if that fails, leaving the
    /// literal grammar to try instead.
    fn try_parse_pattern_assignment_lhs(&mut self) -> Option<Pattern> {
        let checkpoint = self.current;
        match self.parse_pattern() {
            Ok(pattern) if self.check(&Token::Assign) => Some(pattern),
            _ => {
                self.current = checkpoint;
                None
            }
        }
    }

    //--------------------------------------------------------------------------
    // BINARY PRECEDENCE CHAIN
    //--------------------------------------------------------------------------

    fn parse_or(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_and()?;
        while self.match_token(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::Binary { op: crate::ast::BinaryOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_equality()?;
        while self.match_token(&Token::And) {
            let right = self.parse_equality()?;
            left = Expr::Binary { op: crate::ast::BinaryOp::And, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current_token() {
                Token::EqEq => crate::ast::BinaryOp::Eq,
                Token::NotEq => crate::ast::BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_token() {
                Token::Lt => crate::ast::BinaryOp::Lt,
                Token::LtEq => crate::ast::BinaryOp::LtEq,
                Token::Gt => crate::ast::BinaryOp::Gt,
                Token::GtEq => crate::ast::BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_token() {
                Token::Plus => crate::ast::BinaryOp::Add,
                Token::Minus => crate::ast::BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, MindError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_token() {
                Token::Star => crate::ast::BinaryOp::Mul,
                Token::Slash => crate::ast::BinaryOp::Div,
                Token::Percent => crate::ast::BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, MindError> {
        match self.current_token() {
            Token::Minus => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Token::Not => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            Token::Hash => {
                self.advance();
                let text = match self.current_token().clone() {
                    Token::Str(s) => {
                        self.advance();
                        s
                    }
                    other => {
                        return Err(MindError::parse(
                            format!("expected annotation text after '#', found {:?}", other),
                            self.current_pos(),
                        ))
                    }
                };
                let expr = self.parse_unary()?;
                Ok(Expr::Annotation { text, expr: Box::new(expr) })
            }
            _ => self.parse_postfix(),
        }
    }

    //--------------------------------------------------------------------------
    // POSTFIX: call / member / index
    //--------------------------------------------------------------------------

    fn parse_postfix(&mut self) -> Result<Expr, MindError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_token() {
                Token::Dot => {
                    self.advance();
                    let name = self.parse_identifier()?;
                    expr = Expr::Member { object: Box::new(expr), name };
                }
                Token::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&Token::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.match_token(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume_token(&Token::RParen, "expected ')' after call arguments")?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.consume_token(&Token::RBracket, "expected ']' after index expression")?;
                    expr = Expr::Index { object: Box::new(expr), index: Box::new(index) };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    //--------------------------------------------------------------------------
    // PRIMARY
    //--------------------------------------------------------------------------

    fn parse_primary(&mut self) -> Result<Expr, MindError> {
        match self.current_token().clone() {
            Token::Int(i) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(i)))
            }
            Token::Num(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Num(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            Token::This => {
                self.advance();
                Ok(Expr::This)
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier(name))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.consume_token(&Token::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            Token::LBracket => self.parse_array_literal(),
            Token::LBrace => self.parse_object_literal(),
            Token::Let => self.parse_let(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::Do => self.parse_block(),
            Token::Return => {
                self.advance();
                Ok(Expr::Return(self.parse_optional_trailing_expr()?))
            }
            Token::Break => {
                self.advance();
                Ok(Expr::Break(self.parse_optional_trailing_expr()?))
            }
            Token::Continue => {
                self.advance();
                Ok(Expr::Continue(self.parse_optional_trailing_expr()?))
            }
            Token::Fun => self.parse_function_literal(),
            Token::Oracle => self.parse_oracle_literal(),
            Token::Type => {
                self.advance();
                Ok(Expr::TypeExpr(self.parse_type_expr()?))
            }
            other => Err(MindError::parse(format!("unexpected token {:?}", other), self.current_pos())),
        }
    }

    /// `return`/`break`/`continue` may be followed by a value expression or
    /// stand bare, in which case they carry an implicit `null`.
    fn parse_optional_trailing_expr(&mut self) -> Result<Option<Box<Expr>>, MindError> {
        if self.starts_expr() {
            Ok(Some(Box::new(self.parse_expr()?)))
        } else {
            Ok(None)
        }
    }

    fn starts_expr(&self) -> bool {
        !matches!(
            self.current_token(),
            Token::End | Token::Eof | Token::Semicolon | Token::Elif | Token::Else | Token::RParen
                | Token::RBracket | Token::RBrace | Token::Comma
        )
    }

    fn parse_array_literal(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::LBracket, "expected '['")?;
        let mut items = Vec::new();
        if !self.check(&Token::RBracket) {
            loop {
                items.push(self.parse_expr()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume_token(&Token::RBracket, "expected ']' after array literal")?;
        Ok(Expr::Array(items))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::LBrace, "expected '{'")?;
        let mut fields = Vec::new();
        if !self.check(&Token::RBrace) {
            loop {
                let key = self.parse_object_key()?;
                self.consume_token(&Token::Colon, "expected ':' after object key")?;
                let value = self.parse_expr()?;
                fields.push((key, value));
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume_token(&Token::RBrace, "expected '}' after object literal")?;
        Ok(Expr::Object(fields))
    }

    fn parse_object_key(&mut self) -> Result<String, MindError> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Str(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(MindError::parse(format!("expected object key, found {:?}", other), self.current_pos())),
        }
    }

    //--------------------------------------------------------------------------
    // LET
    //--------------------------------------------------------------------------

    /// `let` PATTERN `=` expr — every leaf of PATTERN introduces a binding,
    /// regardless of whether the leaf itself is written as a bare identifier
    /// or a nested `let NAME`.
    fn parse_let(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::Let, "expected 'let'")?;
        let pattern = self.parse_pattern()?;
        self.consume_token(&Token::Assign, "expected '=' in let binding")?;
        let value = self.parse_assignment()?;
        Ok(Expr::Let { pattern, value: Box::new(value) })
    }

    /// pattern = "let" IDENT | IDENT | "[" pattern { "," pattern } "]" | "{" key ":" pattern { "," } "}"
    fn parse_pattern(&mut self) -> Result<Pattern, MindError> {
        match self.current_token().clone() {
            Token::Let => {
                self.advance();
                let name = self.parse_identifier()?;
                Ok(Pattern::Binding(name))
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(Pattern::Identifier(name))
            }
            Token::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if !self.check(&Token::RBracket) {
                    loop {
                        elems.push(self.parse_pattern()?);
                        if !self.match_token(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.consume_token(&Token::RBracket, "expected ']' after array pattern")?;
                Ok(Pattern::Array(elems))
            }
            Token::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if !self.check(&Token::RBrace) {
                    loop {
                        let key = self.parse_object_key()?;
                        self.consume_token(&Token::Colon, "expected ':' in object pattern")?;
                        let pattern = self.parse_pattern()?;
                        fields.push(ObjectPatternField { key, pattern });
                        if !self.match_token(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.consume_token(&Token::RBrace, "expected '}' after object pattern")?;
                Ok(Pattern::Object(fields))
            }
            other => Err(MindError::parse(format!("expected pattern, found {:?}", other), self.current_pos())),
        }
    }

    //--------------------------------------------------------------------------
    // IF / FOR / BLOCK
    //--------------------------------------------------------------------------

    /// `if` cond `do` body { `elif` cond `do` body } [ `else` body ] `end`
    fn parse_if(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::If, "expected 'if'")?;
        let mut branches = Vec::new();
        let condition = self.parse_expr()?;
        self.consume_token(&Token::Do, "expected 'do' after if condition")?;
        let body = self.parse_block_body()?;
        branches.push(Branch { condition, body });

        while self.match_token(&Token::Elif) {
            let condition = self.parse_expr()?;
            self.consume_token(&Token::Do, "expected 'do' after elif condition")?;
            let body = self.parse_block_body()?;
            branches.push(Branch { condition, body });
        }

        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_block_body()?))
        } else {
            None
        };

        self.consume_token(&Token::End, "expected 'end' to close if")?;
        Ok(Expr::If { branches, else_branch })
    }

    /// `for` pattern `in` expr `do` body `end`
    fn parse_for(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::For, "expected 'for'")?;
        let pattern = self.parse_pattern()?;
        self.consume_token(&Token::In, "expected 'in' in for loop")?;
        let iter = self.parse_expr()?;
        self.consume_token(&Token::Do, "expected 'do' in for loop")?;
        let body = self.parse_block_body()?;
        self.consume_token(&Token::End, "expected 'end' to close for loop")?;
        Ok(Expr::For { pattern, iter: Box::new(iter), body: Box::new(body) })
    }

    /// `do` body `end`
    fn parse_block(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::Do, "expected 'do'")?;
        let body = self.parse_block_body()?;
        self.consume_token(&Token::End, "expected 'end' to close block")?;
        Ok(body)
    }

    /// A sequence of `;`-separated expressions, wrapped in a `Block` node.
    /// Does not consume the closing keyword (`end`/`else`/`elif`).
    fn parse_block_body(&mut self) -> Result<Expr, MindError> {
        let mut exprs = Vec::new();
        while !matches!(self.current_token(), Token::End | Token::Elif | Token::Else | Token::Eof) {
            exprs.push(self.parse_expr()?);
            if !self.match_token(&Token::Semicolon) {
                break;
            }
        }
        Ok(Expr::Block(exprs))
    }

    //--------------------------------------------------------------------------
    // FUNCTION / ORACLE LITERALS (curried at parse time)
    //--------------------------------------------------------------------------

    fn parse_params(&mut self) -> Result<Vec<Param>, MindError> {
        self.consume_token(&Token::LParen, "expected '(' after 'fun'/'oracle'")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let name = self.parse_identifier()?;
                let type_annotation = if self.match_token(&Token::Colon) {
                    Some(self.parse_type_expr()?)
                } else {
                    None
                };
                params.push(Param { name, type_annotation });
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume_token(&Token::RParen, "expected ')' after parameter list")?;
        if params.is_empty() {
            params.push(Param { name: "_".to_string(), type_annotation: Some(TypeExpr::Primitive(Primitive::Null)) });
        }
        Ok(params)
    }

    fn parse_optional_return_type(&mut self) -> Result<Option<TypeExpr>, MindError> {
        if self.match_token(&Token::Arrow) {
            Ok(Some(self.parse_type_expr()?))
        } else {
            Ok(None)
        }
    }

    /// `fun(p1: T1, …, pn: Tn) -> R do body end`, curried at parse time into
    /// nested single-parameter `FunctionLit`s. Only the innermost carries the
    /// declared return type and body; the outer layers are plain arrows.
    fn parse_function_literal(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::Fun, "expected 'fun'")?;
        let params = self.parse_params()?;
        let return_type = self.parse_optional_return_type()?;
        self.consume_token(&Token::Do, "expected 'do' in function literal")?;
        let body = self.parse_block_body()?;
        self.consume_token(&Token::End, "expected 'end' to close function literal")?;

        let mut curried = FunctionLit { param: params.last().unwrap().clone(), return_type, body: Box::new(body) };
        for param in params[..params.len() - 1].iter().rev() {
            curried = FunctionLit {
                param: param.clone(),
                return_type: None,
                body: Box::new(Expr::Function(curried)),
            };
        }
        Ok(Expr::Function(curried))
    }

    /// `oracle(p1: T1, …) -> R` [`from` examples], curried identically to
    /// function literals: outer curry layers are plain functions that, when
    /// called, evaluate to the next nested oracle literal. Only the
    /// innermost oracle carries the declared return type and examples.
    fn parse_oracle_literal(&mut self) -> Result<Expr, MindError> {
        self.consume_token(&Token::Oracle, "expected 'oracle'")?;
        let params = self.parse_params()?;
        let return_type = self.parse_optional_return_type()?;
        let examples = if self.match_token(&Token::From) {
            self.parse_examples()?
        } else {
            Vec::new()
        };

        let mut expr = Expr::Oracle(OracleLit { param: params.last().unwrap().clone(), return_type, examples });
        for param in params[..params.len() - 1].iter().rev() {
            expr = Expr::Function(FunctionLit { param: param.clone(), return_type: None, body: Box::new(expr) });
        }
        Ok(expr)
    }

    /// Each example is a two-element array literal `[argValue, resultValue]`.
    fn parse_examples(&mut self) -> Result<Vec<(Expr, Expr)>, MindError> {
        self.consume_token(&Token::LBracket, "expected '[' to start oracle examples")?;
        let mut examples = Vec::new();
        if !self.check(&Token::RBracket) {
            loop {
                examples.push(self.parse_example_pair()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume_token(&Token::RBracket, "expected ']' after oracle examples")?;
        Ok(examples)
    }

    fn parse_example_pair(&mut self) -> Result<(Expr, Expr), MindError> {
        self.consume_token(&Token::LBracket, "expected '[' to start an example pair")?;
        let arg = self.parse_expr()?;
        self.consume_token(&Token::Comma, "expected ',' between example argument and result")?;
        let result = self.parse_expr()?;
        self.consume_token(&Token::RBracket, "expected ']' after example pair")?;
        Ok((arg, result))
    }

    //--------------------------------------------------------------------------
    // TYPE EXPRESSIONS
    //--------------------------------------------------------------------------

    /// type_expr = postfix_atom [ "->" type_expr ]
    /// postfix_atom = atom { "?" }    (optional binds tighter than arrow)
    fn parse_type_expr(&mut self) -> Result<TypeExpr, MindError> {
        let left = self.parse_type_postfix_atom()?;
        if self.match_token(&Token::Arrow) {
            let right = self.parse_type_expr()?;
            Ok(TypeExpr::Arrow(Box::new(left), Box::new(right)))
        } else {
            Ok(left)
        }
    }

    fn parse_type_postfix_atom(&mut self) -> Result<TypeExpr, MindError> {
        let mut t = self.parse_type_atom()?;
        while self.match_token(&Token::Question) {
            t = TypeExpr::Optional(Box::new(t));
        }
        Ok(t)
    }

    fn parse_type_atom(&mut self) -> Result<TypeExpr, MindError> {
        match self.current_token().clone() {
            Token::LBracket => {
                self.advance();
                let elem = self.parse_type_expr()?;
                self.consume_token(&Token::RBracket, "expected ']' after array type")?;
                Ok(TypeExpr::Array(Box::new(elem)))
            }
            Token::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if !self.check(&Token::RBrace) {
                    loop {
                        let name = self.parse_identifier()?;
                        let required = self.match_token(&Token::Bang);
                        self.consume_token(&Token::Colon, "expected ':' in object type field")?;
                        let type_expr = self.parse_type_expr()?;
                        fields.push(ObjectTypeField { name, type_expr, required });
                        if !self.match_token(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.consume_token(&Token::RBrace, "expected '}' after object type")?;
                Ok(TypeExpr::Object(fields))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_type_expr()?;
                self.consume_token(&Token::RParen, "expected ')' after parenthesized type")?;
                Ok(inner)
            }
            Token::Identifier(name) => {
                self.advance();
                match name.as_str() {
                    "Null" => Ok(TypeExpr::Primitive(Primitive::Null)),
                    "Bool" => Ok(TypeExpr::Primitive(Primitive::Bool)),
                    "Int" => Ok(TypeExpr::Primitive(Primitive::Int)),
                    "Num" => Ok(TypeExpr::Primitive(Primitive::Num)),
                    "Str" => Ok(TypeExpr::Primitive(Primitive::Str)),
                    "Type" => Ok(TypeExpr::Primitive(Primitive::Type)),
                    "Any" => Ok(TypeExpr::Primitive(Primitive::Any)),
                    "Fun" => Ok(TypeExpr::Fun),
                    "Array" => Ok(TypeExpr::Array(Box::new(TypeExpr::Primitive(Primitive::Any)))),
                    "Object" => Ok(TypeExpr::Object(Vec::new())),
                    "Enum" => self.parse_enum_type(),
                    other => Err(MindError::parse(format!("unknown type name '{}'", other), self.current_pos())),
                }
            }
            other => Err(MindError::parse(format!("expected type expression, found {:?}", other), self.current_pos())),
        }
    }

    /// `Enum(T, [v1, …, vn])`
    fn parse_enum_type(&mut self) -> Result<TypeExpr, MindError> {
        self.consume_token(&Token::LParen, "expected '(' after 'Enum'")?;
        let base = self.parse_type_expr()?;
        self.consume_token(&Token::Comma, "expected ',' in Enum type")?;
        self.consume_token(&Token::LBracket, "expected '[' in Enum value list")?;
        let mut values = Vec::new();
        if !self.check(&Token::RBracket) {
            loop {
                values.push(self.parse_literal_value()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume_token(&Token::RBracket, "expected ']' after Enum value list")?;
        self.consume_token(&Token::RParen, "expected ')' after Enum type")?;
        Ok(TypeExpr::Enum(Box::new(base), values))
    }

    fn parse_literal_value(&mut self) -> Result<Literal, MindError> {
        match self.current_token().clone() {
            Token::Int(i) => {
                self.advance();
                Ok(Literal::Int(i))
            }
            Token::Num(n) => {
                self.advance();
                Ok(Literal::Num(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Literal::Str(s))
            }
            Token::True => {
                self.advance();
                Ok(Literal::Bool(true))
            }
            Token::False => {
                self.advance();
                Ok(Literal::Bool(false))
            }
            Token::Null => {
                self.advance();
                Ok(Literal::Null)
            }
            other => Err(MindError::parse(format!("expected literal value, found {:?}", other), self.current_pos())),
        }
    }

    //--------------------------------------------------------------------------
    // TOKEN UTILITIES
    //--------------------------------------------------------------------------

    fn consume_token(&mut self, expected: &Token, message: &str) -> Result<(), MindError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(MindError::parse(
                format!("{} (found {:?})", message, self.current_token()),
                self.current_pos(),
            ))
        }
    }

    fn parse_identifier(&mut self) -> Result<String, MindError> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(MindError::parse(format!("expected identifier, found {:?}", other), self.current_pos())),
        }
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, expected: &Token) -> bool {
        self.current_token() == expected
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current].node
    }

    fn current_pos(&self) -> Position {
        self.tokens[self.current].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].node.clone();
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        token
    }
}

pub fn parse(tokens: Vec<Spanned<Token>>) -> Result<Program, MindError> {
    Parser::new(tokens).parse_program()
}
