//! Expression parsing implementation
//!
//! This module handles parsing of HypnoScript expressions using one method per
//! precedence level and recursive descent for the remaining forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, `true`/`false`, arrays `[a, b]`
//! - Record literals: `Person { name: "Alice", age: 30 }`
//! - Identifiers and assignments to identifiers, fields and indices
//! - Binary operators: arithmetic, comparison, equality, `&&`, `||`
//! - Unary operators: `!`, `-`, `+`
//! - Postfix: calls `f(x)`, field access `a.b`, indexing `a[i]`
//!
//! # Precedence (lowest to highest)
//!
//! ```text
//! assignment → || → && → equality → comparison → additive → multiplicative
//!            → unary → postfix → primary
//! ```
//!
//! Hypnotic synonyms (`youAreFeelingVerySleepy`, `lookAtTheWatch`, ...) are
//! folded onto the canonical [`BinaryOp`] here, so later stages never see them.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_logical_or()?;

        let loc = self.current_location();
        if self.match_token(TokenKind::Assign) {
            if !matches!(
                expr,
                Expr::Identifier(..) | Expr::FieldAccess { .. } | Expr::Index { .. }
            ) {
                return Err(ParseError::new("Invalid assignment target", expr.location()));
            }
            let value = Box::new(self.parse_assignment()?);
            return Ok(Expr::Assign {
                target: Box::new(expr),
                value,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.check(TokenKind::OrOr) {
            let loc = self.advance().location;
            let right = self.parse_logical_and()?;
            left = binary(BinaryOp::Or, left, right, loc);
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.check(TokenKind::AndAnd) {
            let loc = self.advance().location;
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right, loc);
        }

        Ok(left)
    }

    /// Parse equality (==, !=, youAreFeelingVerySleepy, notSoDeep)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq | TokenKind::YouAreFeelingVerySleepy => BinaryOp::Eq,
                TokenKind::NotEq | TokenKind::NotSoDeep => BinaryOp::Ne,
                _ => break,
            };
            let loc = self.advance().location;
            let right = self.parse_comparison()?;
            left = binary(op, left, right, loc);
        }

        Ok(left)
    }

    /// Parse comparison (<, <=, >, >= and their synonyms)
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Lt | TokenKind::FallUnderMySpell => BinaryOp::Lt,
                TokenKind::Le | TokenKind::DeeplyLess => BinaryOp::Le,
                TokenKind::Gt | TokenKind::LookAtTheWatch => BinaryOp::Gt,
                TokenKind::Ge | TokenKind::DeeplyGreater => BinaryOp::Ge,
                _ => break,
            };
            let loc = self.advance().location;
            let right = self.parse_additive()?;
            left = binary(op, left, right, loc);
        }

        Ok(left)
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let loc = self.advance().location;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right, loc);
        }

        Ok(left)
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let loc = self.advance().location;
            let right = self.parse_unary()?;
            left = binary(op, left, right, loc);
        }

        Ok(left)
    }

    /// Parse unary (!, -, +)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        let loc = self.advance().location;
        let operand = Box::new(self.parse_unary()?);

        Ok(Expr::Unary {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix: calls, field access, indexing
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();
            if self.match_token(TokenKind::LParen) {
                let args = self.parse_arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else if self.match_token(TokenKind::Dot) {
                let field = self.expect_identifier("after '.'")?;
                expr = Expr::FieldAccess {
                    object: Box::new(expr),
                    field,
                    location: loc,
                };
            } else if self.match_token(TokenKind::LBracket) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(TokenKind::RBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index,
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Call arguments; the opening '(' is already consumed
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    /// Parse primary expression (literals, identifiers, parenthesized)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let loc = token.location;

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    ParseError::new(format!("Invalid number literal: {}", token.lexeme), loc)
                })?;
                Ok(Expr::Number(value, loc))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::String(token.lexeme, loc))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Boolean(true, loc))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Boolean(false, loc))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.at_record_literal() {
                    self.parse_record_literal(token.lexeme, loc)
                } else {
                    Ok(Expr::Identifier(token.lexeme, loc))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.match_token(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect_token(TokenKind::RBracket, "Expected ']' after array elements")?;
                Ok(Expr::ArrayLiteral(elements, loc))
            }
            _ => Err(ParseError::new(
                format!("Expected expression, found {}", token),
                loc,
            )),
        }
    }

    /// `Name {` followed by `}` or `field :`
    fn at_record_literal(&self) -> bool {
        self.check(TokenKind::LBrace)
            && (self.check_ahead(1, TokenKind::RBrace)
                || (self.check_ahead(1, TokenKind::Identifier) && self.check_ahead(2, TokenKind::Colon)))
    }

    /// Record literal body; the type name is already consumed
    fn parse_record_literal(&mut self, type_name: String, location: SourceLocation) -> Result<Expr, ParseError> {
        self.expect_lbrace("to open record literal")?;
        let mut fields = Vec::new();

        while !self.check(TokenKind::RBrace) {
            let field = self.expect_identifier("as record field name")?;
            self.expect_token(TokenKind::Colon, "Expected ':' after record field name")?;
            let value = self.parse_expression()?;
            fields.push((field, value));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect_rbrace("to close record literal")?;

        Ok(Expr::RecordLiteral {
            type_name,
            fields,
            location,
        })
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, location: SourceLocation) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_expr(source: &str) -> Expr {
        let program = format!("Focus {}; Relax", source);
        let mut statements = Parser::new(&program).parse_program().unwrap().statements;
        match statements.remove(0) {
            Stmt::Expression { expr, .. } => expr,
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        match parse_expr("1 + 2 * 3") {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. })),
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_binds_looser_than_comparison() {
        match parse_expr("a < 1 && b > 2 || c") {
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                ..
            } => assert!(matches!(*left, Expr::Binary { op: BinaryOp::And, .. })),
            other => panic!("Expected ||, got {:?}", other),
        }
    }

    #[test]
    fn test_synonyms_normalized() {
        assert!(matches!(parse_expr("a youAreFeelingVerySleepy b"), Expr::Binary { op: BinaryOp::Eq, .. }));
        assert!(matches!(parse_expr("a notSoDeep b"), Expr::Binary { op: BinaryOp::Ne, .. }));
        assert!(matches!(parse_expr("a lookAtTheWatch b"), Expr::Binary { op: BinaryOp::Gt, .. }));
        assert!(matches!(parse_expr("a fallUnderMySpell b"), Expr::Binary { op: BinaryOp::Lt, .. }));
        assert!(matches!(parse_expr("a deeplyGreater b"), Expr::Binary { op: BinaryOp::Ge, .. }));
        assert!(matches!(parse_expr("a deeplyLess b"), Expr::Binary { op: BinaryOp::Le, .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        match parse_expr("a = b = 3") {
            Expr::Assign { target, value, .. } => {
                assert!(matches!(*target, Expr::Identifier(ref n, _) if n == "a"));
                assert!(matches!(*value, Expr::Assign { .. }));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = Parser::new("Focus 1 = 2; Relax").parse_program().unwrap_err();
        assert_eq!(err.message, "Invalid assignment target");
    }

    #[test]
    fn test_method_call_postfix() {
        match parse_expr("counter.bump(1, 2)") {
            Expr::Call { callee, args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(*callee, Expr::FieldAccess { ref field, .. } if field == "bump"));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_record_and_array_literals() {
        match parse_expr(r#"p = Person { name: "Alice", age: 30 }"#) {
            Expr::Assign { value, .. } => match *value {
                Expr::RecordLiteral {
                    ref type_name,
                    ref fields,
                    ..
                } => {
                    assert_eq!(type_name, "Person");
                    assert_eq!(fields.len(), 2);
                    assert_eq!(fields[1].0, "age");
                }
                ref other => panic!("Expected record literal, got {:?}", other),
            },
            other => panic!("Expected assignment, got {:?}", other),
        }

        assert!(matches!(parse_expr("xs[1 + 1]"), Expr::Index { .. }));
        assert!(matches!(parse_expr("[1, 2, 3]"), Expr::ArrayLiteral(ref items, _) if items.len() == 3));
    }

    #[test]
    fn test_unary_chain() {
        match parse_expr("!!-x") {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
                ..
            } => assert!(matches!(*operand, Expr::Unary { op: UnaryOp::Not, .. })),
            other => panic!("Expected unary, got {:?}", other),
        }
    }
}
