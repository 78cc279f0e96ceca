//! Statement parsing implementation
//!
//! This module handles parsing of all HypnoScript statement types:
//!
//! - Variable declarations: `induce x: number = 42;`, `induce name from external;`
//! - Control flow: `if`/`else`, `while`, `loop (init; cond; step)`
//! - Jump statements: `awaken`, `snap`, `sink`, `sinkTo label`
//! - Labels and assertions: `label done;`, `assert x > 0 "positive";`
//! - Output: `observe expr;`
//! - Expression statements: calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | if_stmt | while_stmt | loop_stmt
//!             | func_decl | session_decl | tranceify_decl
//!             | "observe" expr ";" | "awaken" expr? ";"
//!             | "snap" ";" | "sink" ";" | "sinkTo" IDENT ";"
//!             | "label" IDENT ";" | "assert" expr STRING? ";"
//!             | expr ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a `{ ... }` block including the braces
    pub(crate) fn parse_block(&mut self, ctx: &str) -> Result<Vec<Stmt>, ParseError> {
        self.expect_lbrace(ctx)?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("to close block")?;
        Ok(body)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek().kind {
            TokenKind::Induce => {
                self.advance();
                let decl = self.parse_var_decl(loc)?;
                Ok(Stmt::VarDecl(decl))
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement(loc)
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement(loc)
            }
            TokenKind::Loop => {
                self.advance();
                self.parse_loop_statement(loc)
            }
            TokenKind::Suggestion | TokenKind::Imperative | TokenKind::Dominant => {
                let decl = self.parse_function_decl()?;
                Ok(Stmt::FunctionDecl(decl.into()))
            }
            TokenKind::Session => {
                self.advance();
                let decl = self.parse_session_decl(loc)?;
                Ok(Stmt::SessionDecl(decl.into()))
            }
            TokenKind::Tranceify => {
                self.advance();
                let decl = self.parse_tranceify_decl(loc)?;
                Ok(Stmt::TranceifyDecl(decl.into()))
            }
            TokenKind::Observe => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_semicolon("after observe expression")?;
                Ok(Stmt::Observe {
                    expr,
                    location: loc,
                })
            }
            TokenKind::Awaken => {
                self.advance();
                let expr = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon("after 'awaken'")?;
                Ok(Stmt::Return {
                    expr,
                    location: loc,
                })
            }
            TokenKind::Snap => {
                self.advance();
                self.expect_semicolon("after 'snap'")?;
                Ok(Stmt::Break { location: loc })
            }
            TokenKind::Sink => {
                self.advance();
                self.expect_semicolon("after 'sink'")?;
                Ok(Stmt::Continue { location: loc })
            }
            TokenKind::SinkTo => {
                self.advance();
                let label = self.expect_identifier("after 'sinkTo'")?;
                self.expect_semicolon("after sinkTo label")?;
                Ok(Stmt::Jump {
                    label,
                    location: loc,
                })
            }
            TokenKind::Label => {
                self.advance();
                let name = self.expect_identifier("after 'label'")?;
                self.expect_semicolon("after label name")?;
                Ok(Stmt::Label {
                    name,
                    location: loc,
                })
            }
            TokenKind::Assert => {
                self.advance();
                let condition = self.parse_expression()?;
                let message = if self.check(TokenKind::String) {
                    Some(self.advance().lexeme.clone())
                } else {
                    None
                };
                self.expect_semicolon("after assertion")?;
                Ok(Stmt::Assert {
                    condition,
                    message,
                    location: loc,
                })
            }
            TokenKind::Entrance | TokenKind::MindLink => Err(ParseError::new(
                format!("{} is only allowed at the top level", self.peek()),
                loc,
            )),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_semicolon("after expression")?;
                Ok(Stmt::Expression {
                    expr,
                    location: loc,
                })
            }
        }
    }

    /// `induce` already consumed:
    /// `IDENT (":" TYPE)? ("=" expr | "from" "external")? ";"`
    pub(crate) fn parse_var_decl(&mut self, location: SourceLocation) -> Result<VarDecl, ParseError> {
        let name = self.expect_identifier("after 'induce'")?;
        let type_name = self.parse_type_annotation()?;

        let mut initializer = None;
        let mut from_external = false;

        if self.match_token(TokenKind::Assign) {
            initializer = Some(self.parse_expression()?);
        } else if self.match_token(TokenKind::From) {
            self.expect_token(TokenKind::External, "Expected 'external' after 'from'")?;
            from_external = true;
        }

        self.expect_semicolon("after variable declaration")?;

        Ok(VarDecl {
            name,
            type_name,
            initializer,
            from_external,
            location,
        })
    }

    /// Parse if statement; `else if` chains nest in the else branch
    fn parse_if_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let then_branch = self.parse_block("after if condition")?;

        let else_branch = if self.match_token(TokenKind::Else) {
            let else_loc = self.current_location();
            if self.match_token(TokenKind::If) {
                Some(vec![self.parse_if_statement(else_loc)?])
            } else {
                Some(self.parse_block("after 'else'")?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after while condition")?;

        let body = self.parse_block("after while condition")?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    /// Parse counted loop: `loop (init; cond; step) { ... }`
    fn parse_loop_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'loop'")?;

        // Init clause carries its own ';'
        let init = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Induce) {
            let decl_loc = self.current_location();
            self.advance();
            Some(Box::new(Stmt::VarDecl(self.parse_var_decl(decl_loc)?)))
        } else {
            let expr_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after loop initializer")?;
            Some(Box::new(Stmt::Expression {
                expr,
                location: expr_loc,
            }))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after loop condition")?;

        let iteration = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after loop clauses")?;

        let body = self.parse_block("after loop clauses")?;

        Ok(Stmt::Loop {
            init,
            condition,
            iteration,
            body,
            location,
        })
    }
}
