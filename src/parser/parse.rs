//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the program entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, `Focus ... Relax` bracket
//! - `declarations`: suggestions, sessions and tranceify records
//! - `statements`: statements (induce, if, while, loop, jumps, ...)
//! - `expressions`: expressions with precedence climbing
//!
//! # Grammar
//!
//! ```text
//! program ::= "Focus" ( "{" top* "}" | top* ) "Relax" ";"? EOF
//! top     ::= "entrance" block | "mindLink" STRING ";" | statement
//! ```
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{lex, Token, TokenKind};
use thiserror::Error;
use tracing::debug;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// Parse a token stream into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::from_tokens(tokens).parse_program()
}

/// Recursive descent parser for HypnoScript
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    /// Lex `source` and prepare to parse it. Lexing cannot fail.
    pub fn new(source: &str) -> Self {
        Self::from_tokens(lex(source))
    }

    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let location = tokens.last().map(|t| t.location).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", location));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse the entire program between `Focus` and `Relax`
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        if !self.match_token(TokenKind::Focus) {
            return Err(ParseError::new(
                format!("Program must start with 'Focus', found {}", self.peek()),
                self.current_location(),
            ));
        }

        let braced = self.match_token(TokenKind::LBrace);
        let closing = if braced {
            TokenKind::RBrace
        } else {
            TokenKind::Relax
        };

        while !self.check(closing) {
            if self.is_at_end() {
                return Err(ParseError::new(
                    format!("Expected {} before end of file", closing),
                    self.current_location(),
                ));
            }
            let stmt = self.parse_top_level()?;
            program.statements.push(stmt);
        }

        if braced {
            self.expect_rbrace("to close the 'Focus' block")?;
        }
        self.expect_token(TokenKind::Relax, "Expected 'Relax' at end of program")?;
        self.match_token(TokenKind::Semicolon);

        if !self.is_at_end() {
            return Err(ParseError::new(
                format!("Unexpected {} after 'Relax'", self.peek()),
                self.current_location(),
            ));
        }

        debug!(statements = program.statements.len(), "parsed program");
        Ok(program)
    }

    /// Statements allowed only directly inside the program bracket
    fn parse_top_level(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        if self.match_token(TokenKind::Entrance) {
            self.expect_lbrace("after 'entrance'")?;
            let body = self.parse_block_statements()?;
            self.expect_rbrace("after entrance block")?;
            return Ok(Stmt::Entrance {
                body,
                location: loc,
            });
        }

        if self.match_token(TokenKind::MindLink) {
            let path = self.expect_string("after 'mindLink'")?;
            self.expect_semicolon("after mindLink path")?;
            return Ok(Stmt::MindLink {
                path,
                location: loc,
            });
        }

        self.parse_statement()
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_ahead(n).map(|t| t.kind) == Some(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        // The stream always ends in Eof and `advance` never steps past it.
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn expect_token(&mut self, kind: TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("{}, found {}", message, self.peek()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(TokenKind::LBrace, &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<String, ParseError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(ParseError::new(
                format!("Expected identifier {ctx}, found {}", self.peek()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_string(&mut self, ctx: &str) -> Result<String, ParseError> {
        if self.check(TokenKind::String) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(ParseError::new(
                format!("Expected string literal {ctx}, found {}", self.peek()),
                self.current_location(),
            ))
        }
    }

    /// Optional `: TYPE` annotation
    pub(crate) fn parse_type_annotation(&mut self) -> Result<Option<String>, ParseError> {
        if self.match_token(TokenKind::Colon) {
            Ok(Some(self.expect_identifier("as type name")?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_program() {
        let program = Parser::new("Focus Relax").parse_program().unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_parse_block_form() {
        let source = "Focus { induce x: number = 1; observe x; } Relax;";
        let program = Parser::new(source).parse_program().unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_missing_focus() {
        let err = Parser::new("induce x = 1; Relax").parse_program().unwrap_err();
        assert!(err.message.contains("Focus"));
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_missing_relax() {
        let err = Parser::new("Focus induce x = 1;").parse_program().unwrap_err();
        assert!(err.message.contains("'Relax'"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(Parser::new("Focus Relax observe 1;").parse_program().is_err());
    }

    #[test]
    fn test_entrance_and_mind_link() {
        let source = r#"Focus mindLink "lib.hyp"; entrance { observe 1; } Relax"#;
        let program = Parser::new(source).parse_program().unwrap();
        assert!(matches!(&program.statements[0], Stmt::MindLink { path, .. } if path == "lib.hyp"));
        assert!(matches!(&program.statements[1], Stmt::Entrance { body, .. } if body.len() == 1));
    }

    #[test]
    fn test_nested_entrance_rejected() {
        let source = "Focus if (true) { entrance { } } Relax";
        let err = Parser::new(source).parse_program().unwrap_err();
        assert!(err.message.contains("top level"));
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::new("Expected ';'", SourceLocation::new(3, 7));
        assert_eq!(err.to_string(), "Parse error at line 3, column 7: Expected ';'");
    }

    #[test]
    fn test_statement_count_is_deterministic() {
        let source = "Focus induce a = 1; induce b = a + 2; observe b; Relax";
        let first = Parser::new(source).parse_program().unwrap();
        let second = parse(lex(source)).unwrap();
        assert_eq!(first.statements.len(), 3);
        assert_eq!(first, second);
    }
}
