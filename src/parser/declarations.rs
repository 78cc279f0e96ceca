//! Declaration parsing implementation
//!
//! This module handles parsing of:
//!
//! - Suggestions (functions): `suggestion add(a: number, b: number): number { ... }`
//!   with the `imperative` and `dominant` modifiers
//! - Sessions: `session Counter { expose induce count: number = 0; ... }`
//! - Tranceify records: `tranceify Person { name: string; age: number; }`
//!
//! # Grammar
//!
//! ```text
//! func_decl      ::= ("imperative" | "dominant")? "suggestion" NAME "(" params ")" (":" TYPE)? block
//! params         ::= (IDENT (":" TYPE)? ("," IDENT (":" TYPE)?)*)?
//! session_decl   ::= "session" IDENT "{" member* "}"
//! member         ::= ("expose" | "conceal")? "dominant"?
//!                    (var_decl | func_decl | "constructor" "(" params ")" block)
//! tranceify_decl ::= "tranceify" IDENT "{" ("induce"? IDENT ":" TYPE ("=" expr)? ";")* "}"
//! ```
//!
//! Members are exposed unless marked `conceal`.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a suggestion declaration including its modifier keyword
    pub(crate) fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let location = self.current_location();
        let imperative = self.match_token(TokenKind::Imperative);
        let dominant = !imperative && self.match_token(TokenKind::Dominant);

        self.expect_token(TokenKind::Suggestion, "Expected 'suggestion'")?;
        self.parse_function_rest(location, imperative, dominant)
    }

    /// Everything after `suggestion`: name, parameters, return type, body
    fn parse_function_rest(
        &mut self,
        location: SourceLocation,
        imperative: bool,
        dominant: bool,
    ) -> Result<FunctionDecl, ParseError> {
        // `constructor` is a keyword but is a valid suggestion name
        let name = if self.match_token(TokenKind::Constructor) {
            CONSTRUCTOR_NAME.to_string()
        } else {
            self.expect_identifier("as suggestion name")?
        };

        let params = self.parse_params()?;
        let return_type = self.parse_type_annotation()?;
        let body = self.parse_block("before suggestion body")?;

        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            imperative,
            dominant,
            location,
        })
    }

    /// Parse `( name (: TYPE)?, ... )`
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect_lparen("before parameter list")?;
        let mut params = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                let name = self.expect_identifier("as parameter name")?;
                let type_name = self.parse_type_annotation()?;
                params.push(Param { name, type_name });

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_rparen("after parameters")?;
        Ok(params)
    }

    /// `session` already consumed
    pub(crate) fn parse_session_decl(&mut self, location: SourceLocation) -> Result<SessionDecl, ParseError> {
        let name = self.expect_identifier("after 'session'")?;
        self.expect_lbrace("after session name")?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_session_member()?);
        }

        self.expect_rbrace("after session body")?;

        Ok(SessionDecl {
            name,
            members,
            location,
        })
    }

    fn parse_session_member(&mut self) -> Result<SessionMember, ParseError> {
        let exposed = if self.match_token(TokenKind::Conceal) {
            false
        } else {
            self.match_token(TokenKind::Expose);
            true
        };
        let dominant = self.match_token(TokenKind::Dominant);
        let loc = self.current_location();

        let declaration = match self.peek().kind {
            TokenKind::Induce => {
                self.advance();
                MemberDecl::Field(self.parse_var_decl(loc)?)
            }
            TokenKind::Suggestion => {
                self.advance();
                MemberDecl::Method(self.parse_function_rest(loc, false, dominant)?.into())
            }
            TokenKind::Imperative => {
                self.advance();
                self.expect_token(TokenKind::Suggestion, "Expected 'suggestion' after 'imperative'")?;
                MemberDecl::Method(self.parse_function_rest(loc, true, dominant)?.into())
            }
            TokenKind::Constructor => {
                // `constructor(params) { ... }` without the `suggestion` keyword
                MemberDecl::Method(self.parse_function_rest(loc, false, false)?.into())
            }
            _ => {
                return Err(ParseError::new(
                    format!("Expected session member, found {}", self.peek()),
                    loc,
                ))
            }
        };

        Ok(SessionMember {
            declaration,
            exposed,
            dominant,
        })
    }

    /// `tranceify` already consumed
    pub(crate) fn parse_tranceify_decl(&mut self, location: SourceLocation) -> Result<TranceifyDecl, ParseError> {
        let name = self.expect_identifier("after 'tranceify'")?;
        self.expect_lbrace("after tranceify name")?;

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field_loc = self.current_location();
            self.match_token(TokenKind::Induce);
            let field_name = self.expect_identifier("as tranceify field name")?;

            self.expect_token(TokenKind::Colon, "Expected ':' after tranceify field name")?;
            let type_name = self.expect_identifier("as field type")?;
            let initializer = if self.match_token(TokenKind::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.expect_semicolon("after tranceify field")?;

            members.push(VarDecl {
                name: field_name,
                type_name: Some(type_name),
                initializer,
                from_external: false,
                location: field_loc,
            });
        }

        self.expect_rbrace("after tranceify body")?;

        Ok(TranceifyDecl {
            name,
            members,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn first_stmt(body: &str) -> Stmt {
        let source = format!("Focus {} Relax", body);
        let mut program = Parser::new(&source).parse_program().unwrap();
        program.statements.remove(0)
    }

    #[test]
    fn test_parse_suggestion_variants() {
        match first_stmt("suggestion add(a: number, b): number { awaken a + b; }") {
            Stmt::FunctionDecl(decl) => {
                assert_eq!(decl.name, "add");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.params[0].type_name.as_deref(), Some("number"));
                assert_eq!(decl.params[1].type_name, None);
                assert_eq!(decl.return_type.as_deref(), Some("number"));
                assert!(!decl.imperative && !decl.dominant);
            }
            other => panic!("Expected suggestion, got {:?}", other),
        }

        assert!(matches!(
            first_stmt("imperative suggestion shout() { observe 1; }"),
            Stmt::FunctionDecl(decl) if decl.imperative
        ));
        assert!(matches!(
            first_stmt("dominant suggestion rule() { }"),
            Stmt::FunctionDecl(decl) if decl.dominant
        ));
    }

    #[test]
    fn test_parse_session() {
        let source = "session Counter {
            expose induce count: number = 0;
            conceal induce secret = 7;
            dominant induce total: number = 0;
            constructor(start: number) { this.count = start; }
            suggestion bump() { this.count = this.count + 1; }
        }";
        match first_stmt(source) {
            Stmt::SessionDecl(decl) => {
                assert_eq!(decl.name, "Counter");
                assert_eq!(decl.members.len(), 5);
                assert!(decl.members[0].exposed);
                assert!(!decl.members[1].exposed);
                assert!(decl.members[2].dominant);
                assert_eq!(decl.members[3].name(), "constructor");
                assert!(decl.constructor().is_some());
                assert!(matches!(decl.members[4].declaration, MemberDecl::Method(_)));
            }
            other => panic!("Expected session, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tranceify() {
        match first_stmt("tranceify Person { name: string; induce age: number = 30; }") {
            Stmt::TranceifyDecl(decl) => {
                assert_eq!(decl.name, "Person");
                assert_eq!(decl.members.len(), 2);
                assert_eq!(decl.members[1].type_name.as_deref(), Some("number"));
                assert!(decl.members[1].initializer.is_some());
            }
            other => panic!("Expected tranceify, got {:?}", other),
        }
    }
}
