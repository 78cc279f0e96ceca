//! HypnoScript source parser
//!
//! This module transforms HypnoScript source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `statements`,
//!   `expressions` and `declarations`
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level.
//! Structural errors abort with a [`parse::ParseError`]; there is no recovery.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{parse, ParseError, Parser};
