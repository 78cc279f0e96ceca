//! # Introduction
//!
//! HypnoScript is a small scripting language with a hypnotic vocabulary:
//! programs are bracketed by `Focus` and `Relax`, variables are `induce`d,
//! output is `observe`d, and functions are `suggestion`s. This crate holds its
//! front end and a tree-walking interpreter.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Type Checker → Interpreter
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST.
//! 2. [`checker`]: resolves names, infers and checks types, and collects
//!    coded diagnostics. It never aborts.
//! 3. [`interpreter`]: walks the AST again and executes it, with sessions
//!    (mutable objects with methods), tranceify records, loops and labeled
//!    jumps.
//! 4. [`memory`]: runtime values, session instances and the scoped symbol
//!    table shared by the checker and the interpreter.
//!
//! ## Example
//!
//! ```
//! use hypnoscript::interpreter::{Interpreter, MockTerminal};
//! use hypnoscript::parser::Parser;
//!
//! let program = Parser::new("Focus induce x = 2 + 3; observe x; Relax")
//!     .parse_program()
//!     .unwrap();
//! let terminal = MockTerminal::new();
//! let mut interpreter = Interpreter::new().with_output(terminal.clone());
//! interpreter.execute(&program).unwrap();
//! assert_eq!(terminal.lines(), vec!["5"]);
//! ```

pub mod checker;
pub mod interpreter;
pub mod memory;
pub mod parser;
