//! Runtime memory model for the HypnoScript interpreter
//!
//! This module provides the core abstractions shared by the checker and the
//! interpreter:
//! - [`value`]: Runtime value representation (Number, String, Record, Session, ...)
//! - [`session`]: Session instances shared by reference
//! - [`symbols`]: Scoped symbol table with lexical parent links

pub mod session;
pub mod symbols;
pub mod value;
