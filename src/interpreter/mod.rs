//! HypnoScript execution engine
//!
//! This module provides the tree-walking interpreter:
//! - [`engine`]: the [`Interpreter`] and the program driver
//! - [`errors`]: runtime error and assertion failure types
//! - [`io`]: output and input seams, with test doubles
//! - [`constants`]: execution limits and intrinsic names
//!
//! # Execution Model
//!
//! Statements return a [`ControlFlow`] instead of unwinding through panics or
//! error values: loops consume `Break`/`Continue`, statement lists consume a
//! `Jump` to one of their labels, calls consume `Return`.
//!
//! # Intrinsics
//!
//! `drift(ms)` and `Observe(value)` are executed natively. The rest of the
//! builtin catalog is known to the checker only.

mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
pub mod io;
mod jumps;
mod links;
mod loops;
mod sessions;
mod statements;

pub use engine::{ControlFlow, Interpreter};
pub use errors::{AssertionFailure, RuntimeError};
pub use io::{InputSource, MockTerminal, OutputSink, ScriptedInput};
