//! Static type checking for HypnoScript
//!
//! - [`engine`]: the [`TypeChecker`] and its two passes
//! - `statements` / `expressions`: per-node rules, as `impl TypeChecker` blocks
//! - `links`: `mindLink` merging
//! - [`types`]: the [`HypnoType`] lattice and compatibility rule
//! - [`builtins`]: return types of the builtin catalog
//! - [`diagnostics`]: coded errors and warnings and their reporter
//!
//! # Example
//!
//! ```
//! use hypnoscript::checker::TypeChecker;
//! use hypnoscript::parser::Parser;
//!
//! let program = Parser::new("Focus induce x: number = \"five\"; Relax")
//!     .parse_program()
//!     .unwrap();
//! let mut checker = TypeChecker::new();
//! checker.check(&program);
//! assert_eq!(checker.reporter().errors().len(), 1);
//! ```

pub mod builtins;
pub mod diagnostics;
pub mod engine;
mod expressions;
mod links;
mod statements;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticReporter, Severity};
pub use engine::TypeChecker;
pub use types::HypnoType;
