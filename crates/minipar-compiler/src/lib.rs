//! MiniPar front-end: lexing, parsing, and semantic analysis.
//!
//! # Example
//!
//! ```
//! let module = minipar_compiler::parse("x : number = 2 + 3 * 4").expect("valid source");
//! minipar_compiler::analyze(&module).expect("well-typed");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symtab;
pub mod token;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod semantic_tests;
#[cfg(test)]
mod symtab_tests;

pub use ast::{Module, Type, format_ast};
pub use diagnostics::{RenderOptions, render_syntax_error};
pub use error::{SemanticError, SyntaxError};
pub use lexer::TokenStream;
pub use parser::parse;
pub use semantic::analyze;
