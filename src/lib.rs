//! # adascript
//!
//! AdaScript is a small, dynamically-typed, embeddable scripting language
//! with a tree-walking interpreter. A host program creates a virtual
//! machine, loads source text or files, registers native callbacks, and
//! calls script-defined functions, either through the Rust API on
//! [`Interpreter`] or through the C-compatible surface in [`embed`].
//!
//! Script values are reference-counted; cyclic structures (an instance
//! field pointing back at a container that owns the instance) are a known
//! leak.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{ast::Stmt, error::ParseError, interpreter::lexer, interpreter::parser};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Stmt` enums that represent source
/// code as a tree, with source lines attached for error reporting, plus the
/// operator enums shared between the parser and the evaluator.
pub mod ast;
/// The C embedding boundary.
///
/// Exports the `AdaScript_*` functions: create/destroy a VM, evaluate
/// source or files, call globals by name with string arguments, register
/// native string functions, and free VM-allocated buffers.
pub mod embed;
/// Provides unified error types for parsing and evaluation.
///
/// Declares the `ParseError` and `RuntimeError` enums covering every
/// failure mode, each carrying a message and a source position.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// Ties together the lexer, parser, value model, environments, evaluator,
/// and builtins to provide the complete runtime for script execution.
pub mod interpreter;
/// General numeric helpers.
///
/// Checked conversions from the language's doubles to the integral types
/// the runtime needs internally.
pub mod util;

pub use interpreter::evaluator::core::Interpreter;

/// Lexes and parses source text into a program.
///
/// # Errors
/// Returns the first lexing or parsing error in the source.
///
/// # Examples
/// ```
/// let program = adascript::compile("let x = 1 + 2;").unwrap();
/// assert_eq!(program.len(), 1);
///
/// assert!(adascript::compile("let x = ;").is_err());
/// ```
pub fn compile(source: &str) -> Result<Vec<Stmt>, ParseError> {
    let tokens = lexer::scan(source)?;
    let mut tokens = tokens.iter().peekable();
    parser::statement::parse_program(&mut tokens)
}

/// Runs a script file in a fresh VM, the way the command-line driver does.
///
/// Relative imports resolve against the script's parent directory;
/// `builtins_dir`, when given, anchors `import "builtins/..."` paths.
///
/// # Errors
/// Returns an error when the file cannot be read, fails to parse, or stops
/// with a runtime error.
pub fn run_file(path: &std::path::Path,
                builtins_dir: Option<std::path::PathBuf>)
                -> Result<(), Box<dyn std::error::Error>> {
    let mut interpreter = Interpreter::new(std::env::current_dir().unwrap_or_default());
    if let Some(dir) = builtins_dir {
        interpreter.set_builtins_dir(dir);
    }
    interpreter.run_file(path)
}
