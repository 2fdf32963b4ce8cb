/// Lexing and parsing errors.
///
/// Defines every failure that can be detected before execution begins:
/// unexpected characters, unterminated strings, missing tokens, and invalid
/// assignment targets. All variants carry source positions.
pub mod parse_error;
/// Runtime errors.
///
/// Defines every failure that can be raised while a script executes, such as
/// undefined variables, arity mismatches, type errors, bad indexing, and
/// import failures.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
