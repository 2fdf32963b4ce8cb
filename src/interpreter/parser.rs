/// Expression parsing.
///
/// Implements the precedence-climbing chain from assignment down to primary
/// expressions, including calls, property access, indexing, and container
/// literals.
pub mod core;

/// Statement and declaration parsing.
///
/// Handles `let`, `func`, `class`, `struct`, `union`, `import`, control flow,
/// blocks, and the bare multi-assign form.
pub mod statement;

/// Shared parsing helpers.
///
/// Token consumption utilities used by both expression and statement parsing.
pub mod utils;
