#[derive(Debug)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// The lexer hit a character that does not begin any token.
    UnexpectedCharacter {
        /// The offending text.
        found:  String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A string literal was opened but never closed.
    UnterminatedString {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// A specific token was expected but something else was found.
    ExpectedToken {
        /// Description of what was expected, e.g. `';'` or `variable name`.
        expected: String,
        /// The token that was found instead.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
        /// The source column where the error occurred.
        column:   usize,
    },
    /// No rule matched where an expression was required.
    ExpectedExpression {
        /// The token that was found instead.
        found:  String,
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// The left-hand side of `=` is not a variable, property, or index
    /// expression.
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line:   usize,
        /// The source column where the error occurred.
        column: usize,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source line where the error occurred.
        line: usize,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter { found, line, column } => {
                write!(f, "Error on line {line}, column {column}: Unexpected character '{found}'.")
            },

            Self::UnterminatedString { line, column } => {
                write!(f, "Error on line {line}, column {column}: Unterminated string.")
            },

            Self::ExpectedToken { expected,
                                  found,
                                  line,
                                  column, } => {
                write!(f,
                       "Error on line {line}, column {column}: Expected {expected}, found {found}.")
            },

            Self::ExpectedExpression { found, line, column } => {
                write!(f,
                       "Error on line {line}, column {column}: Expected expression, found {found}.")
            },

            Self::InvalidAssignmentTarget { line, column } => {
                write!(f, "Error on line {line}, column {column}: Invalid assignment target.")
            },

            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: Unexpected end of input.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
