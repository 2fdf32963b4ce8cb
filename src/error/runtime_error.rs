#[derive(Debug)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// Tried to assign to a variable that was never defined.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Read a property that exists neither as a field nor as a method.
    UndefinedProperty {
        /// The property name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Indexed a dict with a key it does not contain.
    MissingKey {
        /// The missing key.
        key:  String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The wrong number of arguments was supplied to a callable.
    ArityMismatch {
        /// The number of parameters the callable declares.
        expected: usize,
        /// The number of arguments that were supplied.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Tried to access a list element outside the allowed bounds.
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// The length of the list.
        len:   usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted modulo by zero.
    ModuloByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Called a value that is not a function, native, or class.
    NotCallable {
        /// The type name of the value.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An import could not be resolved or its file failed to load.
    ImportError {
        /// Details about the failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An argument to a builtin was invalid or had the wrong shape.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A builtin failed at the system boundary (filesystem, network,
    /// process execution, plugin loading).
    NativeError {
        /// Details about the failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name, line } => {
                write!(f, "Error on line {line}: Undefined variable '{name}'.")
            },
            Self::UndefinedProperty { name, line } => {
                write!(f, "Error on line {line}: Undefined property '{name}'.")
            },
            Self::MissingKey { key, line } => {
                write!(f, "Error on line {line}: Dict has no key '{key}'.")
            },
            Self::ArityMismatch { expected,
                                  found,
                                  line, } => {
                write!(f,
                       "Error on line {line}: Expected {expected} argument(s) but got {found}.")
            },
            Self::TypeError { details, line } => {
                write!(f, "Error on line {line}: Type error: {details}.")
            },
            Self::IndexOutOfBounds { index, len, line } => {
                write!(f,
                       "Error on line {line}: List index {index} out of range for length {len}.")
            },
            Self::DivisionByZero { line } => write!(f, "Error on line {line}: Division by zero."),
            Self::ModuloByZero { line } => write!(f, "Error on line {line}: Modulo by zero."),
            Self::NotCallable { found, line } => {
                write!(f, "Error on line {line}: Can only call functions and classes, not {found}.")
            },
            Self::ImportError { details, line } => {
                write!(f, "Error on line {line}: Import failed: {details}.")
            },
            Self::InvalidArgument { details, line } => {
                write!(f, "Error on line {line}: Invalid argument: {details}.")
            },
            Self::NativeError { details, line } => write!(f, "Error on line {line}: {details}."),
        }
    }
}

impl std::error::Error for RuntimeError {}
