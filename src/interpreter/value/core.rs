use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::Literal,
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::function::{Class, Function, Instance, NativeFunction},
    },
};

/// Represents a runtime value in the interpreter.
///
/// This enum models every type a script expression can produce. Scalars
/// (null, booleans, numbers, strings) behave as if by value. Lists, dicts,
/// functions, classes, and instances are reference values: cloning a `Value`
/// clones an `Rc` handle, so aliases observe each other's mutations.
///
/// Ownership is reference-counted; cyclic structures (an instance field
/// pointing back at a container that holds the instance) are never
/// reclaimed. This is a documented limitation of the runtime.
#[derive(Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A numeric value. The language has a single numeric type, the IEEE-754
    /// double.
    Number(f64),
    /// A string of bytes.
    Str(String),
    /// An ordered sequence of values with shared storage.
    List(Rc<RefCell<Vec<Self>>>),
    /// A mapping from string keys to values with shared storage. Insertion
    /// order is not observable.
    Dict(Rc<RefCell<HashMap<String, Self>>>),
    /// A user-defined function or bound method.
    Function(Rc<Function>),
    /// A host-registered native function.
    Native(Rc<NativeFunction>),
    /// A class (also produced by struct and union declarations).
    Class(Rc<Class>),
    /// An instance of a class.
    Instance(Rc<Instance>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(RefCell::new(v)))
    }
}

impl From<HashMap<String, Self>> for Value {
    fn from(v: HashMap<String, Self>) -> Self {
        Self::Dict(Rc::new(RefCell::new(v)))
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Self::Null,
            Literal::Bool(b) => (*b).into(),
            Literal::Number(n) => (*n).into(),
            Literal::Str(s) => s.as_str().into(),
        }
    }
}

impl Value {
    /// Returns the name of this value's type, as used in diagnostics and in
    /// the `<type-name>` display form.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Function(_) => "function",
            Self::Native(_) => "native",
            Self::Class(_) => "class",
            Self::Instance(_) => "instance",
        }
    }

    /// Computes the truthiness of this value, as used by conditions and the
    /// logical operators: null is false, booleans are themselves, numbers
    /// are true unless zero, everything else is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            _ => true,
        }
    }

    /// Converts the value to an `f64`, or returns a type error.
    ///
    /// # Parameters
    /// - `what`: Description of the expectation, used in the error message.
    /// - `line`: Source code line number for error reporting.
    pub fn as_number(&self, what: &str, line: usize) -> EvalResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(RuntimeError::TypeError { details: format!("{what} must be a number, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Borrows the value as a string slice, or returns a type error.
    ///
    /// # Parameters
    /// - `what`: Description of the expectation, used in the error message.
    /// - `line`: Source code line number for error reporting.
    pub fn as_str(&self, what: &str, line: usize) -> EvalResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(RuntimeError::TypeError { details: format!("{what} must be a string, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Returns a handle to the value's list storage, or a type error.
    ///
    /// # Parameters
    /// - `what`: Description of the expectation, used in the error message.
    /// - `line`: Source code line number for error reporting.
    pub fn as_list(&self, what: &str, line: usize) -> EvalResult<Rc<RefCell<Vec<Self>>>> {
        match self {
            Self::List(items) => Ok(Rc::clone(items)),
            other => Err(RuntimeError::TypeError { details: format!("{what} must be a list, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Returns a handle to the value's dict storage, or a type error.
    ///
    /// # Parameters
    /// - `what`: Description of the expectation, used in the error message.
    /// - `line`: Source code line number for error reporting.
    pub fn as_dict(&self, what: &str, line: usize) -> EvalResult<Rc<RefCell<HashMap<String, Self>>>> {
        match self {
            Self::Dict(map) => Ok(Rc::clone(map)),
            other => Err(RuntimeError::TypeError { details: format!("{what} must be a dict, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Returns `true` if the value is a string.
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Self::Str(_))
    }

    /// Returns `true` if the value can be invoked: a user function, a native
    /// function, or a class.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Native(_) | Self::Class(_))
    }
}

impl PartialEq for Value {
    /// Equality compares kind first, then value. Scalars compare
    /// structurally; lists, dicts, functions, classes, and instances are
    /// equal only when they are the same underlying object. Values of
    /// different kinds are never equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Dict(a), Self::Dict(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Formats the canonical display form used by `str`, string
    /// concatenation, and the embedding boundary: numbers in default `f64`
    /// formatting, booleans as `true`/`false`, `null`, strings verbatim, and
    /// `<type-name>` for every other kind.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            other => write!(f, "<{}>", other.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Containers may be cyclic, so Debug stays shallow.
        match self {
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::List(items) => write!(f, "List(len {})", items.borrow().len()),
            Self::Dict(map) => write!(f, "Dict(len {})", map.borrow().len()),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms_are_canonical() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Number(14.0).to_string(), "14");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(vec![Value::Null]).to_string(), "<list>");
    }

    #[test]
    fn truthiness_follows_the_language_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::from(Vec::new()).is_truthy());
    }

    #[test]
    fn scalar_equality_is_structural() {
        assert_eq!(Value::Number(2.0), Value::Number(2.0));
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_ne!(Value::Number(2.0), Value::from("2"));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn container_equality_is_identity() {
        let xs = Value::from(vec![Value::Number(1.0)]);
        let alias = xs.clone();
        let same_contents = Value::from(vec![Value::Number(1.0)]);
        assert_eq!(xs, alias);
        assert_ne!(xs, same_contents);
    }
}
