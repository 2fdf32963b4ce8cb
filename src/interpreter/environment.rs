use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::core::Value;

/// A lexical scope: a mapping from names to values plus a link to the
/// enclosing scope.
///
/// Lookup and assignment walk outward through the chain; definition always
/// writes the current scope. A scope never removes a name once it has been
/// defined.
pub struct Environment {
    values: HashMap<String, Value>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates a root environment with no enclosing scope.
    #[must_use]
    pub fn new() -> Self {
        Self { values: HashMap::new(),
               parent: None, }
    }

    /// Creates an environment nested inside `parent`.
    #[must_use]
    pub fn with_parent(parent: Rc<RefCell<Self>>) -> Self {
        Self { values: HashMap::new(),
               parent: Some(parent), }
    }

    /// Defines `name` in this scope, shadowing any definition in an
    /// enclosing scope and replacing any previous definition here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Rewrites the innermost binding of `name`, walking outward through the
    /// enclosing scopes.
    ///
    /// Returns `false` when no scope defines the name; the caller decides
    /// whether that is an error (plain assignment) or a cue to define
    /// (multi-assign, loop variables).
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => false,
        }
    }

    /// Looks up `name`, walking outward, and returns a clone of its value.
    ///
    /// For reference values the clone is a handle to the shared storage.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.borrow().get(name))
    }

    /// Returns `true` when this scope itself (not an enclosing one) defines
    /// `name`.
    #[must_use]
    pub fn defines_locally(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_get() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        assert_eq!(env.get("x"), Some(Value::Number(1.0)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn redefining_keeps_the_second_value() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.define("x", Value::Number(2.0));
        assert_eq!(env.get("x"), Some(Value::Number(2.0)));
    }

    #[test]
    fn assign_rewrites_the_innermost_defining_scope() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("x", Value::Number(1.0));

        let mut inner = Environment::with_parent(Rc::clone(&outer));
        assert!(inner.assign("x", Value::Number(5.0)));
        assert_eq!(outer.borrow().get("x"), Some(Value::Number(5.0)));
        assert!(!inner.defines_locally("x"));
    }

    #[test]
    fn assign_fails_for_unknown_names() {
        let mut env = Environment::new();
        assert!(!env.assign("missing", Value::Null));
    }

    #[test]
    fn inner_definitions_shadow_without_touching_the_outer_scope() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("x", Value::Number(1.0));

        let mut inner = Environment::with_parent(Rc::clone(&outer));
        inner.define("x", Value::Number(9.0));
        assert_eq!(inner.get("x"), Some(Value::Number(9.0)));
        assert_eq!(outer.borrow().get("x"), Some(Value::Number(1.0)));
    }
}
