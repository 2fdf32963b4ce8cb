use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::FunctionDecl,
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

/// Callback type for native functions.
///
/// A native receives the interpreter (so it can call back into script code
/// or write to the configured output), the evaluated argument values, and the
/// source line of the call site for error reporting.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &[Value], usize) -> EvalResult<Value>>;

/// A user-defined function or method.
///
/// Pairs a shared declaration with the environment that was active when the
/// declaration executed. Methods accessed on an instance get a fresh
/// environment chained onto the original closure with `this` defined in it,
/// so concurrent bindings never alias.
pub struct Function {
    /// The shared declaration: name, parameters, body.
    pub decl:           Rc<FunctionDecl>,
    /// The environment captured at definition (or binding) time.
    pub closure:        Rc<RefCell<Environment>>,
    /// Whether this function is a class `init`. Initializers always return
    /// the bound instance.
    pub is_initializer: bool,
}

impl Function {
    /// The number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.decl.name
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
         .field("name", &self.decl.name)
         .field("params", &self.decl.params)
         .finish_non_exhaustive()
    }
}

/// A host-registered native function.
///
/// Carries a display name, an expected arity where `-1` means variadic, and
/// the callback. Fixed arities are checked by the call dispatcher; variadic
/// natives validate their own argument counts.
pub struct NativeFunction {
    /// Display name used in diagnostics.
    pub name:  String,
    /// Expected argument count, or `-1` for variadic.
    pub arity: i32,
    /// The host callback.
    pub func:  NativeFn,
}

impl NativeFunction {
    /// Creates a native function value.
    pub fn new(name: &str, arity: i32, func: NativeFn) -> Self {
        Self { name: name.to_string(),
               arity,
               func }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
         .field("name", &self.name)
         .field("arity", &self.arity)
         .finish_non_exhaustive()
    }
}

/// A class: a name plus its methods.
///
/// Struct and union declarations also produce a `Class`, with no methods.
#[derive(Debug)]
pub struct Class {
    /// The class name.
    pub name:    String,
    /// Methods by name.
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    /// Looks up a method by name.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods.get(name).map(Rc::clone)
    }
}

/// An instance of a class with its mutable field map.
pub struct Instance {
    /// The class this instance was created from.
    pub class:  Rc<Class>,
    /// Field storage. Fields are created on first assignment.
    pub fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    /// Allocates an instance with no fields.
    #[must_use]
    pub fn new(class: Rc<Class>) -> Self {
        Self { class,
               fields: RefCell::new(HashMap::new()), }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values may refer back to this instance; print only the class.
        f.debug_struct("Instance")
         .field("class", &self.class.name)
         .finish_non_exhaustive()
    }
}
