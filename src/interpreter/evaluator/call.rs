use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, Flow, Interpreter},
        value::{
            core::Value,
            function::{Class, Function, Instance, NativeFunction},
        },
    },
};

impl Interpreter {
    /// Evaluates a call expression.
    ///
    /// The callee is evaluated first, then all arguments left to right, and
    /// the invocation dispatches on the callee's kind.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            args: &[Expr],
                            line: usize)
                            -> EvalResult<Value> {
        let callee = self.evaluate(callee)?;
        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(self.evaluate(arg)?);
        }
        self.call_value(&callee, evaluated, line)
    }

    /// Invokes a callable value with already-evaluated arguments.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotCallable`] when the value is not a
    /// function, native, or class, or whatever error the invocation raises.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, line: usize) -> EvalResult<Value> {
        match callee {
            Value::Native(native) => self.call_native(native, &args, line),
            Value::Function(function) => self.call_function(function, args, line),
            Value::Class(class) => self.call_class(class, args, line),
            other => Err(RuntimeError::NotCallable { found: other.type_name().to_string(),
                                                     line }),
        }
    }

    /// Invokes a native function.
    ///
    /// Fixed arities are checked here; a native with arity `-1` validates
    /// its own argument count.
    fn call_native(&mut self,
                   native: &Rc<NativeFunction>,
                   args: &[Value],
                   line: usize)
                   -> EvalResult<Value> {
        if native.arity >= 0 && args.len() != native.arity as usize {
            return Err(RuntimeError::ArityMismatch { expected: native.arity as usize,
                                                     found: args.len(),
                                                     line });
        }
        let func = Rc::clone(&native.func);
        (*func)(self, args, line)
    }

    /// Invokes a user function.
    ///
    /// The arity is checked before binding. Parameters bind positionally in
    /// a child environment of the captured closure, and the body runs there.
    /// A return signal caught here becomes the call's value; falling off the
    /// end yields null. Initializers always yield the bound `this`,
    /// regardless of any returned value.
    pub(crate) fn call_function(&mut self,
                                function: &Rc<Function>,
                                args: Vec<Value>,
                                line: usize)
                                -> EvalResult<Value> {
        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch { expected: function.arity(),
                                                     found: args.len(),
                                                     line });
        }

        let mut local = Environment::with_parent(Rc::clone(&function.closure));
        for (param, arg) in function.decl.params.iter().zip(args) {
            local.define(param, arg);
        }
        let local = Rc::new(RefCell::new(local));

        let flow = self.execute_block(&function.decl.body, Rc::clone(&local))?;

        if function.is_initializer {
            return local.borrow()
                        .get("this")
                        .ok_or_else(|| RuntimeError::UndefinedVariable { name: "this".to_string(),
                                                                         line });
        }
        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    /// Invokes a class, producing a new instance.
    ///
    /// When the class declares `init`, it is bound against the fresh
    /// instance and invoked with the supplied arguments (arity-checked by
    /// the function call). Without `init` the argument list must be empty.
    fn call_class(&mut self, class: &Rc<Class>, args: Vec<Value>, line: usize) -> EvalResult<Value> {
        let instance = Value::Instance(Rc::new(Instance::new(Rc::clone(class))));

        if let Some(init) = class.find_method("init") {
            let bound = Self::bind_method(&init, instance.clone());
            self.call_function(&bound, args, line)?;
        } else if !args.is_empty() {
            return Err(RuntimeError::ArityMismatch { expected: 0,
                                                     found: args.len(),
                                                     line });
        }

        Ok(instance)
    }

    /// Binds a method to an instance.
    ///
    /// A fresh environment is chained onto the method's captured closure and
    /// `this` is defined inside it. Each binding gets its own frame, so
    /// concurrent bindings of `this` never alias shared closure state.
    pub(crate) fn bind_method(method: &Rc<Function>, instance: Value) -> Rc<Function> {
        let mut frame = Environment::with_parent(Rc::clone(&method.closure));
        frame.define("this", instance);
        Rc::new(Function { decl:           Rc::clone(&method.decl),
                           closure:        Rc::new(RefCell::new(frame)),
                           is_initializer: method.is_initializer, })
    }
}
