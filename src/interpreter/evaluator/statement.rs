use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, Stmt},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, Flow, Interpreter},
        value::{
            core::Value,
            function::{Class, Function},
        },
    },
};

impl Interpreter {
    /// Executes a single statement.
    ///
    /// Returns [`Flow::Return`] when a `return` statement fired somewhere
    /// below; every construct except a function invocation passes the signal
    /// through unchanged.
    pub fn execute(&mut self, statement: &Stmt) -> EvalResult<Flow> {
        match statement {
            Stmt::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            },
            Stmt::Let { name, initializer, .. } => {
                let value = self.evaluate(initializer)?;
                self.env.borrow_mut().define(name, value);
                Ok(Flow::Normal)
            },
            Stmt::MultiLet { names, .. } => {
                for name in names {
                    self.env.borrow_mut().define(name, Value::Null);
                }
                Ok(Flow::Normal)
            },
            Stmt::MultiAssign { names, value, line } => self.exec_multi_assign(names, value, *line),
            Stmt::Block { statements, .. } => {
                let child = Environment::with_parent(Rc::clone(&self.env));
                self.execute_block(statements, Rc::new(RefCell::new(child)))
            },
            Stmt::If { condition,
                       then_branch,
                       else_branch,
                       .. } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            },
            Stmt::While { condition, body, .. } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            },
            Stmt::For { var,
                        iterable,
                        body,
                        line, } => self.exec_for(var, iterable, body, *line),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            },
            Stmt::Function(decl) => {
                let function = Function { decl:           Rc::clone(decl),
                                          closure:        Rc::clone(&self.env),
                                          is_initializer: false, };
                self.env
                    .borrow_mut()
                    .define(&decl.name, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            },
            Stmt::Class { name, methods, .. } => {
                let mut table = HashMap::with_capacity(methods.len());
                for decl in methods {
                    let method = Function { decl:           Rc::clone(decl),
                                            closure:        Rc::clone(&self.env),
                                            is_initializer: decl.name == "init", };
                    table.insert(decl.name.clone(), Rc::new(method));
                }
                let class = Class { name:    name.clone(),
                                    methods: table, };
                self.env.borrow_mut().define(name, Value::Class(Rc::new(class)));
                Ok(Flow::Normal)
            },
            // Structs and unions are classes without methods; their field
            // and tag names have no runtime effect.
            Stmt::Struct { name, .. } | Stmt::Union { name, .. } => {
                let class = Class { name:    name.clone(),
                                    methods: HashMap::new(), };
                self.env.borrow_mut().define(name, Value::Class(Rc::new(class)));
                Ok(Flow::Normal)
            },
            Stmt::Import { path, line } => {
                self.exec_import(path, *line)?;
                Ok(Flow::Normal)
            },
        }
    }

    /// Executes a statement sequence inside the given environment,
    /// restoring the previous environment on every exit path.
    pub(crate) fn execute_block(&mut self,
                                statements: &[Stmt],
                                env: Rc<RefCell<Environment>>)
                                -> EvalResult<Flow> {
        let previous = Rc::clone(&self.env);
        self.env = env;
        let result = self.execute_all(statements);
        self.env = previous;
        result
    }

    /// Runs statements in order, stopping early on a return signal.
    pub(crate) fn execute_all(&mut self, statements: &[Stmt]) -> EvalResult<Flow> {
        for statement in statements {
            if let Flow::Return(value) = self.execute(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Unpacks a list into several names.
    ///
    /// The right-hand side must evaluate to a list whose length matches the
    /// number of names. Names already defined in any enclosing scope are
    /// assigned; the rest are defined in the current scope.
    fn exec_multi_assign(&mut self,
                         names: &[String],
                         value: &Expr,
                         line: usize)
                         -> EvalResult<Flow> {
        let value = self.evaluate(value)?;
        let items: Vec<Value> = match &value {
            Value::List(items) => items.borrow().clone(),
            other => {
                return Err(RuntimeError::TypeError { details: format!("right-hand side of multi-assign must be a list, got {}",
                                                                      other.type_name()),
                                                     line });
            },
        };
        if items.len() != names.len() {
            return Err(RuntimeError::InvalidArgument { details: format!("multi-assign expected {} value(s) but the list has {}",
                                                                        names.len(),
                                                                        items.len()),
                                                       line });
        }
        for (name, item) in names.iter().zip(items) {
            self.assign_or_define(name, item);
        }
        Ok(Flow::Normal)
    }

    /// Executes a `for (var in iterable)` loop.
    ///
    /// Lists yield their elements, dicts their keys as strings, and strings
    /// one-character strings. The loop variable is assigned when some scope
    /// already defines it and defined in the current scope otherwise. The
    /// iterable is snapshotted up front, so mutating it inside the body does
    /// not disturb the iteration.
    fn exec_for(&mut self,
                var: &str,
                iterable: &Expr,
                body: &Stmt,
                line: usize)
                -> EvalResult<Flow> {
        let iterable = self.evaluate(iterable)?;

        let items: Vec<Value> = match &iterable {
            Value::List(items) => items.borrow().clone(),
            Value::Dict(map) => map.borrow().keys().map(|key| key.as_str().into()).collect(),
            Value::Str(s) => s.chars().map(|ch| ch.to_string().into()).collect(),
            other => {
                return Err(RuntimeError::TypeError { details: format!("for 'in' expects list, dict, or string, got {}",
                                                                      other.type_name()),
                                                     line });
            },
        };

        for item in items {
            self.assign_or_define(var, item);
            if let Flow::Return(value) = self.execute(body)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }
}
