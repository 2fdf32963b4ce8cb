use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    io::{self, Write},
    path::PathBuf,
    rc::Rc,
};

use crate::{
    ast::{Expr, Stmt},
    error::RuntimeError,
    interpreter::{builtins, environment::Environment, value::core::Value},
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Control signal produced by statement execution.
///
/// `return` is not an error: it is a dedicated variant of the executor's
/// result that unwinds to the nearest function invocation, which converts it
/// into the call's value. Every other frame passes it through unchanged.
pub enum Flow {
    /// Execution fell through normally.
    Normal,
    /// A `return` statement fired, carrying the returned value.
    Return(Value),
}

/// The virtual machine state.
///
/// One `Interpreter` owns a global environment (with all builtins
/// installed), the current lexical environment, the directory used to
/// resolve relative imports, an optional builtins root, the registry of
/// already-imported files, the native plugin handles, and the sink that
/// `print` writes to.
///
/// Execution is strictly single-threaded; all of this state is mutated
/// without locking, and a host sharing one VM across threads must serialize
/// access externally.
pub struct Interpreter {
    /// The global environment. Builtins and top-level declarations live
    /// here, and embedding calls resolve names against it.
    pub globals:             Rc<RefCell<Environment>>,
    /// The environment of the currently executing scope.
    pub(crate) env:          Rc<RefCell<Environment>>,
    /// Directory against which relative imports resolve. Tracks the file
    /// currently executing.
    pub(crate) current_dir:  PathBuf,
    /// Optional root for `import "builtins/..."` paths.
    pub(crate) builtins_dir: Option<PathBuf>,
    /// Absolute normalized paths of every file already executed. Grows for
    /// the life of the VM.
    pub(crate) loaded_files: HashSet<PathBuf>,
    /// Native plugin libraries loaded through `native.load`. Held so their
    /// registered functions stay valid for the life of the VM.
    pub(crate) plugins:      Vec<libloading::Library>,
    /// Where `print` and input prompts are written.
    pub(crate) out:          Box<dyn Write>,
}

impl Interpreter {
    /// Creates a VM whose relative imports resolve against `entry_dir` and
    /// whose output goes to standard out.
    #[must_use]
    pub fn new(entry_dir: impl Into<PathBuf>) -> Self {
        Self::with_output(entry_dir, Box::new(io::stdout()))
    }

    /// Creates a VM writing `print` output to the given sink. Used by tests
    /// and by embedders that capture script output.
    #[must_use]
    pub fn with_output(entry_dir: impl Into<PathBuf>, out: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        let mut interpreter = Self { env: Rc::clone(&globals),
                                     globals,
                                     current_dir: entry_dir.into(),
                                     builtins_dir: None,
                                     loaded_files: HashSet::new(),
                                     plugins: Vec::new(),
                                     out };
        builtins::install(&mut interpreter);
        interpreter
    }

    /// Sets the root directory that `import "builtins/..."` paths resolve
    /// against.
    pub fn set_builtins_dir(&mut self, dir: impl Into<PathBuf>) {
        self.builtins_dir = Some(dir.into());
    }

    /// Replaces the directory used for relative import resolution.
    pub fn set_current_dir(&mut self, dir: impl Into<PathBuf>) {
        self.current_dir = dir.into();
    }

    /// Executes a parsed program against the VM's global environment.
    ///
    /// A top-level `return` stops execution of the remaining statements.
    ///
    /// # Errors
    /// Returns the first runtime error raised by any statement.
    pub fn interpret(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for statement in statements {
            if let Flow::Return(_) = self.execute(statement)? {
                break;
            }
        }
        Ok(())
    }

    /// Lexes, parses, and executes source text against the VM's global
    /// environment.
    ///
    /// # Errors
    /// Returns the parse or runtime error that stopped execution.
    pub fn eval_source(&mut self, source: &str) -> Result<(), Box<dyn std::error::Error>> {
        let statements = crate::compile(source)?;
        self.interpret(&statements)?;
        Ok(())
    }

    /// Reads and executes a script file, resolving its relative imports
    /// against the file's parent directory.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, or the parse or
    /// runtime error that stopped execution.
    pub fn run_file(&mut self, path: impl Into<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.into();
        let source =
            std::fs::read_to_string(&path).map_err(|_| format!("failed to open {}", path.display()))?;
        if let Some(parent) = path.parent() {
            self.current_dir = parent.to_path_buf();
        }
        self.eval_source(&source)
    }

    /// Resolves a global name and invokes it with the given arguments.
    ///
    /// This is the engine behind the embedding `Call` entry point; the name
    /// must resolve to a callable value (function, native, or class).
    ///
    /// # Errors
    /// Returns an error when the name is undefined, the value is not
    /// callable, or the invocation itself fails.
    pub fn call_by_name(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let callee = self.globals
                         .borrow()
                         .get(name)
                         .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string(),
                                                                          line: 0, })?;
        self.call_value(&callee, args, 0)
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. The
    /// evaluator dispatches on the expression variant; the heavier cases
    /// (binary operators, calls, property and index access) live in their
    /// own modules.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            // Reading an unknown name yields null; only assignment to an
            // unknown name is an error.
            Expr::Variable { name, .. } => Ok(self.env.borrow().get(name).unwrap_or(Value::Null)),
            Expr::Assign { name, value, line } => {
                let value = self.evaluate(value)?;
                if self.env.borrow_mut().assign(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::UndefinedVariable { name: name.clone(),
                                                          line: *line, })
                }
            },
            Expr::Grouping { expr, .. } => self.evaluate(expr),
            Expr::Unary { op, expr, line } => {
                let value = self.evaluate(expr)?;
                Self::eval_unary(*op, &value, *line)
            },
            Expr::Binary { left,
                           op,
                           right,
                           line, } => self.eval_binary_expr(left, *op, right, *line),
            Expr::Call { callee, args, line } => self.eval_call(callee, args, *line),
            Expr::Get { object, name, line } => self.eval_get(object, name, *line),
            Expr::Set { object,
                        name,
                        value,
                        line, } => self.eval_set(object, name, value, *line),
            Expr::Index { object, index, line } => self.eval_index(object, index, *line),
            Expr::IndexSet { object,
                             index,
                             value,
                             line, } => self.eval_index_set(object, index, value, *line),
            Expr::ListLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(values.into())
            },
            Expr::DictLiteral { entries, .. } => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), self.evaluate(value)?);
                }
                Ok(map.into())
            },
        }
    }

    /// Assigns `name` if any enclosing scope defines it, otherwise defines
    /// it in the current scope. Used by multi-assign targets and loop
    /// variables.
    pub(crate) fn assign_or_define(&mut self, name: &str, value: Value) {
        let assigned = self.env.borrow_mut().assign(name, value.clone());
        if !assigned {
            self.env.borrow_mut().define(name, value);
        }
    }
}
