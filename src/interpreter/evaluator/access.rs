use std::rc::Rc;

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        builtins::core::split_string,
        evaluator::core::{EvalResult, Interpreter},
        value::{core::Value, function::NativeFunction},
    },
    util::num::f64_to_index,
};

impl Interpreter {
    /// Evaluates a property read.
    ///
    /// On an instance, fields take precedence over methods; a method hit
    /// produces a bound callable with `this` installed in a fresh frame. On
    /// a dict the name is a key lookup. On a string the only property is the
    /// synthesized `split` method. Any other target is a type error.
    pub(crate) fn eval_get(&mut self, object: &Expr, name: &str, line: usize) -> EvalResult<Value> {
        let object = self.evaluate(object)?;
        match &object {
            Value::Instance(instance) => {
                if let Some(value) = instance.fields.borrow().get(name) {
                    return Ok(value.clone());
                }
                if let Some(method) = instance.class.find_method(name) {
                    return Ok(Value::Function(Self::bind_method(&method, object.clone())));
                }
                Err(RuntimeError::UndefinedProperty { name: name.to_string(),
                                                      line })
            },
            Value::Dict(map) => {
                map.borrow()
                   .get(name)
                   .cloned()
                   .ok_or_else(|| RuntimeError::MissingKey { key: name.to_string(),
                                                             line })
            },
            Value::Str(s) => {
                if name == "split" {
                    return Ok(string_split_method(s.clone()));
                }
                Err(RuntimeError::UndefinedProperty { name: name.to_string(),
                                                      line })
            },
            other => Err(RuntimeError::TypeError { details: format!("only instances, dicts, and strings have properties, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Evaluates a property write.
    ///
    /// Instances create or overwrite fields; dicts create or overwrite
    /// keys. Nothing else supports property assignment.
    pub(crate) fn eval_set(&mut self,
                           object: &Expr,
                           name: &str,
                           value: &Expr,
                           line: usize)
                           -> EvalResult<Value> {
        let object = self.evaluate(object)?;
        let value = self.evaluate(value)?;
        match &object {
            Value::Instance(instance) => {
                instance.fields.borrow_mut().insert(name.to_string(), value.clone());
                Ok(value)
            },
            Value::Dict(map) => {
                map.borrow_mut().insert(name.to_string(), value.clone());
                Ok(value)
            },
            other => Err(RuntimeError::TypeError { details: format!("only instances and dicts support property assignment, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Evaluates an index read: lists by bounds-checked non-negative index,
    /// dicts by string key (a missing key fails).
    pub(crate) fn eval_index(&mut self,
                             object: &Expr,
                             index: &Expr,
                             line: usize)
                             -> EvalResult<Value> {
        let object = self.evaluate(object)?;
        let index = self.evaluate(index)?;
        match &object {
            Value::List(items) => {
                let i = f64_to_index(index.as_number("list index", line)?, line)?;
                let items = items.borrow();
                items.get(i)
                     .cloned()
                     .ok_or(RuntimeError::IndexOutOfBounds { index: i,
                                                             len: items.len(),
                                                             line })
            },
            Value::Dict(map) => {
                let key = index.as_str("dict index", line)?;
                map.borrow()
                   .get(key)
                   .cloned()
                   .ok_or_else(|| RuntimeError::MissingKey { key: key.to_string(),
                                                             line })
            },
            other => Err(RuntimeError::TypeError { details: format!("indexing is supported on lists and dicts, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }

    /// Evaluates an index write.
    ///
    /// Containers share storage, so whatever expression produced the list or
    /// dict, writing through the handle persists. Lists accept indices up to
    /// their length; writing at exactly the length appends, anything past it
    /// is out of range. Dict writes create or overwrite the key.
    pub(crate) fn eval_index_set(&mut self,
                                 object: &Expr,
                                 index: &Expr,
                                 value: &Expr,
                                 line: usize)
                                 -> EvalResult<Value> {
        let index = self.evaluate(index)?;
        let value = self.evaluate(value)?;
        let object = self.evaluate(object)?;
        match &object {
            Value::List(items) => {
                let i = f64_to_index(index.as_number("list index", line)?, line)?;
                let mut items = items.borrow_mut();
                if i == items.len() {
                    items.push(value.clone());
                } else if i < items.len() {
                    items[i] = value.clone();
                } else {
                    return Err(RuntimeError::IndexOutOfBounds { index: i,
                                                                len: items.len(),
                                                                line });
                }
                Ok(value)
            },
            Value::Dict(map) => {
                let key = index.as_str("dict index", line)?;
                map.borrow_mut().insert(key.to_string(), value.clone());
                Ok(value)
            },
            other => Err(RuntimeError::TypeError { details: format!("index assignment is supported on lists and dicts, got {}",
                                                                    other.type_name()),
                                                   line }),
        }
    }
}

/// Builds the curried `split` method for a string value.
///
/// `"a b".split()` splits on whitespace; `"a,b".split(",")` splits on the
/// separator. The base string is captured at property-access time.
fn string_split_method(base: String) -> Value {
    let native = NativeFunction::new("string.split",
                                     -1,
                                     Rc::new(move |_: &mut Interpreter,
                                                   args: &[Value],
                                                   line: usize| {
                                         let separator = match args {
                                             [] => None,
                                             [sep] => {
                                                 Some(sep.as_str("split separator", line)?
                                                         .to_string())
                                             },
                                             _ => {
                                                 return Err(RuntimeError::InvalidArgument { details: "split expects at most 1 argument".to_string(),
                                                                                            line });
                                             },
                                         };
                                         Ok(split_string(&base, separator.as_deref()))
                                     }));
    Value::Native(Rc::new(native))
}
