use std::{collections::HashMap, io::Write as _, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        value::{core::Value, function::NativeFunction},
    },
    util::num::f64_to_i64,
};

/// Plain function type for table-registered builtins.
///
/// A builtin receives the interpreter, the evaluated argument values, and
/// the call-site line for error reporting.
pub(crate) type BuiltinFn = fn(&mut Interpreter, &[Value], usize) -> EvalResult<Value>;

struct BuiltinDef {
    name:  &'static str,
    arity: i32,
    func:  BuiltinFn,
}

/// The flat builtins, with their arities. `-1` marks a variadic builtin
/// that validates its own argument count; fixed arities are enforced by the
/// call dispatcher.
static BUILTIN_TABLE: &[BuiltinDef] = &[
    BuiltinDef { name: "print", arity: -1, func: print },
    BuiltinDef { name: "len", arity: 1, func: len },
    BuiltinDef { name: "input", arity: -1, func: input },
    BuiltinDef { name: "map", arity: 2, func: map },
    BuiltinDef { name: "range", arity: -1, func: range },
    BuiltinDef { name: "int", arity: 1, func: int_cast },
    BuiltinDef { name: "float", arity: 1, func: float_cast },
    BuiltinDef { name: "str", arity: 1, func: str_cast },
    BuiltinDef { name: "split", arity: -1, func: split },
    BuiltinDef { name: "join", arity: 2, func: join },
    BuiltinDef { name: "has", arity: 2, func: has },
    BuiltinDef { name: "abs", arity: 1, func: abs },
    BuiltinDef { name: "sqrt_bs", arity: 1, func: sqrt_bs },
    BuiltinDef { name: "list_input", arity: -1, func: list_input },
];

/// Defines every flat builtin in the interpreter's global environment.
pub(crate) fn install(interpreter: &mut Interpreter) {
    for def in BUILTIN_TABLE {
        let native = NativeFunction::new(def.name, def.arity, Rc::new(def.func));
        interpreter.globals
                   .borrow_mut()
                   .define(def.name, Value::Native(Rc::new(native)));
    }
}

/// Wraps a builtin into a `(key, Value)` pair for a namespace dict.
///
/// The dict key is the part after the last dot of the display name, so
/// `"fs.read_text"` registers under `read_text`.
pub(crate) fn native_entry(name: &'static str, arity: i32, func: BuiltinFn) -> (String, Value) {
    let key = name.rsplit('.').next().unwrap_or(name).to_string();
    let native = NativeFunction::new(name, arity, Rc::new(func));
    (key, Value::Native(Rc::new(native)))
}

/// Defines a namespace dict (such as `fs` or `requests`) in the globals.
pub(crate) fn define_namespace(interpreter: &mut Interpreter,
                               name: &str,
                               entries: Vec<(String, Value)>) {
    let map: HashMap<String, Value> = entries.into_iter().collect();
    interpreter.globals.borrow_mut().define(name, map.into());
}

/// Renders a value for `print`.
///
/// Scalars use the display rule. Lists and dicts get a shallow preview:
/// numbers plain, strings quoted, and anything nested as `...`.
pub(crate) fn preview(value: &Value) -> String {
    fn element(value: &Value) -> String {
        match value {
            Value::Number(n) => n.to_string(),
            Value::Str(s) => format!("\"{s}\""),
            _ => "...".to_string(),
        }
    }

    match value {
        Value::List(items) => {
            let rendered: Vec<String> = items.borrow().iter().map(element).collect();
            format!("[{}]", rendered.join(", "))
        },
        Value::Dict(map) => {
            let rendered: Vec<String> = map.borrow()
                                           .iter()
                                           .map(|(key, value)| format!("{key}: {}", element(value)))
                                           .collect();
            format!("{{{}}}", rendered.join(", "))
        },
        other => other.to_string(),
    }
}

/// `print(...)`: writes the display-formatted arguments joined by spaces,
/// then a newline, to the VM's output sink.
fn print(interpreter: &mut Interpreter, args: &[Value], _line: usize) -> EvalResult<Value> {
    let rendered: Vec<String> = args.iter().map(preview).collect();
    let _ = writeln!(interpreter.out, "{}", rendered.join(" "));
    let _ = interpreter.out.flush();
    Ok(Value::Null)
}

/// `len(x)`: element count of a list or dict, byte length of a string.
fn len(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
        Value::Dict(map) => Ok(Value::Number(map.borrow().len() as f64)),
        Value::Str(s) => Ok(Value::Number(s.len() as f64)),
        other => Err(RuntimeError::TypeError { details: format!("len on unsupported type {}",
                                                                other.type_name()),
                                               line }),
    }
}

/// `input([prompt])`: writes the optional prompt, then reads one line from
/// standard input (without the trailing newline).
fn input(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.len() > 1 {
        return Err(RuntimeError::InvalidArgument { details: "input expects 0 or 1 argument(s)".to_string(),
                                                   line });
    }
    if let Some(prompt) = args.first() {
        let prompt = prompt.as_str("input prompt", line)?;
        let _ = write!(interpreter.out, "{prompt}");
        let _ = interpreter.out.flush();
    }
    Ok(Value::Str(read_stdin_line()))
}

/// `map(callable, list)`: applies the callable to each element and collects
/// the results into a new list.
fn map(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if !matches!(args[0], Value::Function(_) | Value::Native(_)) {
        return Err(RuntimeError::InvalidArgument { details: format!("map first argument must be callable, got {}",
                                                                    args[0].type_name()),
                                                   line });
    }
    let items = args[1].as_list("map second argument", line)?;
    let snapshot: Vec<Value> = items.borrow().clone();

    let mut out = Vec::with_capacity(snapshot.len());
    for item in snapshot {
        out.push(interpreter.call_value(&args[0], vec![item], line)?);
    }
    Ok(out.into())
}

/// `range(stop)`, `range(start, stop)`, `range(start, stop, step)`: the
/// half-open numeric sequence. The step must be non-zero; a negative step
/// counts down.
fn range(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let bound = |value: &Value| -> EvalResult<i64> {
        f64_to_i64(value.as_number("range bound", line)?, line)
    };

    let (start, stop, step) = match args {
        [stop] => (0, bound(stop)?, 1),
        [start, stop] => (bound(start)?, bound(stop)?, 1),
        [start, stop, step] => (bound(start)?, bound(stop)?, bound(step)?),
        _ => {
            return Err(RuntimeError::InvalidArgument { details: "range expects 1 to 3 arguments".to_string(),
                                                       line });
        },
    };
    if step == 0 {
        return Err(RuntimeError::InvalidArgument { details: "range step cannot be 0".to_string(),
                                                   line });
    }

    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(Value::Number(i as f64));
        i += step;
    }
    Ok(out.into())
}

/// `int(x)`: truncates a number toward zero, parses a string, or widens a
/// bool.
fn int_cast(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.trunc())),
        Value::Str(s) => {
            let parsed: f64 = s.trim().parse().map_err(|_| RuntimeError::TypeError { details: format!("int() cannot parse '{s}'"),
                                                                                     line })?;
            Ok(Value::Number(parsed.trunc()))
        },
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(RuntimeError::TypeError { details: format!("int() unsupported type {}",
                                                                other.type_name()),
                                               line }),
    }
}

/// `float(x)`: passes numbers through, parses strings, widens bools.
fn float_cast(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Str(s) => {
            let parsed: f64 = s.trim().parse().map_err(|_| RuntimeError::TypeError { details: format!("float() cannot parse '{s}'"),
                                                                                     line })?;
            Ok(Value::Number(parsed))
        },
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(RuntimeError::TypeError { details: format!("float() unsupported type {}",
                                                                other.type_name()),
                                               line }),
    }
}

/// `str(x)`: the canonical display form.
fn str_cast(_: &mut Interpreter, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Str(args[0].to_string()))
}

/// Splits `s` into a list of strings.
///
/// Without a separator (or with an empty one) the split is on whitespace
/// runs. With a separator, adjacent separators produce empty strings and a
/// trailing separator produces a trailing empty string.
pub(crate) fn split_string(s: &str, separator: Option<&str>) -> Value {
    let parts: Vec<Value> = match separator {
        None | Some("") => s.split_whitespace().map(Value::from).collect(),
        Some(sep) => s.split(sep).map(Value::from).collect(),
    };
    parts.into()
}

/// `split(string[, sep])`: the free-function form of string splitting.
fn split(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let (s, separator) = match args {
        [s] => (s.as_str("split first argument", line)?, None),
        [s, sep] => (s.as_str("split first argument", line)?,
                     Some(sep.as_str("split separator", line)?)),
        _ => {
            return Err(RuntimeError::InvalidArgument { details: "split expects (string[, sep])".to_string(),
                                                       line });
        },
    };
    Ok(split_string(s, separator))
}

/// `join(list, sep)`: concatenates a list of strings with a separator.
fn join(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let items = args[0].as_list("join first argument", line)?;
    let separator = args[1].as_str("join separator", line)?;

    let mut parts = Vec::with_capacity(items.borrow().len());
    for item in items.borrow().iter() {
        parts.push(item.as_str("join list element", line)?.to_string());
    }
    Ok(Value::Str(parts.join(separator)))
}

/// `has(dict, key)`: whether the dict contains the key.
fn has(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let map = args[0].as_dict("has first argument", line)?;
    let key = args[1].as_str("has key", line)?;
    let present = map.borrow().contains_key(key);
    Ok(Value::Bool(present))
}

/// `abs(x)`: absolute value of a number.
fn abs(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::Number(args[0].as_number("abs argument", line)?.abs()))
}

/// `sqrt_bs(x)`: square root by bisection, 100 iterations.
fn sqrt_bs(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let x = args[0].as_number("sqrt_bs argument", line)?;
    if x < 0.0 {
        return Err(RuntimeError::InvalidArgument { details: "sqrt_bs domain error".to_string(),
                                                   line });
    }
    if x == 0.0 {
        return Ok(Value::Number(0.0));
    }

    let mut lo = 0.0_f64;
    let mut hi = x.max(1.0);
    for _ in 0..100 {
        let mid = (lo + hi) / 2.0;
        if mid * mid >= x {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(Value::Number((lo + hi) / 2.0))
}

/// `list_input(prompt[, sep[, type]])`: prompts, reads one line, splits it,
/// and casts each token. `type` is one of `"auto"`, `"int"`, `"float"`,
/// `"str"`; `auto` keeps numeric-looking tokens as numbers. An empty
/// separator splits on whitespace unless the line contains a comma.
fn list_input(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.is_empty() || args.len() > 3 {
        return Err(RuntimeError::InvalidArgument { details: "list_input expects (prompt[, sep[, type]])".to_string(),
                                                   line });
    }
    let prompt = args[0].as_str("list_input prompt", line)?;
    let mut separator = match args.get(1) {
        Some(sep) => sep.as_str("list_input separator", line)?.to_string(),
        None => String::new(),
    };
    let cast_kind = match args.get(2) {
        Some(kind) => kind.as_str("list_input type", line)?.to_string(),
        None => "auto".to_string(),
    };

    let _ = write!(interpreter.out, "{prompt}");
    let _ = interpreter.out.flush();
    let text = read_stdin_line();

    if separator.is_empty() && text.contains(',') {
        separator = ",".to_string();
    }

    let cast = |token: &str| -> EvalResult<Value> {
        match cast_kind.as_str() {
            "str" => Ok(token.into()),
            "int" => {
                let parsed: f64 =
                    token.parse().map_err(|_| RuntimeError::InvalidArgument { details: format!("list_input: invalid int '{token}'"),
                                                                              line })?;
                Ok(Value::Number(parsed.trunc()))
            },
            "float" => {
                let parsed: f64 =
                    token.parse().map_err(|_| RuntimeError::InvalidArgument { details: format!("list_input: invalid float '{token}'"),
                                                                              line })?;
                Ok(Value::Number(parsed))
            },
            // auto: numeric-looking tokens become numbers, the rest strings
            _ => Ok(token.parse::<f64>().map_or_else(|_| token.into(), Value::Number)),
        }
    };

    let mut out = Vec::new();
    if separator.is_empty() {
        for token in text.split_whitespace() {
            out.push(cast(token)?);
        }
    } else {
        for token in text.split(separator.as_str()) {
            let token = token.trim();
            if !token.is_empty() {
                out.push(cast(token)?);
            }
        }
    }
    Ok(out.into())
}

/// Reads one line from standard input, stripping the trailing newline.
fn read_stdin_line() -> String {
    let mut buffer = String::new();
    let _ = std::io::stdin().read_line(&mut buffer);
    while buffer.ends_with('\n') || buffer.ends_with('\r') {
        buffer.pop();
    }
    buffer
}
