use std::path::Path;

use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::{define_namespace, native_entry},
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

/// Defines the `fs` namespace dict.
pub(crate) fn install(interpreter: &mut Interpreter) {
    define_namespace(interpreter,
                     "fs",
                     vec![native_entry("fs.read_text", 1, read_text),
                          native_entry("fs.write_text", 2, write_text),
                          native_entry("fs.exists", 1, exists),
                          native_entry("fs.listdir", 1, listdir),
                          native_entry("fs.mkdirs", 1, mkdirs),
                          native_entry("fs.remove", 1, remove),]);
}

/// `fs.read_text(path)`: the file contents as a string.
fn read_text(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.read_text path", line)?;
    std::fs::read_to_string(path).map(Value::from)
                                 .map_err(|_| RuntimeError::NativeError { details: format!("fs.read_text: cannot open {path}"),
                                                                          line })
}

/// `fs.write_text(path, text)`: writes (or overwrites) a text file.
fn write_text(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.write_text path", line)?;
    let text = args[1].as_str("fs.write_text text", line)?;
    std::fs::write(path, text).map_err(|_| RuntimeError::NativeError { details: format!("fs.write_text: cannot write {path}"),
                                                                       line })?;
    Ok(Value::Bool(true))
}

/// `fs.exists(path)`.
fn exists(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.exists path", line)?;
    Ok(Value::Bool(Path::new(path).exists()))
}

/// `fs.listdir(path)`: the entry names of a directory as a list of strings.
fn listdir(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.listdir path", line)?;
    let entries = std::fs::read_dir(path).map_err(|_| RuntimeError::NativeError { details: format!("fs.listdir: cannot read {path}"),
                                                                                  line })?;
    let mut names = Vec::new();
    for entry in entries.flatten() {
        names.push(Value::Str(entry.file_name().to_string_lossy().into_owned()));
    }
    Ok(names.into())
}

/// `fs.mkdirs(path)`: creates a directory and any missing parents.
fn mkdirs(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.mkdirs path", line)?;
    std::fs::create_dir_all(path).map_err(|_| RuntimeError::NativeError { details: format!("fs.mkdirs: cannot create {path}"),
                                                                          line })?;
    Ok(Value::Bool(true))
}

/// `fs.remove(path)`: removes a file or a directory tree, returning the
/// number of entries removed (0 when the path does not exist).
fn remove(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("fs.remove path", line)?;
    let target = Path::new(path);

    let removed = if target.is_dir() {
        let count = count_tree(target);
        std::fs::remove_dir_all(target).map_err(|_| RuntimeError::NativeError { details: "fs.remove failed".to_string(),
                                                                                line })?;
        count
    } else if target.exists() {
        std::fs::remove_file(target).map_err(|_| RuntimeError::NativeError { details: "fs.remove failed".to_string(),
                                                                             line })?;
        1
    } else {
        0
    };
    Ok(Value::Number(removed as f64))
}

/// Counts a directory tree's entries, the directory itself included.
fn count_tree(path: &Path) -> u64 {
    let mut count = 1;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let child = entry.path();
            if child.is_dir() {
                count += count_tree(&child);
            } else {
                count += 1;
            }
        }
    }
    count
}
