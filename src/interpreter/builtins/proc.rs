use std::{
    collections::HashMap,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::{define_namespace, native_entry},
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

/// Defines the `proc`, `c`, and `server` namespace dicts.
pub(crate) fn install(interpreter: &mut Interpreter) {
    define_namespace(interpreter,
                     "proc",
                     vec![native_entry("proc.exec", 1, proc_exec)]);
    define_namespace(interpreter, "c", vec![native_entry("c.run", -1, c_run)]);
    define_namespace(interpreter,
                     "server",
                     vec![native_entry("server.serve", -1, server_serve)]);
}

/// `proc.exec(cmd)`: runs a shell command and returns `{status, out}` with
/// stderr folded into the captured output.
fn proc_exec(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let cmd = args[0].as_str("proc.exec cmd", line)?;
    let merged = format!("{cmd} 2>&1");

    let output = shell_command(&merged).output()
                                       .map_err(|_| RuntimeError::NativeError { details: "proc.exec: failed to start process".to_string(),
                                                                                line })?;

    let mut map = HashMap::new();
    map.insert("status".to_string(),
               Value::Number(f64::from(output.status.code().unwrap_or(-1))));
    map.insert("out".to_string(),
               Value::Str(String::from_utf8_lossy(&output.stdout).into_owned()));
    Ok(map.into())
}

#[cfg(windows)]
fn shell_command(merged: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", merged]);
    command
}

#[cfg(not(windows))]
fn shell_command(merged: &str) -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", merged]);
    command
}

/// `c.run(code[, args])`: writes the code to a temporary `.c` file,
/// compiles it with `gcc`, and runs the produced executable with the given
/// string arguments. The child inherits the process's standard streams.
///
/// Returns `{exe, compile_status, run_status, ok}`; a failed compile stops
/// before running and reports `ok: false`.
fn c_run(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.is_empty() || args.len() > 2 {
        return Err(RuntimeError::InvalidArgument { details: "c.run expects (code[, args_list])".to_string(),
                                                   line });
    }
    let code = args[0].as_str("c.run code", line)?;

    let mut run_args = Vec::new();
    if let Some(list) = args.get(1) {
        let items = list.as_list("c.run args", line)?;
        for item in items.borrow().iter() {
            run_args.push(item.as_str("c.run args element", line)?.to_string());
        }
    }

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)
                                 .map_or(0, |elapsed| elapsed.subsec_nanos());
    let base = std::env::temp_dir().join(format!("adascript_c_{}_{nanos}", std::process::id()));
    let c_file = base.with_extension("c");
    let exe_file = if cfg!(windows) { base.with_extension("exe") } else { base };

    std::fs::write(&c_file, code).map_err(|_| RuntimeError::NativeError { details: "c.run: cannot create temp .c file".to_string(),
                                                                          line })?;

    let compile_status = Command::new("gcc").arg(&c_file)
                                            .args(["-O2", "-s", "-o"])
                                            .arg(&exe_file)
                                            .status()
                                            .map_or(-1, |status| status.code().unwrap_or(-1));

    let mut map = HashMap::new();
    map.insert("exe".to_string(),
               Value::Str(exe_file.to_string_lossy().into_owned()));
    map.insert("compile_status".to_string(),
               Value::Number(f64::from(compile_status)));
    if compile_status != 0 {
        map.insert("ok".to_string(), Value::Bool(false));
        return Ok(map.into());
    }

    let run_status = Command::new(&exe_file).args(&run_args)
                                            .status()
                                            .map_or(-1, |status| status.code().unwrap_or(-1));
    map.insert("run_status".to_string(), Value::Number(f64::from(run_status)));
    map.insert("ok".to_string(), Value::Bool(true));
    Ok(map.into())
}

/// `server.serve(...)`: reserved; always errors in this build.
fn server_serve(_: &mut Interpreter, _args: &[Value], line: usize) -> EvalResult<Value> {
    Err(RuntimeError::NativeError { details: "server.serve: not implemented in this build".to_string(),
                                    line })
}
