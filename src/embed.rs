//! The C-compatible embedding boundary.
//!
//! Exports the `AdaScript_*` symbols a host links against: VM lifecycle,
//! source and file evaluation, call-by-name with string marshalling, native
//! string-function registration, and the free function for every buffer the
//! VM hands out.
//!
//! All strings crossing the boundary are NUL-terminated byte strings.
//! Buffers returned by [`AdaScript_Call`] or written through the
//! `error_message` out-parameters are allocated by the VM and must be
//! released with [`AdaScript_FreeString`]; buffers returned by host
//! callbacks must be `malloc`-allocated and are released by the VM.

#![allow(non_snake_case)]

use std::{
    ffi::{CStr, CString},
    os::raw::{c_char, c_int, c_void},
    path::PathBuf,
    ptr,
};

use crate::{
    interpreter::{builtins::native::NativeStringFn, value::core::Value},
    Interpreter,
};

/// The opaque VM handle exposed to C hosts.
pub struct AdaScriptVM {
    interpreter: Interpreter,
}

/// Copies a message into a heap C string, dropping interior NULs.
fn into_c_string(message: &str) -> *mut c_char {
    match CString::new(message.replace('\0', "")) {
        Ok(message) => message.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Writes an error message through an optional out-parameter.
fn set_error(error_message: *mut *mut c_char, message: &str) {
    if !error_message.is_null() {
        unsafe { *error_message = into_c_string(message) };
    }
}

/// Reads a borrowed C string into an owned Rust string.
unsafe fn read_str(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Creates a VM.
///
/// `entry_dir` seeds the directory for relative imports; pass null to use
/// the process working directory. Returns null only if the handle cannot be
/// allocated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_Create(entry_dir: *const c_char) -> *mut AdaScriptVM {
    let dir = if entry_dir.is_null() {
        std::env::current_dir().unwrap_or_default()
    } else {
        PathBuf::from(unsafe { read_str(entry_dir) })
    };
    Box::into_raw(Box::new(AdaScriptVM { interpreter: Interpreter::new(dir), }))
}

/// Destroys a VM created with [`AdaScript_Create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_Destroy(vm: *mut AdaScriptVM) {
    if !vm.is_null() {
        drop(unsafe { Box::from_raw(vm) });
    }
}

/// Evaluates source text against the VM's global environment.
///
/// `filename` is optional; when present its parent directory becomes the
/// base for relative imports. Returns 0 on success; on failure returns
/// non-zero and sets `*error_message` to a heap string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_Eval(vm: *mut AdaScriptVM,
                                        source: *const c_char,
                                        filename: *const c_char,
                                        error_message: *mut *mut c_char)
                                        -> c_int {
    if vm.is_null() || source.is_null() {
        set_error(error_message, "invalid vm or source");
        return 1;
    }
    let vm = unsafe { &mut *vm };
    let source = unsafe { read_str(source) };

    if !filename.is_null() {
        let filename = PathBuf::from(unsafe { read_str(filename) });
        if let Some(parent) = filename.parent() {
            vm.interpreter.set_current_dir(parent);
        }
    }

    match vm.interpreter.eval_source(&source) {
        Ok(()) => 0,
        Err(err) => {
            set_error(error_message, &err.to_string());
            2
        },
    }
}

/// Reads and evaluates a script file, resolving its relative imports
/// against the file's parent directory. Same return convention as
/// [`AdaScript_Eval`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_RunFile(vm: *mut AdaScriptVM,
                                           path: *const c_char,
                                           error_message: *mut *mut c_char)
                                           -> c_int {
    if vm.is_null() || path.is_null() {
        set_error(error_message, "invalid vm or path");
        return 1;
    }
    let vm = unsafe { &mut *vm };
    let path = unsafe { read_str(path) };

    match vm.interpreter.run_file(path) {
        Ok(()) => 0,
        Err(err) => {
            set_error(error_message, &err.to_string());
            2
        },
    }
}

/// Calls a global by name with string arguments.
///
/// Each argument arrives as a C string and becomes a string value; the
/// target must be callable. On success returns the result's display form as
/// a heap string (free with [`AdaScript_FreeString`]); on failure returns
/// null and sets `*error_message`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_Call(vm: *mut AdaScriptVM,
                                        func_name: *const c_char,
                                        args: *const *const c_char,
                                        argc: c_int,
                                        error_message: *mut *mut c_char)
                                        -> *mut c_char {
    if vm.is_null() || func_name.is_null() || argc < 0 || (argc > 0 && args.is_null()) {
        set_error(error_message, "invalid vm or func_name");
        return ptr::null_mut();
    }
    let vm = unsafe { &mut *vm };
    let name = unsafe { read_str(func_name) };

    let mut values = Vec::with_capacity(argc as usize);
    for i in 0..argc as usize {
        let arg = unsafe { *args.add(i) };
        let text = if arg.is_null() { String::new() } else { unsafe { read_str(arg) } };
        values.push(Value::Str(text));
    }

    match vm.interpreter.call_by_name(&name, values) {
        Ok(result) => into_c_string(&result.to_string()),
        Err(err) => {
            set_error(error_message, &err.to_string());
            ptr::null_mut()
        },
    }
}

/// Registers a host string function as a global.
///
/// The callback receives `user_data`, the rendered argument strings, and
/// the argument count; it returns a `malloc`-allocated string that the VM
/// adopts and frees (null becomes the empty string). `arity` of `-1` means
/// variadic. Returns 0 on success.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_RegisterNativeStringFn(vm: *mut AdaScriptVM,
                                                          name: *const c_char,
                                                          arity: c_int,
                                                          func: Option<NativeStringFn>,
                                                          user_data: *mut c_void)
                                                          -> c_int {
    let Some(func) = func else { return 1 };
    if vm.is_null() || name.is_null() {
        return 1;
    }
    let vm = unsafe { &mut *vm };
    let name = unsafe { read_str(name) };
    vm.interpreter.register_native_string_fn(&name, arity, func, user_data);
    0
}

/// Frees a string returned by [`AdaScript_Call`] or written through an
/// `error_message` out-parameter.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdaScript_FreeString(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
