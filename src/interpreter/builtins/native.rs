use std::{
    cell::Cell,
    ffi::{CStr, CString},
    os::raw::{c_char, c_int, c_void},
    ptr,
    rc::Rc,
};

use libloading::Library;
use log::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::{define_namespace, native_entry},
        evaluator::core::{EvalResult, Interpreter},
        value::{core::Value, function::NativeFunction},
    },
};

/// Host callback signature for string-in/string-out native functions.
///
/// The callback receives its registration `user` pointer, a NUL-terminated
/// argument vector, and the argument count, and returns a `malloc`-allocated
/// NUL-terminated string (or null, which the VM treats as an empty string).
/// The VM frees the returned buffer after adopting it.
pub type NativeStringFn =
    unsafe extern "C" fn(*mut c_void, *const *const c_char, c_int) -> *mut c_char;

/// Registrar passed to a plugin's init function: `(name, arity, fn, user)`.
pub type RegisterFn = unsafe extern "C" fn(*const c_char, c_int, NativeStringFn, *mut c_void);

/// The entry point a plugin must export as `AdaScript_ModuleInit`.
type ModuleInitFn = unsafe extern "C" fn(RegisterFn, *mut c_void) -> c_int;

thread_local! {
    // The registrar callback has no context parameter, so the VM being
    // initialized is parked here for the duration of the plugin init call.
    static ACTIVE_VM: Cell<*mut Interpreter> = const { Cell::new(ptr::null_mut()) };
}

/// Defines the `native` namespace dict.
pub(crate) fn install(interpreter: &mut Interpreter) {
    define_namespace(interpreter,
                     "native",
                     vec![native_entry("native.load", 1, native_load)]);
}

/// `native.load(path)`: loads a shared library, resolves its
/// `AdaScript_ModuleInit` export, and lets it register string natives into
/// the VM globals. The library handle stays alive for the life of the VM.
fn native_load(interpreter: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let path = args[0].as_str("native.load path", line)?;

    let library = unsafe { Library::new(path) }.map_err(|err| {
                      RuntimeError::NativeError { details: format!("native.load: {err}"),
                                                  line }
                  })?;
    let init = unsafe { library.get::<ModuleInitFn>(b"AdaScript_ModuleInit") }.map_err(|_| {
                   RuntimeError::NativeError { details: "native.load: AdaScript_ModuleInit not found".to_string(),
                                               line }
               })?;

    ACTIVE_VM.with(|active| active.set(ptr::from_mut(interpreter)));
    let rc = unsafe { init(register_trampoline, ptr::from_mut(interpreter).cast()) };
    ACTIVE_VM.with(|active| active.set(ptr::null_mut()));

    if rc != 0 {
        return Err(RuntimeError::NativeError { details: format!("native.load: init returned {rc}"),
                                               line });
    }

    debug!("native.load: registered plugin {path}");
    interpreter.plugins.push(library);
    Ok(Value::Bool(true))
}

/// The registrar handed to plugin init functions. Forwards to the VM parked
/// in [`ACTIVE_VM`]; outside an init call it is a no-op.
unsafe extern "C" fn register_trampoline(name: *const c_char,
                                         arity: c_int,
                                         func: NativeStringFn,
                                         user: *mut c_void) {
    let vm = ACTIVE_VM.with(Cell::get);
    if vm.is_null() || name.is_null() {
        return;
    }
    let interpreter = unsafe { &mut *vm };
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
    interpreter.register_native_string_fn(&name, arity, func, user);
}

impl Interpreter {
    /// Wraps a host string callback into a [`NativeFunction`] global.
    ///
    /// At call time every argument is rendered to its display string and
    /// marshalled as a NUL-terminated C string. The callback's returned
    /// buffer is adopted as the result string and released with
    /// `libc::free`; a null return becomes the empty string.
    pub(crate) fn register_native_string_fn(&mut self,
                                            name: &str,
                                            arity: c_int,
                                            func: NativeStringFn,
                                            user: *mut c_void) {
        let user = user as usize;
        let wrapper = move |_: &mut Interpreter, args: &[Value], _line: usize| -> EvalResult<Value> {
            let rendered: Vec<CString> =
                args.iter()
                    .map(|value| {
                        CString::new(value.to_string().replace('\0', "")).unwrap_or_default()
                    })
                    .collect();
            let argv: Vec<*const c_char> = rendered.iter().map(|arg| arg.as_ptr()).collect();

            let result = unsafe { func(user as *mut c_void, argv.as_ptr(), argv.len() as c_int) };
            let text = if result.is_null() {
                String::new()
            } else {
                let text = unsafe { CStr::from_ptr(result) }.to_string_lossy().into_owned();
                unsafe { libc::free(result.cast()) };
                text
            };
            Ok(Value::Str(text))
        };

        let native = NativeFunction::new(name, arity, Rc::new(wrapper));
        self.globals.borrow_mut().define(name, Value::Native(Rc::new(native)));
        debug!("registered native string fn '{name}' (arity {arity})");
    }
}
