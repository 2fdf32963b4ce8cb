use std::{
    ffi::{CStr, CString},
    os::raw::{c_char, c_int, c_void},
    ptr,
};

use adascript::{
    embed::{
        AdaScript_Call, AdaScript_Create, AdaScript_Destroy, AdaScript_Eval, AdaScript_FreeString,
        AdaScript_RegisterNativeStringFn, AdaScript_RunFile, AdaScriptVM,
    },
    interpreter::value::core::Value,
    Interpreter,
};

/// Concatenates all argument strings into one `malloc`-allocated buffer,
/// matching the allocation contract the VM expects from host callbacks.
unsafe extern "C" fn c_concat(_user: *mut c_void,
                              argv: *const *const c_char,
                              argc: c_int)
                              -> *mut c_char {
    let mut out = String::new();
    for i in 0..argc as usize {
        let arg = unsafe { *argv.add(i) };
        if !arg.is_null() {
            out.push_str(&unsafe { CStr::from_ptr(arg) }.to_string_lossy());
        }
    }

    let bytes = out.as_bytes();
    let buffer = unsafe { libc::malloc(bytes.len() + 1) }.cast::<u8>();
    if buffer.is_null() {
        return ptr::null_mut();
    }
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
        *buffer.add(bytes.len()) = 0;
    }
    buffer.cast()
}

fn create_vm() -> *mut AdaScriptVM {
    let vm = unsafe { AdaScript_Create(ptr::null()) };
    assert!(!vm.is_null());
    vm
}

fn eval(vm: *mut AdaScriptVM, source: &str) {
    let source = CString::new(source).unwrap();
    let mut err: *mut c_char = ptr::null_mut();
    let rc = unsafe { AdaScript_Eval(vm, source.as_ptr(), ptr::null(), &mut err) };
    if rc != 0 {
        let message = unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned();
        unsafe { AdaScript_FreeString(err) };
        panic!("Eval failed ({rc}): {message}");
    }
}

fn call(vm: *mut AdaScriptVM, name: &str, args: &[&str]) -> Result<String, String> {
    let name = CString::new(name).unwrap();
    let owned: Vec<CString> = args.iter().map(|a| CString::new(*a).unwrap()).collect();
    let argv: Vec<*const c_char> = owned.iter().map(|a| a.as_ptr()).collect();
    let mut err: *mut c_char = ptr::null_mut();

    let result = unsafe {
        AdaScript_Call(vm, name.as_ptr(), argv.as_ptr(), argv.len() as c_int, &mut err)
    };
    if result.is_null() {
        let message = if err.is_null() {
            "(no message)".to_string()
        } else {
            unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
        };
        unsafe { AdaScript_FreeString(err) };
        return Err(message);
    }
    let text = unsafe { CStr::from_ptr(result) }.to_string_lossy().into_owned();
    unsafe { AdaScript_FreeString(result) };
    Ok(text)
}

#[test]
fn eval_then_call_by_name() {
    let vm = create_vm();
    eval(vm, "func add(a, b){ return float(a) + float(b); }");
    assert_eq!(call(vm, "add", &["2", "3"]).unwrap(), "5");
    unsafe { AdaScript_Destroy(vm) };
}

#[test]
fn registered_native_reaches_script_code() {
    let vm = create_vm();
    let rc = unsafe {
        AdaScript_RegisterNativeStringFn(vm,
                                         c"c_concat".as_ptr(),
                                         -1,
                                         Some(c_concat),
                                         ptr::null_mut())
    };
    assert_eq!(rc, 0);

    eval(vm, r#"func greet(n){ return c_concat("Hello, ", n); }"#);
    assert_eq!(call(vm, "greet", &["World"]).unwrap(), "Hello, World");
    assert_eq!(call(vm, "c_concat", &["a", "b", "c"]).unwrap(), "abc");
    unsafe { AdaScript_Destroy(vm) };
}

#[test]
fn call_reports_errors_for_bad_targets() {
    let vm = create_vm();
    eval(vm, "let not_callable = 3;");

    let missing = call(vm, "no_such_function", &[]).unwrap_err();
    assert!(missing.contains("Undefined"), "got: {missing}");

    let not_callable = call(vm, "not_callable", &[]).unwrap_err();
    assert!(not_callable.contains("call"), "got: {not_callable}");
    unsafe { AdaScript_Destroy(vm) };
}

#[test]
fn eval_reports_errors_through_the_out_parameter() {
    let vm = create_vm();
    let source = CString::new("let x = ;").unwrap();
    let mut err: *mut c_char = ptr::null_mut();
    let rc = unsafe { AdaScript_Eval(vm, source.as_ptr(), ptr::null(), &mut err) };
    assert_ne!(rc, 0);
    assert!(!err.is_null());
    let message = unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned();
    assert!(message.contains("Expected expression"), "got: {message}");
    unsafe { AdaScript_FreeString(err) };
    unsafe { AdaScript_Destroy(vm) };
}

#[test]
fn run_file_executes_scripts() {
    let dir = std::env::temp_dir().join(format!("adascript_embed_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("answer.ad");
    std::fs::write(&path, "func answer(){ return 42; }\n").unwrap();

    let vm = create_vm();
    let c_path = CString::new(path.to_string_lossy().into_owned()).unwrap();
    let mut err: *mut c_char = ptr::null_mut();
    let rc = unsafe { AdaScript_RunFile(vm, c_path.as_ptr(), &mut err) };
    assert_eq!(rc, 0);
    assert_eq!(call(vm, "answer", &[]).unwrap(), "42");

    unsafe { AdaScript_Destroy(vm) };
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_file_reports_missing_files() {
    let vm = create_vm();
    let c_path = CString::new("/definitely/not/here.ad").unwrap();
    let mut err: *mut c_char = ptr::null_mut();
    let rc = unsafe { AdaScript_RunFile(vm, c_path.as_ptr(), &mut err) };
    assert_ne!(rc, 0);
    assert!(!err.is_null());
    unsafe { AdaScript_FreeString(err) };
    unsafe { AdaScript_Destroy(vm) };
}

#[test]
fn rust_hosts_can_call_without_the_c_layer() {
    let mut interpreter = Interpreter::new(std::env::temp_dir());
    interpreter.eval_source("func shout(s){ return s + \"!\"; }").unwrap();

    let result = interpreter.call_by_name("shout", vec![Value::from("hey")]).unwrap();
    assert_eq!(result.to_string(), "hey!");

    let class_result = interpreter.eval_source("class Pair { func init(){ this.n = 2; } }");
    assert!(class_result.is_ok());
    let instance = interpreter.call_by_name("Pair", Vec::new()).unwrap();
    assert_eq!(instance.to_string(), "<instance>");
}
