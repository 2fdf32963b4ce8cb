use crate::interpreter::evaluator::core::Interpreter;

/// The flat builtins scripts use directly: `print`, `len`, `input`, `map`,
/// `range`, the casts, string and container helpers, and `sqrt_bs`.
pub mod core;

/// The `fs` namespace: text file reading and writing, existence checks,
/// directory listing and creation, and removal.
pub mod fs;

/// The `requests` and `content` namespaces: HTTP(S) requests with `file://`
/// short-circuiting, and the tolerant `content.get` fetcher.
pub mod http;

/// The `native` namespace: the dynamic plugin loader and the registrar it
/// hands to plugin init functions.
pub mod native;

/// The `proc`, `c`, and `server` namespaces: process execution, the
/// compile-and-run C helper, and the server stub.
pub mod proc;

/// Installs every builtin global into a fresh VM.
pub(crate) fn install(interpreter: &mut Interpreter) {
    core::install(interpreter);
    fs::install(interpreter);
    http::install(interpreter);
    proc::install(interpreter);
    native::install(interpreter);
}
