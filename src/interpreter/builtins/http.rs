use std::{collections::HashMap, path::Path};

use crate::{
    error::RuntimeError,
    interpreter::{
        builtins::core::{define_namespace, native_entry},
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

/// Defines the `requests` and `content` namespace dicts.
pub(crate) fn install(interpreter: &mut Interpreter) {
    define_namespace(interpreter,
                     "requests",
                     vec![native_entry("requests.get", 1, requests_get),
                          native_entry("requests.post", -1, requests_post),
                          native_entry("requests.request", -1, requests_request),]);
    define_namespace(interpreter,
                     "content",
                     vec![native_entry("content.get", 1, content_get)]);
}

/// Performs an HTTP request (or a `file://` read) and returns
/// `(status, body)`, with transport failures as plain messages.
///
/// Redirects are followed by the client; non-2xx statuses are not errors,
/// the response is returned as-is.
fn fetch(method: &str,
         url: &str,
         body: Option<&str>,
         headers: &[(String, String)])
         -> Result<(f64, String), String> {
    if let Some(path) = url.strip_prefix("file://") {
        return std::fs::read_to_string(path).map(|text| (200.0, text))
                                            .map_err(|_| format!("cannot open file {path}"));
    }

    let mut request = ureq::request(method, url);
    for (name, value) in headers {
        request = request.set(name, value);
    }

    let response = match body {
        Some(body) => request.send_string(body),
        None => request.call(),
    };
    let response = match response {
        Ok(response) | Err(ureq::Error::Status(_, response)) => response,
        Err(err) => return Err(err.to_string()),
    };

    let status = f64::from(response.status());
    let text = response.into_string().map_err(|err| err.to_string())?;
    Ok((status, text))
}

/// Builds the `{status, text}` response dict.
fn response_dict(status: f64, text: String) -> Value {
    let mut map = HashMap::new();
    map.insert("status".to_string(), Value::Number(status));
    map.insert("text".to_string(), Value::Str(text));
    map.into()
}

/// Extracts string-valued headers from a dict argument. Non-string values
/// are skipped.
fn headers_from(value: &Value, what: &str, line: usize) -> EvalResult<Vec<(String, String)>> {
    let map = value.as_dict(what, line)?;
    let headers = map.borrow()
                     .iter()
                     .filter_map(|(name, value)| match value {
                         Value::Str(s) => Some((name.clone(), s.clone())),
                         _ => None,
                     })
                     .collect();
    Ok(headers)
}

/// `requests.get(url)` → `{status, text}`.
fn requests_get(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let url = args[0].as_str("requests.get url", line)?;
    let (status, text) =
        fetch("GET", url, None, &[]).map_err(|details| RuntimeError::NativeError { details: format!("requests.GET: {details}"),
                                                                                   line })?;
    Ok(response_dict(status, text))
}

/// `requests.post(url[, data[, headers]])` → `{status, text}`.
fn requests_post(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.is_empty() || args.len() > 3 {
        return Err(RuntimeError::InvalidArgument { details: "requests.post expects (url[, data[, headers]])".to_string(),
                                                   line });
    }
    let url = args[0].as_str("requests.post url", line)?;
    let body = match args.get(1) {
        Some(data) => Some(data.as_str("requests.post data", line)?),
        None => None,
    };
    let headers = match args.get(2) {
        Some(headers) => headers_from(headers, "requests.post headers", line)?,
        None => Vec::new(),
    };

    let (status, text) =
        fetch("POST", url, body, &headers).map_err(|details| RuntimeError::NativeError { details: format!("requests.POST: {details}"),
                                                                                         line })?;
    Ok(response_dict(status, text))
}

/// `requests.request(method, url[, data[, headers]])` → `{status, text}`.
fn requests_request(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    if args.len() < 2 || args.len() > 4 {
        return Err(RuntimeError::InvalidArgument { details: "requests.request expects (method, url[, data[, headers]])".to_string(),
                                                   line });
    }
    let method = args[0].as_str("requests.request method", line)?;
    let url = args[1].as_str("requests.request url", line)?;
    let body = match args.get(2) {
        Some(data) => Some(data.as_str("requests.request data", line)?),
        None => None,
    };
    let headers = match args.get(3) {
        Some(headers) => headers_from(headers, "requests.request headers", line)?,
        None => Vec::new(),
    };

    let (status, text) =
        fetch(method, url, body, &headers).map_err(|details| RuntimeError::NativeError { details: format!("requests.{method}: {details}"),
                                                                                         line })?;
    Ok(response_dict(status, text))
}

/// `content.get(source)`: a tolerant fetcher for URLs and local paths.
///
/// Failures never raise; they come back as `{ok: false, status, error}`
/// dicts so scripts can branch on `resp["ok"]`.
fn content_get(_: &mut Interpreter, args: &[Value], line: usize) -> EvalResult<Value> {
    let source = args[0].as_str("content.get source", line)?;

    let mut map = HashMap::new();
    map.insert("source".to_string(), Value::Str(source.to_string()));

    let is_url = source.starts_with("http://")
                 || source.starts_with("https://")
                 || source.starts_with("file://");
    if is_url {
        let kind = if source.starts_with("file://") { "file" } else { "http" };
        match fetch("GET", source, None, &[]) {
            Ok((status, text)) => {
                map.insert("ok".to_string(), Value::Bool(true));
                map.insert("status".to_string(), Value::Number(status));
                map.insert("text".to_string(), Value::Str(text));
                map.insert("type".to_string(), Value::Str(kind.to_string()));
            },
            Err(details) => {
                map.insert("ok".to_string(), Value::Bool(false));
                map.insert("status".to_string(), Value::Number(500.0));
                map.insert("error".to_string(), Value::Str(details));
            },
        }
        return Ok(map.into());
    }

    if Path::new(source).exists() {
        match std::fs::read_to_string(source) {
            Ok(text) => {
                map.insert("ok".to_string(), Value::Bool(true));
                map.insert("status".to_string(), Value::Number(200.0));
                map.insert("text".to_string(), Value::Str(text));
                map.insert("type".to_string(), Value::Str("file".to_string()));
            },
            Err(err) => {
                map.insert("ok".to_string(), Value::Bool(false));
                map.insert("status".to_string(), Value::Number(500.0));
                map.insert("error".to_string(), Value::Str(err.to_string()));
            },
        }
        return Ok(map.into());
    }

    map.insert("ok".to_string(), Value::Bool(false));
    map.insert("status".to_string(), Value::Number(404.0));
    map.insert("error".to_string(), Value::Str("not found".to_string()));
    Ok(map.into())
}
