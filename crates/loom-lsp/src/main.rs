use std::io::{self, BufRead, BufReader, Write};

use loom_lsp::handler::LspHandler;
use serde::Deserialize;
use serde_json::{json, Value};

/// JSON-RPC request payload (spec §6: "JSON over stdin/stdout per the
/// Language Server Protocol"). Shape and framing match `ouros-mcp`'s own
/// stdio server almost verbatim — `Content-Length` framing substituted for
/// the teacher's own.
#[derive(Debug, Deserialize)]
struct RpcRequest {
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();
    let mut handler = LspHandler::new();

    while let Some(body) = read_framed_message(&mut reader)? {
        let raw_message = match serde_json::from_slice::<Value>(&body) {
            Ok(message) => message,
            Err(err) => {
                let response = error_response(&Value::Null, -32700, &format!("parse error: {err}"));
                write_framed_message(&mut writer, &response)?;
                continue;
            }
        };

        if is_json_rpc_notification(&raw_message) {
            let method = raw_message.get("method").and_then(Value::as_str).unwrap_or_default();
            let params = raw_message.get("params").cloned().unwrap_or(Value::Null);
            let _ = handler.handle(method, params);
            continue;
        }

        let response = match serde_json::from_value::<RpcRequest>(raw_message) {
            Ok(request) => handle_request(&mut handler, request),
            Err(err) => error_response(&Value::Null, -32700, &format!("parse error: {err}")),
        };
        write_framed_message(&mut writer, &response)?;
    }

    Ok(())
}

/// Returns true when the payload is a JSON-RPC 2.0 notification: a string
/// `method` with no `id`, e.g. `textDocument/didChange`. The server must
/// not produce any response for these.
fn is_json_rpc_notification(payload: &Value) -> bool {
    let Some(object) = payload.as_object() else {
        return false;
    };
    object.get("jsonrpc").and_then(Value::as_str) == Some("2.0")
        && object.get("method").is_some_and(Value::is_string)
        && !object.contains_key("id")
}

fn handle_request(handler: &mut LspHandler, request: RpcRequest) -> Value {
    match handler.handle(&request.method, request.params) {
        Ok(result) => success_response(&request.id, &result),
        Err(err) if err.starts_with("method not found") => error_response(&request.id, -32601, &err),
        Err(err) => error_response(&request.id, -32602, &err),
    }
}

fn success_response(id: &Value, result: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: &Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        },
    })
}

/// Reads one `Content-Length` framed message body from stdin.
fn read_framed_message(reader: &mut impl BufRead) -> io::Result<Option<Vec<u8>>> {
    let mut content_length = None;
    loop {
        let mut header_line = String::new();
        let read = reader.read_line(&mut header_line)?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(value) = trimmed.strip_prefix("Content-Length:") {
            let length = value
                .trim()
                .parse::<usize>()
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("invalid Content-Length: {err}")))?;
            content_length = Some(length);
        }
    }

    let Some(content_length) = content_length else {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "missing Content-Length header"));
    };

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Writes one `Content-Length` framed JSON message to stdout.
fn write_framed_message(writer: &mut impl Write, payload: &Value) -> io::Result<()> {
    let body = serde_json::to_vec(payload).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("serialize error: {err}")))?;
    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()
}
