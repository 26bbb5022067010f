//! Cross-stage scenarios for the LSP's JSON-RPC handler (spec §6), in the
//! teacher's own `tests/` directory convention (`ouros-mcp/tests/mcp_tools_tests.rs`).

use loom_lsp::handler::LspHandler;
use serde_json::json;

#[test]
fn open_edit_close_round_trip_never_errors() {
    let mut handler = LspHandler::new();

    handler
        .handle(
            "textDocument/didOpen",
            json!({ "textDocument": { "uri": "file:///lib.loom", "version": 1, "text": "const X = 1" } }),
        )
        .unwrap();

    handler
        .handle(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": "file:///lib.loom", "version": 2 },
                "contentChanges": [{ "text": "const X = 2" }],
            }),
        )
        .unwrap();

    handler
        .handle("textDocument/didClose", json!({ "textDocument": { "uri": "file:///lib.loom" } }))
        .unwrap();
}

#[test]
fn definition_on_an_unopened_document_returns_null() {
    let mut handler = LspHandler::new();
    let response = handler
        .handle(
            "textDocument/definition",
            json!({ "textDocument": { "uri": "file:///missing.loom" }, "position": { "line": 0, "character": 0 } }),
        )
        .unwrap();
    assert!(response.is_null());
}

#[test]
fn references_on_an_unopened_document_returns_empty_list() {
    let mut handler = LspHandler::new();
    let response = handler
        .handle(
            "textDocument/references",
            json!({ "textDocument": { "uri": "file:///missing.loom" }, "position": { "line": 0, "character": 0 } }),
        )
        .unwrap();
    assert_eq!(response, json!([]));
}
