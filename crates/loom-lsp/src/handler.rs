//! Thin LSP adapter around [`Workspace`], in the shape of
//! `ouros_mcp::handler::McpHandler`: each method parses JSON params,
//! delegates to the workspace's typed Rust API, and serializes the result
//! back to JSON (spec §6 "EXTERNAL INTERFACES").

use loom::sir::module::{Module, Position as SirPosition};
use loom::sir::module_path::ModulePath;
use loom::sir::text::TextSize;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::completion::{CompletionContext, TemplateKind};
use crate::workspace::Workspace;

/// Builds an empty `Module` for `path`. This workspace has no parser front
/// end (spec §1 Non-goals); a real LSP deployment plugs its parser in here.
fn build_empty_module(_source: &str, path: ModulePath) -> Module {
    Module::new(path)
}

/// Inserts no textual sentinel: with no parser, there is no syntax tree
/// for a sentinel token to land in. A real front end's sentinel-injection
/// routine replaces this once plugged in.
fn inject_no_sentinel(source: &str, _position: SirPosition) -> String {
    source.to_owned()
}

/// Harvests no completion context: without a parser there is no syntax
/// tree to inspect at the cursor. A real front end's context-capture
/// routine replaces this once plugged in.
fn harvest_no_context(_module: &Module) -> CompletionContext {
    CompletionContext::None
}

#[derive(Debug, Deserialize)]
struct TextDocumentIdentifier {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct LspPosition {
    line: u32,
    character: u32,
}

pub struct LspHandler {
    workspace: Workspace,
}

impl LspHandler {
    #[must_use]
    pub fn new() -> Self {
        Self { workspace: Workspace::new() }
    }

    pub fn handle(&mut self, method: &str, params: Value) -> Result<Value, String> {
        match method {
            "initialize" => Ok(self.initialize()),
            "initialized" | "$/cancelRequest" => Ok(Value::Null),
            "textDocument/didOpen" => self.did_open(params).map(|()| Value::Null),
            "textDocument/didChange" => self.did_change(params).map(|()| Value::Null),
            "textDocument/didClose" => self.did_close(params).map(|()| Value::Null),
            "textDocument/completion" => self.completion(params),
            "textDocument/definition" => self.definition(params),
            "textDocument/references" => self.references(params),
            "shutdown" => Ok(Value::Null),
            other => Err(format!("method not found: {other}")),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "capabilities": {
                "textDocumentSync": 1,
                "completionProvider": { "triggerCharacters": ["."] },
                "definitionProvider": true,
                "referencesProvider": true,
            },
            "serverInfo": {
                "name": "loom-lsp",
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    fn did_open(&mut self, params: Value) -> Result<(), String> {
        #[derive(Deserialize)]
        struct TextDocumentItem {
            uri: String,
            version: i64,
            text: String,
        }
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: TextDocumentItem,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid didOpen params: {err}"))?;
        let path = module_path_from_uri(&params.text_document.uri);
        self.workspace
            .update(path, params.text_document.text, params.text_document.version, build_empty_module);
        Ok(())
    }

    fn did_change(&mut self, params: Value) -> Result<(), String> {
        #[derive(Deserialize)]
        struct VersionedIdentifier {
            uri: String,
            version: i64,
        }
        #[derive(Deserialize)]
        struct ContentChange {
            text: String,
        }
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: VersionedIdentifier,
            #[serde(rename = "contentChanges")]
            content_changes: Vec<ContentChange>,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid didChange params: {err}"))?;
        let Some(last) = params.content_changes.into_iter().next_back() else {
            return Ok(());
        };
        let path = module_path_from_uri(&params.text_document.uri);
        self.workspace.update(path, last.text, params.text_document.version, build_empty_module);
        Ok(())
    }

    fn did_close(&mut self, params: Value) -> Result<(), String> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: TextDocumentIdentifier,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid didClose params: {err}"))?;
        self.workspace.close(&module_path_from_uri(&params.text_document.uri));
        Ok(())
    }

    fn completion(&mut self, params: Value) -> Result<Value, String> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: TextDocumentIdentifier,
            position: LspPosition,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid completion params: {err}"))?;
        let path = module_path_from_uri(&params.text_document.uri);
        let position = SirPosition {
            line: params.position.line,
            column: params.position.character,
        };
        let items = self
            .workspace
            .complete(&path, position, inject_no_sentinel, |src, p| Some(build_empty_module(src, p)), harvest_no_context)
            .map_err(|err| err.to_string())?;

        let lsp_items: Vec<Value> = items
            .into_iter()
            .map(|item| {
                json!({
                    "label": item.label,
                    "kind": item.kind,
                    "insertText": item.insert_text,
                    "insertTextFormat": 2,
                    "data": template_kind_tag(item.template),
                    "labelDetails": item.source_module.map(|m| json!({ "description": m })),
                })
            })
            .collect();
        Ok(json!(lsp_items))
    }

    fn definition(&self, params: Value) -> Result<Value, String> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: TextDocumentIdentifier,
            position: LspPosition,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid definition params: {err}"))?;
        let path = module_path_from_uri(&params.text_document.uri);
        let offset = TextSize::from(params.position.character);
        match self.workspace.definition_at(&path, offset) {
            Some(location) => Ok(json!({
                "uri": uri_from_module_path(&location.module),
                "range": range_json(location.range),
            })),
            None => Ok(Value::Null),
        }
    }

    fn references(&self, params: Value) -> Result<Value, String> {
        #[derive(Deserialize)]
        struct Context {
            #[serde(rename = "includeDeclaration", default)]
            include_declaration: bool,
        }
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "textDocument")]
            text_document: TextDocumentIdentifier,
            position: LspPosition,
            #[serde(default)]
            context: Option<Context>,
        }
        let params: Params = serde_json::from_value(params).map_err(|err| format!("invalid references params: {err}"))?;
        let path = module_path_from_uri(&params.text_document.uri);
        let offset = TextSize::from(params.position.character);
        let include_declaration = params.context.map(|c| c.include_declaration).unwrap_or(false);

        let Some(def_location) = self.workspace.definition_at(&path, offset) else {
            return Ok(json!([]));
        };
        let Some(def) = self.workspace.index().top_level_defs().iter().find(|d| &d.location == def_location) else {
            return Ok(json!([]));
        };
        let locations: Vec<Value> = self
            .workspace
            .index()
            .references_of(def.symbol, include_declaration)
            .into_iter()
            .map(|location| {
                json!({
                    "uri": uri_from_module_path(&location.module),
                    "range": range_json(location.range),
                })
            })
            .collect();
        Ok(json!(locations))
    }
}

impl Default for LspHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn template_kind_tag(template: TemplateKind) -> &'static str {
    match template {
        TemplateKind::Simple => "simple",
        TemplateKind::FuncCallTemplate => "func_call_template",
        TemplateKind::StructLiteralTemplate => "struct_literal_template",
        TemplateKind::StructFieldTemplate => "struct_field_template",
    }
}

fn range_json(range: loom::sir::text::TextRange) -> Value {
    let start: u32 = range.start().into();
    let end: u32 = range.end().into();
    json!({
        "start": { "line": 0, "character": start },
        "end": { "line": 0, "character": end },
    })
}

fn module_path_from_uri(uri: &str) -> ModulePath {
    let stem = uri.rsplit('/').next().unwrap_or(uri).trim_end_matches(".loom");
    ModulePath::parse(stem)
}

fn uri_from_module_path(path: &ModulePath) -> String {
    format!("file:///{path}.loom")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_reports_completion_definition_and_references_support() {
        let mut handler = LspHandler::new();
        let response = handler.handle("initialize", Value::Null).unwrap();
        assert_eq!(response["capabilities"]["definitionProvider"], json!(true));
    }

    #[test]
    fn unknown_method_is_reported() {
        let mut handler = LspHandler::new();
        assert!(handler.handle("textDocument/foldingRange", Value::Null).is_err());
    }

    #[test]
    fn did_open_then_completion_does_not_error() {
        let mut handler = LspHandler::new();
        handler
            .handle(
                "textDocument/didOpen",
                json!({ "textDocument": { "uri": "file:///main.loom", "version": 1, "text": "const PI = 3" } }),
            )
            .unwrap();
        let result = handler.handle(
            "textDocument/completion",
            json!({ "textDocument": { "uri": "file:///main.loom" }, "position": { "line": 0, "character": 0 } }),
        );
        assert!(result.is_ok());
    }
}
