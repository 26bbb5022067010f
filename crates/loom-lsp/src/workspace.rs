//! `Workspace` (spec §4.F): the LSP's long-lived registry of open
//! documents, their analyzed `Unit`, and the derived `Index`. Generalizes
//! `ouros::session_manager::SessionManager`'s registry-of-named-things
//! idiom (idempotent lifecycle methods, one named entity at a time mutated
//! through a small typed API) from REPL sessions to open text documents.

use std::fmt;

use ahash::AHashMap;

use loom::sir::module::{Module, Position, Unit};
use loom::sir::module_path::ModulePath;
use loom::sir::text::{SourceLocation, TextSize};
use loom_sema::report::ReportManager;
use loom_sema::stage::meta::MetaEvaluator;
use loom_sema::{analyze_unit, AnalysisMode};

use crate::completion::{CompletionContext, CompletionEngine, CompletionItem};
use crate::index::Index;

/// Preamble names with the item kind the completion engine should render
/// them as, independent of any one module's `StringArena` (spec §4.F:
/// "preamble symbols" are always offered as candidates, regardless of
/// which document is open). Grounded on `loom_sema::stage::preamble::PREAMBLE_NAMES`.
pub struct PreambleSymbols {
    pub entries: Vec<(String, u32)>,
}

impl PreambleSymbols {
    #[must_use]
    pub fn standard() -> Self {
        use crate::completion::kind;
        let entries = loom_sema::stage::preamble::PREAMBLE_NAMES
            .iter()
            .map(|name| {
                let kind_num = match *name {
                    "print" | "println" | "assert" => kind::FUNCTION,
                    _ => kind::STRUCT,
                };
                ((*name).to_owned(), kind_num)
            })
            .collect();
        Self { entries }
    }
}

struct NullMeta;

impl MetaEvaluator for NullMeta {
    fn evaluate(&mut self, _module: &mut Module, _body: loom::sir::symbol::ExprId) -> Vec<loom::sir::decl::DeclKind> {
        Vec::new()
    }
}

/// A module's last-known buffer, for completion sentinel insertion and
/// `render_concise`'s line/column computation.
#[derive(Debug, Clone)]
struct Document {
    text: String,
    version: i64,
}

#[derive(Debug)]
pub enum WorkspaceError {
    NotOpen { path: ModulePath },
}

impl fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen { path } => write!(f, "document '{path}' is not open"),
        }
    }
}

impl std::error::Error for WorkspaceError {}

/// Owns the `Unit` every open document's SIR lives in, the per-file buffer
/// record, and the `Index` go-to-definition/find-references consume (spec
/// §4.F). Request handling is single-threaded relative to one `Workspace`
/// (spec §5): callers serialize edits against in-flight completion
/// requests themselves, this type holds no lock.
pub struct Workspace {
    unit: Unit,
    documents: AHashMap<ModulePath, Document>,
    index: Index,
    preamble: PreambleSymbols,
    completion_engine: CompletionEngine,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unit: Unit::new(),
            documents: AHashMap::new(),
            index: Index::new(),
            preamble: PreambleSymbols::standard(),
            completion_engine: CompletionEngine::new(),
        }
    }

    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Installs `content` as `path`'s buffer, regenerates only that
    /// module's SIR, and re-runs the analyzer in `INDEXING` mode on it
    /// (spec §4.F step 1). `build` turns source text into a populated
    /// `Module`; this core has no parser front end of its own (spec §1),
    /// so the LSP transport layer supplies one.
    pub fn update(&mut self, path: ModulePath, content: String, version: i64, build: impl FnOnce(&str, ModulePath) -> Module) {
        let module = build(&content, path.clone());
        self.documents.insert(path.clone(), Document { text: content, version });
        self.unit.replace(module);

        let mut reports = ReportManager::new();
        let mut meta = NullMeta;
        let mut extra = analyze_unit(&mut self.unit, AnalysisMode::Indexing, &mut meta, &mut reports);
        extra.defs.retain(|def| def.location.module == path);
        extra.uses.retain(|use_| use_.location.module == path);
        self.index.rebuild_module(&path, extra);
    }

    pub fn close(&mut self, path: &ModulePath) {
        self.documents.remove(path);
    }

    #[must_use]
    pub fn document_version(&self, path: &ModulePath) -> Option<i64> {
        self.documents.get(path).map(|doc| doc.version)
    }

    /// Builds a throwaway SIR for `path`'s buffer with a completion
    /// sentinel inserted at `position`, analyzes it in `COMPLETION` mode,
    /// and feeds the harvested context to the completion engine (spec
    /// §4.F step 2). The sentinel module is discarded afterward — it never
    /// enters `self.unit` (spec §7 edge cases: "take care that temporary
    /// SIR allocations do not leak into the long-lived `Unit`").
    pub fn complete(
        &self,
        path: &ModulePath,
        position: Position,
        inject_sentinel: impl FnOnce(&str, Position) -> String,
        build: impl FnOnce(&str, ModulePath) -> Option<Module>,
        harvest_context: impl FnOnce(&Module) -> CompletionContext,
    ) -> Result<Vec<CompletionItem>, WorkspaceError> {
        let document = self.documents.get(path).ok_or_else(|| WorkspaceError::NotOpen { path: path.clone() })?;
        let with_sentinel = inject_sentinel(&document.text, position);
        let Some(sentinel_module) = build(&with_sentinel, path.clone()) else {
            return Ok(Vec::new());
        };
        let context = harvest_context(&sentinel_module);
        Ok(self.completion_engine.complete(&sentinel_module, &self.unit, &self.preamble, context))
    }

    #[must_use]
    pub fn definition_at(&self, path: &ModulePath, offset: TextSize) -> Option<&SourceLocation> {
        self.index.definition_at(path, offset)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updating_a_document_populates_the_unit_and_index() {
        let mut workspace = Workspace::new();
        let path = ModulePath::parse("main");
        workspace.update(path.clone(), "const PI = 3".to_owned(), 1, |_src, p| Module::new(p));

        assert_eq!(workspace.document_version(&path), Some(1));
    }

    #[test]
    fn completing_in_an_unopened_document_is_an_error() {
        let workspace = Workspace::new();
        let path = ModulePath::parse("missing");
        let result = workspace.complete(
            &path,
            Position { line: 0, column: 0 },
            |src, _pos| src.to_owned(),
            |_src, p| Some(Module::new(p)),
            |_module| CompletionContext::None,
        );
        assert!(result.is_err());
    }
}
