//! `Module`, `Unit`, and `ModuleManager` (spec §4.B). A module owns its
//! arena and is *replaced*, never mutated, on reload (spec §3 "Lifecycle").

use ahash::AHashMap;

use crate::sir::decl::{Decl, DeclBlock};
use crate::sir::expr::Expr;
use crate::sir::module_path::ModulePath;
use crate::sir::stmt::{Block, Stmt};
use crate::sir::symbol::Symbol;
use crate::sir::symbol_table::{SymbolTableArena, SymbolTableId};
use crate::support::arena::{Arena, Id};
use crate::support::string_arena::{StringArena, StringId};

/// Per-module storage for every SIR node kind, plus the string arena
/// feeding all of them. One `ModuleArena` is allocated per `Module` and
/// dropped in its entirety on reload (spec §4.A).
#[derive(Debug, Default)]
pub struct ModuleArena {
    pub exprs: Arena<Expr>,
    pub stmts: Arena<Stmt>,
    pub blocks: Arena<Block>,
    pub decls: Arena<Decl>,
    pub decl_blocks: Arena<DeclBlock>,
    pub symbols: Arena<Symbol>,
    pub tables: SymbolTableArena,
    pub strings: StringArena,
}

impl ModuleArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_string(&mut self, text: &str) -> StringId {
        self.strings.create_string(text)
    }

    pub fn create_symbol_table(&mut self, parent: Option<SymbolTableId>) -> SymbolTableId {
        self.tables.create(parent)
    }

    pub fn create_array<T>(&self, values: impl IntoIterator<Item = T>) -> Vec<T> {
        values.into_iter().collect()
    }
}

/// One parsed-and-analyzed source file. Owns its root `DeclBlock`, its
/// arena, and its path; the arena's lifetime is the module's lifetime
/// (spec §3 "Module").
#[derive(Debug)]
pub struct Module {
    pub path: ModulePath,
    pub arena: ModuleArena,
    pub root: Id<DeclBlock>,
    /// Monotonically incremented on every `reload`; used by the workspace
    /// to detect whether cross-module references were taken before or
    /// after a given replacement (spec §5 "Resource discipline").
    pub generation: u64,
}

impl Module {
    #[must_use]
    pub fn new(path: ModulePath) -> Self {
        let mut arena = ModuleArena::new();
        let table = arena.create_symbol_table(None);
        let root = arena.decl_blocks.alloc(DeclBlock::new(table));
        Self {
            path,
            arena,
            root,
            generation: 0,
        }
    }

    #[must_use]
    pub fn root_table(&self) -> SymbolTableId {
        self.arena.decl_blocks.get(self.root).table
    }
}

/// Owns every loaded `Module`, keyed by path (spec §3 "Unit").
#[derive(Debug, Default)]
pub struct Unit {
    modules: AHashMap<ModulePath, Module>,
}

impl Unit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &ModulePath) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn get_mut(&mut self, path: &ModulePath) -> Option<&mut Module> {
        self.modules.get_mut(path)
    }

    /// Replaces (or inserts) a module wholesale. Per spec §5, the caller is
    /// responsible for not swapping in the replacement until reanalysis of
    /// the new module has completed; `Unit` itself performs only the swap.
    pub fn replace(&mut self, module: Module) {
        self.modules.insert(module.path.clone(), module);
    }

    #[must_use]
    pub fn contains(&self, path: &ModulePath) -> bool {
        self.modules.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &ModulePath> {
        self.modules.keys()
    }
}

/// A cursor position within a source buffer, used to insert the completion
/// sentinel (spec §4.B `load_for_completion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug)]
pub enum LoadError {
    /// The parser could not produce a recoverable tree even with the
    /// completion sentinel inserted (spec §4.B).
    Unparseable { path: ModulePath },
    NotFound { path: ModulePath },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Unparseable { path } => write!(f, "module '{path}' has no recoverable parse tree"),
            LoadError::NotFound { path } => write!(f, "module '{path}' not found on any search path"),
        }
    }
}

impl std::error::Error for LoadError {}

/// A source provider the manager asks for file contents; out of core scope
/// per spec §1 ("file I/O and filesystem walking" are external), so the
/// manager is generic over how bytes are fetched rather than hard-coding
/// `std::fs`.
pub trait SourceProvider {
    fn read(&self, path: &ModulePath) -> Result<String, LoadError>;
}

/// Loads modules on demand from configured search paths, idempotently
/// (spec §4.B). The manager does not itself parse source into an AST —
/// that remains the external parser's job (spec §1) — so `load_all` and
/// `reload` here drive a caller-supplied `build` closure that turns source
/// text into a populated `Module`.
pub struct ModuleManager<S: SourceProvider> {
    provider: S,
    search_paths: Vec<ModulePath>,
}

impl<S: SourceProvider> ModuleManager<S> {
    #[must_use]
    pub fn new(provider: S, search_paths: Vec<ModulePath>) -> Self {
        Self { provider, search_paths }
    }

    #[must_use]
    pub fn search_paths(&self) -> &[ModulePath] {
        &self.search_paths
    }

    /// Eagerly discovers and loads every transitively imported module,
    /// starting from `entry`. `discover_uses` extracts the list of module
    /// paths a freshly built module's `use` items name; callers own AST
    /// traversal, the manager only owns load ordering and idempotency.
    pub fn load_all(
        &self,
        unit: &mut Unit,
        entry: &ModulePath,
        build: impl Fn(&str, ModulePath) -> Module,
        discover_uses: impl Fn(&Module) -> Vec<ModulePath>,
    ) -> Result<(), LoadError> {
        let mut queue = vec![entry.clone()];
        while let Some(path) = queue.pop() {
            if unit.contains(&path) {
                continue;
            }
            let source = self.provider.read(&path)?;
            let module = build(&source, path.clone());
            let uses = discover_uses(&module);
            unit.replace(module);
            queue.extend(uses.into_iter().filter(|p| !unit.contains(p)));
        }
        Ok(())
    }

    /// Replaces `path`'s module after its source buffer changed. Returns
    /// the freshly built module; the caller swaps it into the `Unit` only
    /// once reanalysis has completed (spec §5).
    pub fn reload(&self, path: &ModulePath, build: impl FnOnce(&str, ModulePath) -> Module) -> Result<Module, LoadError> {
        let source = self.provider.read(path)?;
        Ok(build(&source, path.clone()))
    }

    /// Reloads `path` with a sentinel token inserted at `position`, for the
    /// completion workspace (spec §4.B, §4.F). `inject_sentinel` performs
    /// the textual insertion; `build` must fail with
    /// `LoadError::Unparseable` if no recoverable tree results.
    pub fn load_for_completion(
        &self,
        path: &ModulePath,
        position: Position,
        inject_sentinel: impl FnOnce(&str, Position) -> String,
        build: impl FnOnce(&str, ModulePath) -> Option<Module>,
    ) -> Result<Module, LoadError> {
        let source = self.provider.read(path)?;
        let with_sentinel = inject_sentinel(&source, position);
        build(&with_sentinel, path.clone()).ok_or_else(|| LoadError::Unparseable { path: path.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider(AHashMap<ModulePath, String>);

    impl SourceProvider for StaticProvider {
        fn read(&self, path: &ModulePath) -> Result<String, LoadError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound { path: path.clone() })
        }
    }

    #[test]
    fn load_all_is_idempotent_and_discovers_transitively() {
        let mut sources = AHashMap::new();
        sources.insert(ModulePath::parse("main"), "use lib;".to_string());
        sources.insert(ModulePath::parse("lib"), "".to_string());
        let manager = ModuleManager::new(StaticProvider(sources), vec![]);

        let mut unit = Unit::new();
        let entry = ModulePath::parse("main");
        manager
            .load_all(
                &mut unit,
                &entry,
                |_src, path| Module::new(path),
                |module| {
                    if module.path == ModulePath::parse("main") {
                        vec![ModulePath::parse("lib")]
                    } else {
                        vec![]
                    }
                },
            )
            .unwrap();

        assert!(unit.contains(&ModulePath::parse("main")));
        assert!(unit.contains(&ModulePath::parse("lib")));
    }

    #[test]
    fn reload_does_not_mutate_unit_until_caller_swaps_it_in() {
        let mut sources = AHashMap::new();
        sources.insert(ModulePath::parse("main"), "old".to_string());
        let manager = ModuleManager::new(StaticProvider(sources), vec![]);

        let mut unit = Unit::new();
        unit.replace(Module::new(ModulePath::parse("main")));
        let before_generation = unit.get(&ModulePath::parse("main")).unwrap().generation;

        let mut reloaded = manager
            .reload(&ModulePath::parse("main"), |_src, path| Module::new(path))
            .unwrap();
        reloaded.generation = before_generation + 1;

        assert_eq!(unit.get(&ModulePath::parse("main")).unwrap().generation, before_generation);
        unit.replace(reloaded);
        assert_eq!(unit.get(&ModulePath::parse("main")).unwrap().generation, before_generation + 1);
    }
}
