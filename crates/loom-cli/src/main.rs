//! The boundary CLI (spec §6): "out of core scope, stated only for boundary
//! completeness". This core has no parser/AST front end or codegen backend
//! (spec §1 Non-goals) — `loom-cli` wires together everything this
//! workspace *does* own (module loading, the `loom-sema` pipeline,
//! diagnostics rendering) and reports where a real front end and backend
//! would plug in.

mod config;

use std::{env, fs, process::ExitCode, time::Instant};

use loom::sir::module::{LoadError, Module, ModuleManager, SourceProvider, Unit};
use loom::sir::module_path::ModulePath;
use loom::support::trace::{AnalysisTracer, NoopTracer, StderrTracer};
use loom_sema::report::{render_concise, ReportManager};
use loom_sema::stage::meta::MetaEvaluator;
use loom_sema::{analyze_unit, AnalysisMode};

use config::ProjectConfig;

struct NullMeta;

impl MetaEvaluator for NullMeta {
    fn evaluate(&mut self, _module: &mut Module, _body: loom::sir::symbol::ExprId) -> Vec<loom::sir::decl::DeclKind> {
        Vec::new()
    }
}

/// Reads module source text from disk, one file per module path segment
/// joined with `/` and a `.loom` extension, under `root`.
struct FsSourceProvider {
    root: std::path::PathBuf,
}

impl SourceProvider for FsSourceProvider {
    fn read(&self, path: &ModulePath) -> Result<String, LoadError> {
        let relative: std::path::PathBuf = path.segments().iter().map(AsRef::as_ref).collect();
        let file_path = self.root.join(relative).with_extension("loom");
        fs::read_to_string(&file_path).map_err(|_| LoadError::NotFound { path: path.clone() })
    }
}

/// Builds an empty module for `path`. This core's scope ends at SIR/SSA
/// and the semantic analyzer (spec §1); turning `source` text into
/// populated SIR is a parser's job, which lives outside this workspace.
/// A real front end supplies this closure's body; until then the pipeline
/// below runs to completion over whatever modules were already populated
/// by such a front end (or, as here, empty stub modules).
fn build_empty_module(_source: &str, path: ModulePath) -> Module {
    Module::new(path)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let entry_file = args.iter().skip(1).find(|a| !a.starts_with('-'));
    let entry_path = match entry_file {
        Some(path) => path.clone(),
        None => {
            eprintln!("usage: loom [-v] <entry-module>");
            return ExitCode::FAILURE;
        }
    };

    let manifest_path = std::path::Path::new("loom.toml");
    let project = match ProjectConfig::load(manifest_path) {
        Ok(project) => project,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "loom: target={} code-model={} entry={entry_path}",
        project.target_triple, project.code_model
    );

    let entry = module_path_from_file(&entry_path);
    let root = std::path::Path::new(&entry_path)
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    let search_paths = project.search_paths.iter().map(|p| ModulePath::parse(p)).collect();
    let manager = ModuleManager::new(FsSourceProvider { root }, search_paths);

    let mut unit = Unit::new();
    let start = Instant::now();
    if let Err(err) = manager.load_all(&mut unit, &entry, build_empty_module, |_module| Vec::new()) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let mut tracer: Box<dyn AnalysisTracer> = if verbose { Box::new(StderrTracer) } else { Box::new(NoopTracer) };
    tracer.on_stage_enter("ANALYZE", &entry.to_string());

    let mut reports = ReportManager::new();
    let mut meta = NullMeta;
    let _extra = analyze_unit(&mut unit, AnalysisMode::Compilation, &mut meta, &mut reports);
    tracer.on_stage_exit("ANALYZE", &entry.to_string());

    let elapsed = start.elapsed();
    let text = render_concise(&reports, |path| {
        let relative: std::path::PathBuf = path.segments().iter().map(AsRef::as_ref).collect();
        fs::read_to_string(relative.with_extension("loom")).ok()
    });
    if !text.is_empty() {
        eprint!("{text}");
    }

    if reports.is_valid() {
        eprintln!(
            "compiled {} module(s) in {elapsed:?} (codegen past SSA is out of this core's scope, spec §1)",
            unit.paths().count(),
        );
        ExitCode::SUCCESS
    } else {
        eprintln!("compilation failed: {} error(s), {} warning(s) in {elapsed:?}", reports.error_count(), reports.warning_count());
        ExitCode::FAILURE
    }
}

fn module_path_from_file(file_path: &str) -> ModulePath {
    let stem = std::path::Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_path);
    ModulePath::parse(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_from_file_strips_extension() {
        assert_eq!(module_path_from_file("src/main.loom"), ModulePath::parse("main"));
    }
}
