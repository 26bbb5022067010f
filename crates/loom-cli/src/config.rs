//! `loom.toml` project manifest (spec §6's CLI boundary: "target triple,
//! code model, optimization level"). Parsed with `toml_edit`, the teacher's
//! own workspace-manifest dependency, falling back to CLI-flag defaults
//! when no manifest is present so a single source file still compiles with
//! nothing but command-line flags.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeModel {
    Small,
    Large,
}

impl fmt::Display for CodeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Large => write!(f, "large"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptLevel {
    None,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Object,
    Executable,
}

/// Resolved configuration: `loom.toml`'s values if present, overridden
/// field-by-field by whatever the caller passed on the command line.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub target_triple: String,
    pub code_model: CodeModel,
    pub opt_level: OptLevel,
    pub output: OutputKind,
    pub stdlib_path: Option<String>,
    pub search_paths: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            target_triple: default_target_triple(),
            code_model: CodeModel::Large,
            opt_level: OptLevel::None,
            output: OutputKind::Executable,
            stdlib_path: None,
            search_paths: Vec::new(),
        }
    }
}

fn default_target_triple() -> String {
    "x86_64-unknown-linux-gnu".to_owned()
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml_edit::TomlError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read loom.toml: {err}"),
            Self::Parse(err) => write!(f, "could not parse loom.toml: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ProjectConfig {
    /// Reads `loom.toml` at `path` if it exists, returning the default
    /// configuration otherwise (spec's "search paths come from somewhere"
    /// gap; absence of a manifest is not an error, a bare `.loom` file
    /// should still compile).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self, ConfigError> {
        let doc = text.parse::<toml_edit::DocumentMut>().map_err(ConfigError::Parse)?;
        let mut config = Self::default();

        if let Some(target) = doc.get("target").and_then(|v| v.as_str()) {
            config.target_triple = target.to_owned();
        }
        if let Some(model) = doc.get("code_model").and_then(|v| v.as_str()) {
            config.code_model = match model {
                "small" => CodeModel::Small,
                _ => CodeModel::Large,
            };
        }
        if let Some(opt) = doc.get("opt_level").and_then(|v| v.as_str()) {
            config.opt_level = match opt {
                "speed" => OptLevel::Speed,
                _ => OptLevel::None,
            };
        }
        if let Some(output) = doc.get("output").and_then(|v| v.as_str()) {
            config.output = match output {
                "object" => OutputKind::Object,
                _ => OutputKind::Executable,
            };
        }
        if let Some(stdlib) = doc.get("stdlib_path").and_then(|v| v.as_str()) {
            config.stdlib_path = Some(stdlib.to_owned());
        }
        if let Some(paths) = doc.get("search_paths").and_then(|v| v.as_array()) {
            config.search_paths = paths.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect();
        }

        Ok(config)
    }
}
