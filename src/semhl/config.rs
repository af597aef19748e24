//! Configuration loader
//!
//! `defaults/semhl.default.toml` is embedded into the binary so that the documented
//! defaults and runtime behavior stay in sync. Callers layer user files and single-key
//! overrides on top of it via [`Loader`] before deserializing into [`SemhlConfig`].

use super::languages::Language;
use super::lexical::LexicalMode;
use super::task::{TaskCode, TaskError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/semhl.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SemhlConfig {
    pub engine: EngineConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

/// Lexical mode per language.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub cpp: LexicalMode,
    pub csharp: LexicalMode,
    pub javascript: LexicalMode,
}

impl EngineConfig {
    pub fn mode_for(&self, language: Language) -> LexicalMode {
        match language {
            Language::Cpp => self.cpp,
            Language::CSharp => self.csharp,
            Language::JavaScript => self.javascript,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    pub tasks: Vec<u32>,
    pub progress_every: usize,
    pub skip_degenerate: bool,
}

impl EvaluationConfig {
    /// Configured task codes, rejecting the first unknown one.
    pub fn task_codes(&self) -> Result<Vec<TaskCode>, TaskError> {
        self.tasks.iter().map(|code| TaskCode::from_code(*code)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files are an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SemhlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<SemhlConfig, ConfigError> {
    Loader::new().build()
}
