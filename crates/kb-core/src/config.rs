//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_CHUNKING__CHUNK_SIZE=800`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub kb: KbConfig,
    pub chunking: ChunkingConfig,
    pub index: IndexConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Project root that relative corpus paths are resolved against.
    pub root: String,
    /// Directory holding the Markdown knowledge base.
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_documents: Option<usize>,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self { root: ".".to_string(), dir: "data/kb".to_string(), max_documents: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Vocabulary cap (unigrams + bigrams).
    pub max_features: usize,
}

impl Default for IndexConfig {
    fn default() -> Self { Self { max_features: 5000 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub top_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self { Self { top_k: 3 } }
}

/// Log filter settings; `RUST_LOG` wins over these when set.
///
/// ```toml
/// [logging]
/// default = "info"
///
/// [logging.modules]
/// kb_retrieval = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub default: String,
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { default: "info".to_string(), modules: BTreeMap::new() } }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.index.max_features == 0 {
            return Err(Error::InvalidConfig("index.max_features must be greater than zero".to_string()));
        }
        if self.query.top_k == 0 {
            return Err(Error::InvalidConfig("query.top_k must be greater than zero".to_string()));
        }
        if self.kb.dir.trim().is_empty() {
            return Err(Error::InvalidConfig("kb.dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// Absolute-or-root-relative location of the knowledge base.
    pub fn corpus_dir(&self) -> PathBuf {
        resolve_with_base(&expand_path(&self.kb.root), &self.kb.dir)
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the current working directory.
    pub fn load() -> Result<Self> {
        let root = env::current_dir()?;
        Self::load_from(&root)
    }

    /// Load `config.toml` and `config.<env>.toml` from `root`; `root` also
    /// becomes the default `kb.root`.
    pub fn load_from(root: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Serialized::default("kb.root", root.to_string_lossy().to_string()))
            .merge(Toml::file(root.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(root.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(root.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(root.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
