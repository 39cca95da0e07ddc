//! Overridable user-facing strings (tool descriptions and titles).

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

const ENV_PREFIX: &str = "GITHUB_MCP_";

#[derive(Debug)]
pub enum TranslationError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid translations file {}: {source}", path.display())
            }
        }
    }
}

impl Error for TranslationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Resolves `key` to a string: `GITHUB_MCP_<KEY>` from the environment, then
/// the translations file, then the supplied default.
///
/// Cloning is cheap; clones share the record of used keys.
#[derive(Clone, Default)]
pub struct Translator {
    inner: Arc<TranslatorInner>,
}

#[derive(Default)]
struct TranslatorInner {
    active: bool,
    overrides: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
    used: Mutex<BTreeMap<String, String>>,
}

impl Translator {
    /// Always returns the default and records nothing.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    /// Builds a translator from in-memory overrides and the process environment.
    #[must_use]
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        let env = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        Self::with_env(overrides, env)
    }

    #[must_use]
    pub fn with_env(overrides: BTreeMap<String, String>, env: BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(key, value)| (key.to_uppercase(), value))
            .collect();
        Self {
            inner: Arc::new(TranslatorInner {
                active: true,
                overrides,
                env,
                used: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Loads overrides from a JSON object file. A missing file yields no overrides.
    ///
    /// # Errors
    /// Returns [`TranslationError`] if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, TranslationError> {
        if !path.exists() {
            return Ok(Self::new(BTreeMap::new()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| TranslationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides = serde_json::from_str(&raw).map_err(|source| TranslationError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(overrides))
    }

    #[must_use]
    pub fn translate(&self, key: &str, default: &str) -> String {
        if !self.inner.active {
            return default.to_string();
        }
        let key = key.to_uppercase();
        let value = self
            .inner
            .env
            .get(&format!("{ENV_PREFIX}{key}"))
            .or_else(|| self.inner.overrides.get(&key))
            .cloned()
            .unwrap_or_else(|| default.to_string());
        self.inner
            .used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.clone());
        value
    }

    /// Every key resolved so far with the value it resolved to.
    #[must_use]
    pub fn used_keys(&self) -> BTreeMap<String, String> {
        self.inner
            .used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Writes [`Self::used_keys`] as pretty JSON.
    ///
    /// # Errors
    /// Returns [`TranslationError::Io`] if the file cannot be written.
    pub fn export(&self, path: &Path) -> Result<(), TranslationError> {
        let used = self.used_keys();
        let json = serde_json::to_string_pretty(&used).map_err(|source| {
            TranslationError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|source| TranslationError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("active", &self.inner.active)
            .field("overrides", &self.inner.overrides.len())
            .finish_non_exhaustive()
    }
}
