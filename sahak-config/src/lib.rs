//! Loader for sahak configuration with YAML + environment overlays.
//!
//! Sources are merged lowest to highest: built-in defaults, an optional
//! YAML file, then `SAHAK__`-prefixed environment variables (`__` separates
//! nested keys, e.g. `SAHAK__LLM__MODEL`). String values then go through
//! `${VAR}` expansion, repeated up to eight times so variables may refer to
//! other variables.
//!
//! ```yaml
//! llm:
//!   provider: gemini
//!   model: gemini-2.5-flash-lite
//!   api_key: "${GEMINI_API_KEY}"
//!   page_models: true
//! cache:
//!   enabled: true
//!   ttl_secs: 3600
//! sources:
//!   timeout_secs: 5
//! log:
//!   level: info
//!   format: text
//! ```
use config::{Config, ConfigError, Environment, File};
use sahak_common::LlmConfig;
use sahak_common::observability::LogFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Environment variable consulted when the file carries no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "sahak.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SahakConfig {
    pub version: Option<String>,
    pub llm: LlmSettings,
    pub cache: CacheSettings,
    pub sources: SourceSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Let pages that pin a model use it instead of `model`.
    pub page_models: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: "gemini-2.5-flash-lite".into(),
            api_key: None,
            temperature: None,
            max_tokens: None,
            endpoint: None,
            timeout_secs: None,
            page_models: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Overrides applied to every document source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            dir: None,
            stderr: false,
        }
    }
}

impl SahakConfig {
    /// API key from the file, else from `GEMINI_API_KEY`.
    ///
    /// A value still holding an unexpanded `${...}` counts as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.llm
            .api_key
            .as_deref()
            .and_then(usable_secret)
            .or_else(|| std::env::var(API_KEY_ENV).ok().as_deref().and_then(usable_secret))
    }

    /// Provider configuration for `sahak-llm`.
    pub fn llm_config(&self, api_key: String) -> LlmConfig {
        match self.llm.provider {
            Provider::Gemini => LlmConfig::Gemini {
                api_key,
                model: self.llm.model.clone(),
                endpoint: self.llm.endpoint.clone(),
                timeout_secs: self.llm.timeout_secs,
                temperature: self.llm.temperature,
                max_tokens: self.llm.max_tokens,
            },
        }
    }

    /// YAML rendering with the API key masked.
    pub fn to_redacted_yaml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("<redacted>".into());
        }
        serde_yaml::to_string(&shown).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

fn usable_secret(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("${") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Candidate config files, most specific first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sahak").join(CONFIG_FILE_NAME));
    }
    paths
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SahakConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SahakConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SahakConfigLoader {
    /// Start from defaults; `SAHAK__` environment overrides are applied last.
    ///
    /// ```
    /// use sahak_config::SahakConfigLoader;
    ///
    /// let config = SahakConfigLoader::new()
    ///     .with_yaml_str("cache:\n  ttl_secs: 60")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.cache.ttl_secs, 60);
    /// assert!(config.cache.enabled);
    /// assert_eq!(config.llm.model, "gemini-2.5-flash-lite");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge the first existing file from [`default_config_paths`].
    pub fn with_default_files(self) -> Self {
        match default_config_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => self.with_file(path),
            None => self,
        }
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use sahak_config::SahakConfigLoader;
    /// use sahak_common::observability::LogFormat;
    ///
    /// let cfg = SahakConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   model: gemini-2.5-flash
    ///   temperature: 0.2
    /// log:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.llm.model, "gemini-2.5-flash");
    /// assert_eq!(cfg.llm.temperature, Some(0.2));
    /// assert_eq!(cfg.log.format, LogFormat::Json);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    pub fn load(self) -> Result<SahakConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SAHAK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SahakConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}
