//! Run configuration
//!
//! Loaded from `.golden-thread.config.yaml`. String values may reference
//! environment variables as `${NAME}`; every reference must resolve.

use gt_registry::ClientConfig;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const CONFIG_FILENAME: &str = ".golden-thread.config.yaml";

static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("environment reference pattern is constant and valid"));

/// Configuration failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file missing
    #[error("configuration file not found: {}; create a {CONFIG_FILENAME} in the repository root", .0.display())]
    NotFound(PathBuf),

    /// Config file unreadable
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not YAML
    #[error("failed to parse configuration file: {0}")]
    Syntax(serde_yaml::Error),

    /// Blank document
    #[error("configuration file is empty")]
    Empty,

    /// Referenced environment variable is unset
    #[error("environment variable ${{{0}}} is not set")]
    MissingEnv(String),

    /// Registry token absent after substitution
    #[error("missing required configuration: registry.api_token; set it in the config file or via an environment variable")]
    MissingToken,

    /// Well-formed YAML with the wrong shape
    #[error("invalid configuration: {0}")]
    Invalid(serde_yaml::Error),
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Seconds
    pub ttl: u64,
    pub directory: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 3600,
            directory: PathBuf::from(".golden-thread-cache"),
        }
    }
}

/// Registry connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Type tag → database id
    #[serde(default)]
    pub databases: BTreeMap<String, String>,
}

fn default_version() -> String {
    gt_registry::client::DEFAULT_API_VERSION.to_string()
}

fn default_timeout() -> u64 {
    gt_registry::client::DEFAULT_TIMEOUT.as_secs()
}

fn default_base_url() -> String {
    gt_registry::client::DEFAULT_BASE_URL.to_string()
}

fn default_rate_limit() -> u32 {
    gt_registry::rate_limit::DEFAULT_RATE_LIMIT
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            version: default_version(),
            timeout: default_timeout(),
            base_url: default_base_url(),
            rate_limit: default_rate_limit(),
            cache: CacheSettings::default(),
            databases: BTreeMap::new(),
        }
    }
}

impl RegistrySettings {
    /// Client configuration for these settings
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_token)
            .with_base_url(&self.base_url)
            .with_rate_limit(self.rate_limit);
        config.version.clone_from(&self.version);
        config.timeout = Duration::from_secs(self.timeout);
        if self.cache.enabled {
            config.with_cache(&self.cache.directory, Duration::from_secs(self.cache.ttl))
        } else {
            config.without_cache()
        }
    }
}

/// Service discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub strategy: String,
    pub manifest_filename: String,
    pub root_directories: Vec<PathBuf>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            strategy: "manifest".to_string(),
            manifest_filename: gt_manifest::MANIFEST_FILENAME.to_string(),
            root_directories: vec![PathBuf::from("services/"), PathBuf::from("packages/")],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServicesSettings {
    pub discovery: DiscoverySettings,
}

/// One language's extractor settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParserSettings {
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Kind words: `classes`, `functions`, ...
    #[serde(default)]
    pub extract: Vec<String>,
}

fn enabled() -> bool {
    true
}

impl ParserSettings {
    fn with_defaults(words: &[&str]) -> Self {
        Self {
            enabled: true,
            extract: words.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParsersSettings {
    pub python: ParserSettings,
    pub typescript: ParserSettings,
    pub go: ParserSettings,
}

impl Default for ParsersSettings {
    fn default() -> Self {
        Self {
            python: ParserSettings::with_defaults(gt_symbol::Language::Python.default_extract()),
            typescript: ParserSettings::with_defaults(gt_symbol::Language::TypeScript.default_extract()),
            go: ParserSettings::with_defaults(gt_symbol::Language::Go.default_extract()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub strict_mode: bool,
    /// Globs over service-relative paths skipped during extraction
    pub ignore_patterns: Vec<String>,
    pub required_ids: Vec<String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            strict_mode: false,
            ignore_patterns: ["**/test_*.py", "**/*.test.ts", "**/*_test.go", "**/mock_*.py"]
                .into_iter()
                .map(String::from)
                .collect(),
            required_ids: ["BR", "UR", "FEAT", "FR"].into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_directory: PathBuf,
    pub formats: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from(".golden-thread-reports"),
            formats: vec!["json".to_string(), "html".to_string()],
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default, alias = "notion")]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub services: ServicesSettings,
    #[serde(default)]
    pub parsers: ParsersSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub reports: ReportSettings,
}

impl Config {
    /// Load a configuration file, resolving `${VAR}` from the process environment
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file is missing, unreadable, empty,
    /// malformed, references an unset variable, or lacks an API token.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text, |name| std::env::var(name).ok())
    }

    /// Parse configuration text with an explicit variable lookup
    ///
    /// # Errors
    /// Same as [`Config::load`], minus the file-system cases.
    pub fn from_yaml_str<F>(text: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let blank = text.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return Err(ConfigError::Empty);
        }
        let raw: Value = serde_yaml::from_str(text).map_err(ConfigError::Syntax)?;
        if raw.is_null() {
            return Err(ConfigError::Empty);
        }
        let resolved = substitute_env(raw, &lookup)?;

        let config: Config = serde_yaml::from_value(resolved).map_err(ConfigError::Invalid)?;
        if config.registry.api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(config)
    }

    /// Extractor settings for a language
    #[must_use]
    pub fn parser(&self, language: gt_symbol::Language) -> &ParserSettings {
        match language {
            gt_symbol::Language::Python => &self.parsers.python,
            gt_symbol::Language::TypeScript => &self.parsers.typescript,
            gt_symbol::Language::Go => &self.parsers.go,
        }
    }
}

/// Replace `${NAME}` references in every string of a YAML tree
///
/// # Errors
/// [`ConfigError::MissingEnv`] for the first reference `lookup` cannot resolve.
pub fn substitute_env<F>(value: Value, lookup: &F) -> Result<Value, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(match value {
        Value::String(text) => Value::String(substitute_str(&text, lookup)?),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| substitute_env(item, lookup))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut resolved = serde_yaml::Mapping::new();
            for (key, item) in map {
                resolved.insert(key, substitute_env(item, lookup)?);
            }
            Value::Mapping(resolved)
        }
        Value::Tagged(mut tagged) => {
            tagged.value = substitute_env(tagged.value, lookup)?;
            Value::Tagged(tagged)
        }
        other => other,
    })
}

fn substitute_str<F>(text: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(missing) = ENV_REFERENCE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|name| lookup(name).is_none())
    {
        return Err(ConfigError::MissingEnv(missing));
    }
    Ok(ENV_REFERENCE
        .replace_all(text, |caps: &Captures<'_>| lookup(&caps[1]).unwrap_or_default())
        .into_owned())
}
