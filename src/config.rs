//! Server configuration: command line flags layered over an optional YAML file.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolgate_toolsets::{ScopeFilter, Translator};
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(name = "toolgate", version, about = "MCP server with runtime toolset discovery")]
pub struct Args {
    /// YAML configuration file. Flags override values from the file.
    #[arg(long, short = 'c', env = "TOOLGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Toolsets enabled at start; accepts `all` and `default`.
    #[arg(long, value_delimiter = ',', env = "TOOLGATE_TOOLSETS")]
    pub toolsets: Option<Vec<String>>,

    /// Start with only the discovery tools and let the agent enable toolsets.
    #[arg(long)]
    pub dynamic_toolsets: bool,

    /// Hide and refuse every tool that writes upstream.
    #[arg(long)]
    pub read_only: bool,

    /// Granted token scopes. When unset they are read from the upstream API.
    #[arg(long, value_delimiter = ',')]
    pub scopes: Option<Vec<String>>,

    #[arg(long, env = "TOOLGATE_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "TOOLGATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log filter, e.g. `info` or `toolgate=debug`. Overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_toolsets")]
    pub toolsets: Vec<String>,

    #[serde(default)]
    pub dynamic_toolsets: bool,

    #[serde(default)]
    pub read_only: bool,

    /// Explicit scopes; `None` means discover them from the token.
    #[serde(default)]
    pub scopes: Option<Vec<String>>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub token: Option<String>,

    /// Overrides for tool, toolset and prompt text, keyed by translation key.
    #[serde(default)]
    pub translations: HashMap<String, String>,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive; falls back to RUST_LOG, then `info`.
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub json: bool,
}

fn default_toolsets() -> Vec<String> {
    vec!["default".to_string()]
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            toolsets: default_toolsets(),
            dynamic_toolsets: false,
            read_only: false,
            scopes: None,
            api_url: default_api_url(),
            token: None,
            translations: HashMap::new(),
            log: LogConfig::default(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("toolsets", &self.toolsets)
            .field("dynamic_toolsets", &self.dynamic_toolsets)
            .field("read_only", &self.read_only)
            .field("scopes", &self.scopes)
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("translations", &self.translations.len())
            .field("log", &self.log)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the effective configuration: file (if any), then flags.
    pub async fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(toolsets) = &args.toolsets {
            self.toolsets = toolsets.clone();
        }
        self.dynamic_toolsets |= args.dynamic_toolsets;
        self.read_only |= args.read_only;
        if let Some(scopes) = &args.scopes {
            self.scopes = Some(scopes.clone());
        }
        if let Some(url) = &args.api_url {
            self.api_url = url.clone();
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(level) = &args.log_level {
            self.log.level = Some(level.clone());
        }
        self.log.json |= args.log_json;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidApiUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(())
    }

    pub fn translator(&self) -> Translator {
        if self.translations.is_empty() {
            Translator::identity()
        } else {
            Translator::with_overrides(self.translations.clone())
        }
    }

    /// Scope filter from explicitly configured scopes, if any.
    pub fn explicit_scope_filter(&self) -> Option<ScopeFilter> {
        self.scopes.as_ref().map(|s| ScopeFilter::new(s.iter().cloned()))
    }
}
