//! Layered configuration for instanews.
//!
//! Values are resolved in order, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: either the explicit path handed to
//!    [`Config::load`], or `config.{toml,yaml,json}` inside the platform
//!    configuration directory (see [`Config::directory`]).
//! 3. Environment variables prefixed with `INSTANEWS_`, nested with `__`
//!    (e.g. `INSTANEWS_AI__MODEL=gemini-2.5-flash`).
//! 4. `API_KEY` / `GEMINI_API_KEY`, both mapped onto `ai.api_key`.
//!
//! The merged result is validated before it is returned, so a [`Config`] in
//! hand is always usable.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use instanews_content::DEFAULT_LOGO_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "INSTANEWS_";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_UPLOAD_LIMIT: u64 = 10 * 1024 * 1024;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub brand: BrandConfig,
    pub export: ExportConfig,
    pub uploads: UploadConfig,
}

/// Connection settings for the summarization service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Never serialized back out; it only ever arrives from a file or the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Request timeout in seconds. No timeout when absent.
    pub timeout: Option<u64>,
}
impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Station identity drawn onto every card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    /// Text shown in place of the logo when no logo image is available.
    pub short_code: String,
    /// Label of the badge above the headline.
    pub badge_label: String,
    /// Logo used for fresh posts and whenever a post has none.
    pub logo: String,
}
impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            short_code: "ND".to_string(),
            badge_label: "Urgente".to_string(),
            logo: DEFAULT_LOGO_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    /// Prefix of exported file names, slugified before use.
    pub prefix: String,
    /// Extra stylesheets applied after the builtin card style, in order.
    pub stylesheets: Vec<PathBuf>,
    /// Skip discovery and use this Chrome/Chromium binary.
    pub chrome: Option<PathBuf>,
}
impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: "nd-noticia".to_string(),
            stylesheets: Vec::new(),
            chrome: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest local image accepted for the background or logo, in bytes.
    pub max_bytes: u64,
}
impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_bytes: DEFAULT_UPLOAD_LIMIT }
    }
}

impl Config {
    /// Platform configuration directory (e.g. `~/.config/instanews` on Linux).
    pub fn directory() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "instanews").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from every source, see the crate documentation for
    /// precedence. An explicit `path` must exist; the default files are optional.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.exists() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = Self::merge_file(figment, path);
            },
            None => {
                if let Some(dir) = Self::directory() {
                    tracing::debug!(directory = %dir.display(), "Looking for configuration files");
                    for name in ["config.toml", "config.yaml", "config.json"] {
                        figment = Self::merge_file(figment, dir.join(name));
                    }
                }
            },
        }
        let figment = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["API_KEY", "GEMINI_API_KEY"]).map(|_| "ai.api_key".into()));
        Self::from_figment(figment)
    }

    /// Extracts and validates a configuration from an already assembled [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(figment: Figment, path: impl AsRef<Path>) -> Figment {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.ai.model.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "ai.model", reason: "must not be empty".to_string() });
        }
        if self.ai.timeout == Some(0) {
            exn::bail!(ErrorKind::Invalid { field: "ai.timeout", reason: "must be at least one second".to_string() });
        }
        if self.uploads.max_bytes == 0 {
            exn::bail!(ErrorKind::Invalid { field: "uploads.max_bytes", reason: "must be positive".to_string() });
        }
        if self.export.prefix.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "export.prefix", reason: "must not be empty".to_string() });
        }
        Ok(())
    }
}
