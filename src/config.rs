//! Process configuration.
//!
//! Built once at start-up from the environment (after `.env` is loaded) and
//! passed down explicitly; nothing below the command layer reads the
//! environment itself.

use crate::error::{Error, Result};
use crate::generation::Tone;
use crate::generation::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `OPENAI_API_KEY`; only `generate` needs it
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Total attempts per model request
    pub max_retries: u32,
    pub timeout: Duration,
    pub default_slides: usize,
    pub default_template: String,
    pub default_tone: Tone,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            timeout: Duration::from_secs(30),
            default_slides: 6,
            default_template: "corporate".to_string(),
            default_tone: Tone::Professional,
            templates_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("output"),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Configuration(format!("{name}='{raw}': {e}"))),
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = parse_var("TIMEOUT_SECONDS", get("TIMEOUT_SECONDS"), 30u64)?;
        if timeout_secs == 0 {
            return Err(Error::Configuration("TIMEOUT_SECONDS must be positive".into()));
        }

        Ok(Self {
            api_key: get("OPENAI_API_KEY").map(|key| key.trim().to_string()),
            model: get("MODEL").unwrap_or(defaults.model),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            max_retries: parse_var("MAX_RETRIES", get("MAX_RETRIES"), defaults.max_retries)?,
            timeout: Duration::from_secs(timeout_secs),
            default_slides: parse_var("DEFAULT_SLIDES", get("DEFAULT_SLIDES"), defaults.default_slides)?,
            default_template: get("DEFAULT_TEMPLATE").unwrap_or(defaults.default_template),
            default_tone: parse_var("DEFAULT_TONE", get("DEFAULT_TONE"), defaults.default_tone)?,
            templates_dir: get("DOCGEN_TEMPLATES_DIR").map_or(defaults.templates_dir, PathBuf::from),
            output_dir: get("DOCGEN_OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from),
        })
    }

    /// The API key, or a configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Configuration(
                "OPENAI_API_KEY is not set; export it or add it to a .env file".into(),
            )
        })
    }
}
