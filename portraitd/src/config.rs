//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PORTRAITD_CONFIG`
//! environment variable.
//!
//! Sources are merged in order (later overrides earlier):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PORTRAITD_` override YAML values;
//!    nested fields use double underscores, e.g. `PORTRAITD_GEMINI__MODEL=...`
//! 3. **GEMINI_API_KEY** - Special case: the vendor-documented variable name overrides
//!    `gemini.api_key` if set
//!
//! ```bash
//! # Override server port
//! PORTRAITD_PORT=8080
//!
//! # Set the upstream credential (preferred method)
//! GEMINI_API_KEY="..."
//!
//! # Or use the prefixed form
//! PORTRAITD_GEMINI__API_KEY="..."
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PORTRAITD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation; a
/// deployment only needs to provide the upstream credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Upstream generative-image service configuration
    pub gemini: GeminiConfig,
    /// Upload acceptance limits
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            gemini: GeminiConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

/// Settings for the Gemini `generateContent` upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiConfig {
    /// Server-held API credential. Absence is a deployment error, reported
    /// per request as HTTP 500 rather than failing startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier used for portrait generation
    pub model: String,
    /// Base URL of the generative-language API. Overridable so tests can
    /// point the client at a local mock.
    pub base_url: Url,
    /// Timeout applied to the one synchronous upstream call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash-image-preview".to_string(),
            base_url: Url::parse("https://generativelanguage.googleapis.com").expect("default base_url is valid"),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Limits applied to incoming uploads before any upstream transfer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes. Bounds per-request memory,
    /// since the whole payload is buffered before transfer.
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PORTRAITD_").split("__"))
            // The vendor documents GEMINI_API_KEY; accept it alongside
            // PORTRAITD_GEMINI__API_KEY
            .merge(Env::raw().only(&["GEMINI_API_KEY"]).map(|_| "gemini.api_key".into()).split("."))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.gemini.model.is_empty() {
            return Err("Config validation: gemini.model must not be empty".to_string());
        }
        if self.upload.max_file_size == 0 {
            return Err("Config validation: upload.max_file_size must be greater than zero".to_string());
        }
        if self.gemini.timeout.is_zero() {
            return Err("Config validation: gemini.timeout must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
