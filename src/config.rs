//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty or partial file is valid. API keys
//! are deliberately not part of the file; they come from the command line or
//! the environment (see [`crate::cli`]).
//!
//! ```yaml
//! store_path: ~/.config/fastnews/settings.json
//! news:
//!   base_url: https://newsapi.org/v2
//!   page_size: 20
//! model:
//!   name: gemini-2.5-flash
//!   temperature: 0.5
//!   max_output_tokens: 4000
//!   max_retries: 2
//! summary:
//!   char_budget: 8000
//! ```

use crate::error::Result;
use crate::generative::{self, GenerationConfig};
use crate::news;
use crate::summarize::DEFAULT_CHAR_BUDGET;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Preference file location. Defaults to [`default_store_path`].
    pub store_path: Option<PathBuf>,
    pub news: NewsConfig,
    pub model: ModelConfig,
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    /// Page size for keyword searches.
    pub page_size: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: news::DEFAULT_BASE_URL.to_string(),
            page_size: news::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: generative::DEFAULT_MODEL.to_string(),
            base_url: generative::DEFAULT_BASE_URL.to_string(),
            temperature: generative::DEFAULT_TEMPERATURE,
            max_output_tokens: generative::DEFAULT_MAX_OUTPUT_TOKENS,
            max_retries: 2,
            retry_base_delay_ms: 1000,
        }
    }
}

impl ModelConfig {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Characters of scraped text sent to the model.
    pub char_budget: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_CHAR_BUDGET,
        }
    }
}

/// `<config dir>/fastnews/settings.json`, or `./fastnews-settings.json` when
/// the platform has no config directory.
pub fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("fastnews").join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("fastnews-settings.json"))
}

impl Config {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read and parse the YAML file at `path`.
    ///
    /// # Errors
    ///
    /// `Error::Io` if the file cannot be read, `Error::Yaml` if it does not
    /// parse. A missing file is an error here; callers that want defaults
    /// use [`Config::default`].
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw)?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Store path from the file, falling back to the platform default.
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }
}
