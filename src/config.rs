//! Service configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a JSON config
//! file, environment variables, and finally CLI flags applied by `main`.
//!
//! Environment variables:
//! - `OPENAI_API_KEY` - bearer token for the generation endpoint
//! - `ANALYZER_LLM_URL` - base URL of an OpenAI-compatible API
//! - `ANALYZER_LLM_MODEL` - model name
//! - `ANALYZER_CORPUS_PATH` - JSON corpus file
//! - `ANALYZER_DRAFT_URL` - draft generation collaborator endpoint
//! - `ANALYZER_HISTORY_URL` - history service endpoint (notifications disabled when unset)
//! - `ANALYZER_CORS_ORIGINS` - comma-separated allowed origins (permissive when unset)
//! - `ANALYZER_RATE_LIMIT` - analyze requests per minute per client IP

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::drafting::DEFAULT_DRAFT_URL;
use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::GenerationParams;
use crate::synthesis::DEFAULT_KEY_POINTS;

const APP_NAME: &str = "requirement-analyzer";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub port: u16,
    pub corpus_path: PathBuf,

    pub llm_url: String,
    pub llm_model: String,
    /// Never written back to disk.
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,

    pub draft_url: String,
    pub draft_timeout_secs: u64,
    pub history_url: Option<String>,

    pub top_k: usize,
    pub snippet_chars: usize,
    pub max_features: usize,

    pub key_points_min: usize,
    pub key_points_max: usize,
    /// Upper bound on `num_proposals` per analyze request. Uncapped when unset.
    pub max_proposals: Option<usize>,

    pub cors_origins: Option<Vec<String>>,
    /// Requests per minute per client IP on `/analyze`. No limit when unset.
    pub rate_limit: Option<u32>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            corpus_path: PathBuf::from("data/requirement_corpus.json"),
            llm_url: DEFAULT_BASE_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_api_key: None,
            llm_timeout_secs: 120,
            temperature: 0.7,
            max_output_tokens: 1500,
            draft_url: DEFAULT_DRAFT_URL.to_string(),
            draft_timeout_secs: 300,
            history_url: None,
            top_k: crate::retrieval::DEFAULT_TOP_K,
            snippet_chars: crate::retrieval::DEFAULT_SNIPPET_CHARS,
            max_features: crate::retrieval::DEFAULT_MAX_FEATURES,
            key_points_min: *DEFAULT_KEY_POINTS.start(),
            key_points_max: *DEFAULT_KEY_POINTS.end(),
            max_proposals: None,
            cors_origins: None,
            rate_limit: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load from `path`, or from the user config directory when `path` is `None`,
    /// then apply environment overrides.
    ///
    /// A missing default config file is not an error; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm_api_key = Some(key);
        }
        if let Some(url) = lookup("ANALYZER_LLM_URL") {
            self.llm_url = url;
        }
        if let Some(model) = lookup("ANALYZER_LLM_MODEL") {
            self.llm_model = model;
        }
        if let Some(path) = lookup("ANALYZER_CORPUS_PATH") {
            self.corpus_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("ANALYZER_DRAFT_URL") {
            self.draft_url = url;
        }
        if let Some(url) = lookup("ANALYZER_HISTORY_URL") {
            self.history_url = Some(url);
        }
        if let Some(origins) = lookup("ANALYZER_CORS_ORIGINS") {
            self.cors_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        if let Some(limit) = lookup("ANALYZER_RATE_LIMIT").and_then(|s| s.parse().ok()) {
            self.rate_limit = Some(limit);
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn key_points(&self) -> RangeInclusive<usize> {
        self.key_points_min..=self.key_points_max.max(self.key_points_min)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn draft_timeout(&self) -> Duration {
        Duration::from_secs(self.draft_timeout_secs)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Some(dirs.config_dir().join(CONFIG_FILE))
}
