//! Configuration for the benchmark harness.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4", "claude-3-opus")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "claude-latest".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Settings for one LLM-backed system under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Label used in progress output.
    pub name: String,
    /// Only the last `context_window` turns are sent as history (all when `None`).
    pub context_window: Option<usize>,
    /// System prompt for the responder.
    pub system_prompt: String,
}

impl ResponderConfig {
    /// Default candidate: sees the full dialogue history.
    pub fn candidate() -> Self {
        Self {
            name: "candidate".to_string(),
            context_window: None,
            system_prompt: crate::llm::Prompts::responder_system().to_string(),
        }
    }

    /// Default baseline: sees only the most recent turns.
    pub fn baseline() -> Self {
        Self {
            name: "baseline".to_string(),
            context_window: Some(4),
            system_prompt: crate::llm::Prompts::responder_system().to_string(),
        }
    }
}

/// Benchmark run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of sessions drawn from the dataset.
    pub n_samples: usize,
    /// Seed for the pairwise presentation order (entropy when `None`).
    pub seed: Option<u64>,
    /// Directory for timestamped result files.
    pub output_dir: PathBuf,
    /// Dataset file or directory (built-in sample when `None`).
    pub dataset: Option<PathBuf>,
    /// Candidate system settings.
    pub candidate: ResponderConfig,
    /// Baseline system settings.
    pub baseline: ResponderConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n_samples: 30,
            seed: None,
            output_dir: PathBuf::from("results"),
            dataset: None,
            candidate: ResponderConfig::candidate(),
            baseline: ResponderConfig::baseline(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Benchmark settings
    pub bench: BenchConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    bench: Option<BenchFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct BenchFileSection {
    n_samples: Option<usize>,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
    dataset: Option<PathBuf>,
    candidate: Option<ResponderFileSection>,
    baseline: Option<ResponderFileSection>,
}

#[derive(Debug, Deserialize)]
struct ResponderFileSection {
    name: Option<String>,
    context_window: Option<usize>,
    system_prompt: Option<String>,
}

impl ResponderFileSection {
    fn apply(self, target: &mut ResponderConfig) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if self.context_window.is_some() {
            target.context_window = self.context_window;
        }
        if let Some(prompt) = self.system_prompt {
            target.system_prompt = prompt;
        }
    }
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY, LLM_MODEL, MCP_BENCH_SAMPLES, ...)
    /// 2. Config file (~/.config/mcp-bench/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = lookup("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }

        if let Some(api_key) = lookup("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }

        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(tokens) = lookup("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }

        if let Some(temp) = lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }

        if let Some(samples) = lookup("MCP_BENCH_SAMPLES").and_then(|v| v.parse().ok()) {
            self.bench.n_samples = samples;
        }

        if let Some(seed) = lookup("MCP_BENCH_SEED").and_then(|v| v.parse().ok()) {
            self.bench.seed = Some(seed);
        }

        if let Some(dir) = lookup("MCP_BENCH_OUTPUT_DIR") {
            self.bench.output_dir = PathBuf::from(dir);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| BenchError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(bench) = file_config.bench {
            if let Some(n_samples) = bench.n_samples {
                config.bench.n_samples = n_samples;
            }
            if bench.seed.is_some() {
                config.bench.seed = bench.seed;
            }
            if let Some(output_dir) = bench.output_dir {
                config.bench.output_dir = output_dir;
            }
            if bench.dataset.is_some() {
                config.bench.dataset = bench.dataset;
            }
            if let Some(candidate) = bench.candidate {
                candidate.apply(&mut config.bench.candidate);
            }
            if let Some(baseline) = bench.baseline {
                baseline.apply(&mut config.bench.baseline);
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mcp-bench")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(BenchError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.api_key.is_empty() {
            return Err(BenchError::Config(
                "LLM API key is required. Set LLM_API_KEY environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(BenchError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if self.bench.n_samples == 0 {
            return Err(BenchError::InvalidConfig(
                "n_samples must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            bench: BenchConfig::default(),
        }
    }
}
