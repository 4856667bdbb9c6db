// Configuration loading and parsing (debate.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::debate::prompt::{CLAIM_PLACEHOLDER, SKEPTIC_PLACEHOLDER};
use crate::provider::GenerationParams;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub debate: DebateSection,
    pub model: ModelConfig,
    pub generation: GenerationParams,
    pub prompts: PromptConfig,
    pub evaluation: EvaluationConfig,
    pub repetition_guard: RepetitionGuardConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// debate.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire debate.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DebateFile {
    debate: DebateSection,
    model: ModelConfig,
    generation: GenerationParams,
    #[serde(default)]
    prompts: PromptConfig,
    #[serde(default)]
    evaluation: EvaluationConfig,
    #[serde(default)]
    repetition_guard: RepetitionGuardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebateSection {
    /// Claim pre-filled in the TUI and used by `print` when no claim is given.
    pub default_claim: String,
}

/// Which HTTP backend serves generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Anthropic Messages API (streaming).
    Anthropic,
    /// Hugging Face text-generation-inference compatible endpoint.
    TextGeneration,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Anthropic => "anthropic",
            Backend::TextGeneration => "text-generation",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub backend: Backend,
    pub name: String,
    /// Overrides the backend's default URL. Required for `text-generation`.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Prompt templates and the labels stripped from each turn's output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub skeptic_template: String,
    pub skeptic_label: String,
    pub advocate_template: String,
    pub advocate_label: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            skeptic_template: "Question this claim: {claim}\nPotential issues:".to_string(),
            skeptic_label: "Potential issues:".to_string(),
            advocate_template:
                "Defend this claim: {claim}\nCounterarguments: {skeptic}\nDefense:".to_string(),
            advocate_label: "Defense:".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub evidence_keywords: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            evidence_keywords: vec!["study".to_string(), "research".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepetitionGuardConfig {
    pub enabled: bool,
    /// A pattern seen more than this many times trips the guard.
    pub max_repeats: usize,
    pub patterns: Vec<String>,
    pub warning: String,
}

impl Default for RepetitionGuardConfig {
    fn default() -> Self {
        RepetitionGuardConfig {
            enabled: true,
            max_repeats: 3,
            patterns: vec![
                "Potential issues:".to_string(),
                "Counterarguments:".to_string(),
                "Defense:".to_string(),
            ],
            warning: "[The model got stuck repeating itself. Try rephrasing the claim.]"
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
    pub hf_api_token: Option<String>,
}

impl CredentialsConfig {
    /// Fill missing keys from `ANTHROPIC_API_KEY` / `HF_API_TOKEN`.
    pub fn with_env_fallback(mut self) -> Self {
        if self.anthropic_api_key.as_deref().map_or(true, str::is_empty) {
            self.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if self.hf_api_token.as_deref().map_or(true, str::is_empty) {
            self.hf_api_token = std::env::var("HF_API_TOKEN").ok();
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/debate.toml` and (optionally)
/// `config/credentials.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive: it neither copies defaults nor
/// consults the environment. Prefer `load_config()` in binaries.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- debate.toml (required) ---
    let debate_path = config_dir.join("debate.toml");
    let debate_text = read_file(&debate_path)?;
    let debate_file: DebateFile =
        toml::from_str(&debate_text).map_err(|e| ConfigError::ParseError {
            path: debate_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        debate: debate_file.debate,
        model: debate_file.model,
        generation: debate_file.generation,
        prompts: debate_file.prompts,
        evaluation: debate_file.evaluation,
        repetition_guard: debate_file.repetition_guard,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first and filling credentials from the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    config.credentials = config.credentials.with_env_fallback();
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.debate.default_claim.trim().is_empty() {
        return Err(invalid("debate.default_claim", "must not be blank"));
    }

    // Model
    if config.model.name.trim().is_empty() {
        return Err(invalid("model.name", "must not be blank"));
    }
    if config.model.backend == Backend::TextGeneration && config.model.endpoint.is_none() {
        return Err(invalid(
            "model.endpoint",
            "is required for the text-generation backend",
        ));
    }

    // Generation budget and sampling
    let gen = &config.generation;
    if gen.max_new_tokens == 0 {
        return Err(invalid("generation.max_new_tokens", "must be greater than 0"));
    }
    if gen.do_sample {
        if !(gen.temperature > 0.0 && gen.temperature <= 2.0) {
            return Err(invalid(
                "generation.temperature",
                format!("must be in (0.0, 2.0] when sampling, got {}", gen.temperature),
            ));
        }
        if !(gen.top_p > 0.0 && gen.top_p <= 1.0) {
            return Err(invalid(
                "generation.top_p",
                format!("must be in (0.0, 1.0] when sampling, got {}", gen.top_p),
            ));
        }
    }

    // Prompt templates must carry their placeholders
    let prompts = &config.prompts;
    let required: &[(&str, &str, &str)] = &[
        ("prompts.skeptic_template", prompts.skeptic_template.as_str(), CLAIM_PLACEHOLDER),
        ("prompts.advocate_template", prompts.advocate_template.as_str(), CLAIM_PLACEHOLDER),
        ("prompts.advocate_template", prompts.advocate_template.as_str(), SKEPTIC_PLACEHOLDER),
    ];
    for (field, template, placeholder) in required {
        if !template.contains(placeholder) {
            return Err(invalid(field, format!("must contain {placeholder}")));
        }
    }
    let labels: &[(&str, &str)] = &[
        ("prompts.skeptic_label", prompts.skeptic_label.as_str()),
        ("prompts.advocate_label", prompts.advocate_label.as_str()),
    ];
    for (field, label) in labels {
        if label.is_empty() {
            return Err(invalid(field, "must not be empty"));
        }
    }

    // Evidence keywords: an empty keyword would match everything
    let keywords = &config.evaluation.evidence_keywords;
    if keywords.is_empty() {
        return Err(invalid("evaluation.evidence_keywords", "must not be empty"));
    }
    if keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(invalid(
            "evaluation.evidence_keywords",
            "must not contain blank keywords",
        ));
    }

    let guard = &config.repetition_guard;
    if guard.enabled {
        if guard.max_repeats == 0 {
            return Err(invalid("repetition_guard.max_repeats", "must be > 0"));
        }
        if guard.patterns.iter().any(|p| p.is_empty()) {
            return Err(invalid(
                "repetition_guard.patterns",
                "must not contain empty patterns",
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
