use anyhow::{Context, Result};
use chrono::Datelike;

use crate::analysis::normalizer::FieldPolicy;

const DEFAULT_EMPLOYEES_PATH: &str = "data/Employee_Profiles.json";
const DEFAULT_TAXONOMY_PATH: &str = "data/skills_taxonomy.json";

/// Application configuration loaded from environment variables.
///
/// Dataset paths and tuning knobs have defaults. The model endpoint and
/// credential are optional here: a missing value only fails the first
/// `/api/analyze` call, so the read-only endpoints work without them.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub employees_path: String,
    pub taxonomy_path: String,
    pub llm: LlmConfig,
    pub tenure_reference_year: i32,
    pub field_policy: FieldPolicy,
}

/// Settings for the outbound chat-completion call.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub api_key: Option<String>,
    /// Local-testing key; takes precedence over `api_key` when set.
    pub api_key_override: Option<String>,
    pub auth_header: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// The credential actually sent upstream.
    pub fn effective_key(&self) -> Option<&str> {
        self.api_key_override
            .as_deref()
            .or(self.api_key.as_deref())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_version: None,
            api_key: None,
            api_key_override: None,
            auth_header: "api-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = LlmConfig::default();

        Ok(Config {
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            employees_path: std::env::var("EMPLOYEES_PATH")
                .unwrap_or_else(|_| DEFAULT_EMPLOYEES_PATH.to_string()),
            taxonomy_path: std::env::var("TAXONOMY_PATH")
                .unwrap_or_else(|_| DEFAULT_TAXONOMY_PATH.to_string()),
            llm: LlmConfig {
                base_url: optional_env("LLM_API_BASE_URL"),
                api_version: optional_env("LLM_API_VERSION"),
                api_key: optional_env("LLM_API_KEY"),
                api_key_override: optional_env("LLM_API_KEY_OVERRIDE"),
                auth_header: optional_env("LLM_AUTH_HEADER").unwrap_or(defaults.auth_header),
                model: optional_env("LLM_MODEL").unwrap_or(defaults.model),
                max_tokens: parse_env("LLM_MAX_TOKENS", defaults.max_tokens)?,
                temperature: parse_env("LLM_TEMPERATURE", defaults.temperature)?,
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
            tenure_reference_year: parse_env(
                "TENURE_REFERENCE_YEAR",
                chrono::Utc::now().year(),
            )?,
            field_policy: match optional_env("PLAN_FIELD_POLICY") {
                Some(raw) => raw
                    .parse::<FieldPolicy>()
                    .map_err(anyhow::Error::msg)
                    .context("PLAN_FIELD_POLICY must be 'lenient' or 'strict'")?,
                None => FieldPolicy::default(),
            },
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
