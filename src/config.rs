//! Runtime configuration, read from the environment (and `.env`).

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::llm::{AnthropicCaller, AsyncLlmCaller, OpenAiCaller, OPENAI_API_BASE};
use crate::types::AgentConfig;

pub const DEFAULT_OUTPUT: &str = "company_info.csv";
pub const DEFAULT_AGENT_OUTPUT: &str = "company_info_agent.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi    => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini    => "GOOGLE_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai"           => Ok(Provider::OpenAi),
            "anthropic"        => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(format!("unknown provider '{}' (expected openai, anthropic or gemini)", other)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi    => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini    => "gemini",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub provider:     Provider,
    /// Empty means the provider's default model
    pub model:        String,
    #[serde(skip_serializing)]
    pub api_key:      Option<String>,
    /// Overrides the provider's endpoint (OpenAI-compatible servers, proxies)
    pub api_base:     Option<String>,
    pub temperature:  f32,
    pub output:       PathBuf,
    pub agent_output: PathBuf,
    pub agent_max_steps: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider:        Provider::Gemini,
            model:           String::new(),
            api_key:         None,
            api_base:        None,
            temperature:     0.0,
            output:          PathBuf::from(DEFAULT_OUTPUT),
            agent_output:    PathBuf::from(DEFAULT_AGENT_OUTPUT),
            agent_max_steps: AgentConfig::default().max_steps,
        }
    }
}

impl ExtractorConfig {
    /// Loads `.env` if present, then applies `EXTRACTOR_*` variables over
    /// the defaults. The API key comes from the selected provider's variable.
    pub fn from_env() -> Result<Self, ExtractError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ExtractError::Config(format!(".env: {}", e)));
            }
        }

        let mut config = Self::default();
        if let Some(p) = var("EXTRACTOR_PROVIDER") {
            config.provider = p.parse().map_err(ExtractError::Config)?;
        }
        if let Some(m) = var("EXTRACTOR_MODEL") {
            config.model = m;
        }
        config.api_base = var("EXTRACTOR_API_BASE");
        if let Some(o) = var("EXTRACTOR_OUTPUT") {
            config.output = o.into();
        }
        if let Some(o) = var("EXTRACTOR_AGENT_OUTPUT") {
            config.agent_output = o.into();
        }
        if let Some(n) = var("EXTRACTOR_AGENT_MAX_STEPS") {
            config.agent_max_steps = n.parse()
                .map_err(|_| ExtractError::Config(format!("EXTRACTOR_AGENT_MAX_STEPS must be a number, got '{}'", n)))?;
        }
        config.api_key = var(config.provider.key_var());
        Ok(config)
    }

    /// Re-reads the API key after the provider changed (e.g. from a CLI flag).
    pub fn with_provider(mut self, provider: Provider) -> Self {
        if provider != self.provider {
            self.provider = provider;
            self.api_key = var(provider.key_var());
        }
        self
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            model:       self.model.clone(),
            temperature: self.temperature,
            max_steps:   self.agent_max_steps,
        }
    }

    /// Constructs the caller for the configured provider.
    pub fn build_llm(&self) -> Result<Arc<dyn AsyncLlmCaller>, ExtractError> {
        let key = self.api_key.clone().ok_or_else(|| {
            ExtractError::Config(format!("{} not set", self.provider.key_var()))
        })?;

        let llm: Arc<dyn AsyncLlmCaller> = match (self.provider, &self.api_base) {
            (Provider::OpenAi, Some(base)) => Arc::new(OpenAiCaller::with_base_url(base, key)),
            (Provider::OpenAi, None) => Arc::new(OpenAiCaller::with_base_url(OPENAI_API_BASE, key)),
            (Provider::Gemini, Some(base)) => Arc::new(
                OpenAiCaller::with_base_url(base, key).with_default_model("gemini-1.5-flash"),
            ),
            (Provider::Gemini, None) => Arc::new(OpenAiCaller::gemini(key)),
            (Provider::Anthropic, base) => {
                let caller = AnthropicCaller::new(key);
                Arc::new(match base {
                    Some(b) => caller.with_api_base(b.clone()),
                    None    => caller,
                })
            }
        };

        tracing::info!(provider = %self.provider, model = %self.model, "LLM caller ready");
        Ok(llm)
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("cohere".parse::<Provider>().is_err());
    }

    #[test]
    fn defaults_write_company_info_files() {
        let config = ExtractorConfig::default();
        assert_eq!(config.output, PathBuf::from("company_info.csv"));
        assert_eq!(config.agent_output, PathBuf::from("company_info_agent.csv"));
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn build_llm_requires_key() {
        let config = ExtractorConfig { api_key: None, ..ExtractorConfig::default() };
        assert!(matches!(config.build_llm(), Err(ExtractError::Config(_))));
    }
}
