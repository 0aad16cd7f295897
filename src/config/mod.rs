use secrecy::Secret;
use std::env;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";
const DEFAULT_SYSTEM_PROMPT: &str = "你是一个通用的AI助手。";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    MissingVar(&'static str),

    #[error("PORT is not a valid port number: '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct AnswerConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
}

impl AnswerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let port = match get_env("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(AnswerConfig {
            server: ServerConfig { port },
            upstream: UpstreamConfig {
                api_key: Secret::new(required_env("OPENAI_API_KEY")?),
                base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
                model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
                system_prompt: env_or("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT),
            },
        })
    }
}

/// Read a variable, treating empty values as unset.
fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    get_env(key).ok_or(ConfigError::MissingVar(key))
}

fn env_or(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}
