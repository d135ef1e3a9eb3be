use serde::Deserialize;
use std::env;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// First set variable wins. Lets provider keys fall back to `OPENAI_API_KEY`.
fn env_first(vars: &[&str]) -> Option<String> {
    vars.iter()
        .find_map(|var| env::var(var).ok().filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub corpus: CorpusConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    pub search: SearchConfig,
    pub sessions: SessionConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
    pub log_json: bool,
}

/// Reference database holding the remedy tables (and the symptom corpus when
/// no snapshot file is configured).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// JSON Lines snapshot. When unset the corpus is read from the `symptoms` table.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    /// Requested output dimensionality, forwarded to providers that support it.
    pub dimensions: Option<usize>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

/// LLM configuration for the classification model
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Optional JSON file replacing the built-in classifier seed conversation.
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub randomization_factor: f64,
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub top_n: usize,
    /// L2-normalize the query embedding before the dot product.
    pub normalize_query: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub delimiter: char,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay_ms: 1000,
            max_delay_ms: 20_000,
            randomization_factor: 0.5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let defaults = RetryConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("REMEDIA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("REMEDIA_PORT", 3000),
                api_keys: env::var("REMEDIA_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                log_json: parse_env_or("LOG_JSON", false),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:synthesis.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            corpus: CorpusConfig {
                path: env::var("CORPUS_PATH").ok().filter(|p| !p.trim().is_empty()),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "openai/text-embedding-3-small".to_string()),
                dimensions: parse_env_opt("EMBEDDING_DIMENSIONS"),
                api_key: env_first(&["EMBEDDING_API_KEY", "OPENAI_API_KEY"]),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "openai/gpt-4o".to_string()),
                api_key: env_first(&["LLM_API_KEY", "OPENAI_API_KEY"]),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.1),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", 300),
                seed_path: env::var("CLASSIFIER_SEED_PATH").ok(),
            },
            retry: RetryConfig {
                max_attempts: parse_env_or("RETRY_MAX_ATTEMPTS", defaults.max_attempts),
                initial_delay_ms: parse_env_or("RETRY_INITIAL_DELAY_MS", defaults.initial_delay_ms),
                max_delay_ms: parse_env_or("RETRY_MAX_DELAY_MS", defaults.max_delay_ms),
                randomization_factor: parse_env_or(
                    "RETRY_RANDOMIZATION_FACTOR",
                    defaults.randomization_factor,
                ),
            },
            search: SearchConfig {
                top_n: parse_env_or("SEARCH_TOP_N", 100),
                normalize_query: parse_env_or("SEARCH_NORMALIZE_QUERY", true),
            },
            sessions: SessionConfig {
                capacity: parse_env_or("SESSION_CAPACITY", 1000),
            },
            report: ReportConfig {
                delimiter: parse_env_or("REPORT_DELIMITER", ','),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known providers that use OpenAI-compatible APIs
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

/// Provider-specific default base URLs
pub fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        _ => "https://api.openai.com/v1",
    }
}

pub fn provider_needs_api_key(provider: &str) -> bool {
    !matches!(
        provider.to_lowercase().as_str(),
        "ollama" | "local" | "lmstudio"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_retry_defaults() {
        std::env::remove_var("RETRY_MAX_ATTEMPTS");
        std::env::remove_var("RETRY_INITIAL_DELAY_MS");
        std::env::remove_var("RETRY_MAX_DELAY_MS");

        let config = Config::default();
        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.initial_delay(), Duration::from_secs(1));
        assert_eq!(config.retry.max_delay(), Duration::from_secs(20));
    }

    #[test]
    #[serial]
    fn test_search_defaults() {
        std::env::remove_var("SEARCH_TOP_N");
        std::env::remove_var("SEARCH_NORMALIZE_QUERY");

        let config = Config::default();
        assert_eq!(config.search.top_n, 100);
        assert!(config.search.normalize_query);
    }

    #[test]
    #[serial]
    fn test_llm_defaults() {
        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_TEMPERATURE");
        std::env::remove_var("LLM_MAX_TOKENS");

        let config = Config::default();
        assert_eq!(config.llm.model, "openai/gpt-4o");
        assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.llm.max_tokens, 300);
    }

    #[test]
    #[serial]
    fn test_api_key_falls_back_to_openai_key() {
        std::env::remove_var("LLM_API_KEY");
        std::env::remove_var("EMBEDDING_API_KEY");
        std::env::set_var("OPENAI_API_KEY", "sk-shared");

        let config = Config::default();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-shared"));
        assert_eq!(config.embeddings.api_key.as_deref(), Some("sk-shared"));

        std::env::set_var("LLM_API_KEY", "sk-llm");
        let config = Config::default();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-llm"));

        std::env::remove_var("LLM_API_KEY");
        std::env::remove_var("OPENAI_API_KEY");
    }

    #[test]
    #[serial]
    fn test_invalid_value_falls_back_to_default() {
        std::env::set_var("SEARCH_TOP_N", "many");
        let config = Config::default();
        assert_eq!(config.search.top_n, 100);
        std::env::remove_var("SEARCH_TOP_N");
    }

    #[test]
    #[serial]
    fn test_api_keys_are_trimmed_and_split() {
        std::env::set_var("REMEDIA_API_KEYS", " a , b,,c ");
        let config = Config::default();
        assert_eq!(config.server.api_keys, vec!["a", "b", "c"]);
        std::env::remove_var("REMEDIA_API_KEYS");
    }

    #[test]
    fn test_parse_provider_model() {
        assert_eq!(
            parse_provider_model("openai/text-embedding-3-small"),
            ("openai", "text-embedding-3-small")
        );
        assert_eq!(
            parse_provider_model("openrouter/openai/gpt-4o"),
            ("openrouter", "openai/gpt-4o")
        );
        assert_eq!(parse_provider_model("gpt-4o"), ("local", "gpt-4o"));
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(default_base_url("openai"), "https://api.openai.com/v1");
        assert_eq!(default_base_url("OLLAMA"), "http://localhost:11434/v1");
        assert_eq!(default_base_url("unknown"), "https://api.openai.com/v1");
    }
}
