//! Configuration and CLI argument handling

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Clone, Parser)]
#[command(name = "wod-timer")]
#[command(about = "Workout generation API with server-side workout timers")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "7071")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Azure OpenAI endpoint used for workout generation
    #[arg(long, env = "OPEN_AI_TARGET_URI")]
    pub llm_endpoint: Option<String>,

    /// Azure OpenAI API key
    #[arg(long, env = "OPEN_AI_TARGET_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Model deployment name
    #[arg(long, env = "OPEN_AI_MODEL", default_value = "o4-mini")]
    pub llm_model: String,

    /// Completion token limit for a generated workout
    #[arg(long, default_value = "1200")]
    pub max_tokens: u32,
}

impl Config {
    /// Parse configuration from command line arguments and environment
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// LLM settings, present only when both endpoint and key are configured
    pub fn llm_settings(&self) -> Option<LlmSettings> {
        let endpoint = self.llm_endpoint.as_deref().filter(|s| !s.trim().is_empty())?;
        let api_key = self.llm_api_key.as_deref().filter(|s| !s.trim().is_empty())?;

        Some(LlmSettings {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: self.llm_model.clone(),
            max_tokens: self.max_tokens,
        })
    }
}

/// Connection settings for the workout generation model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}
