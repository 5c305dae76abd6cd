use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends for question phrasing and feedback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    /// A local Ollama server through its OpenAI-compatible `/v1` endpoint.
    Ollama,
    OpenAI,
    /// No model at all: template questions and fallback feedback.
    Offline,
}

impl Provider {
    fn default_api_base(&self) -> &'static str {
        match self {
            Provider::Ollama => "http://localhost:11434/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Offline => "",
        }
    }
}

/// Assessment length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One topical question per criterion group.
    Quick,
    /// Five topical questions per criterion group.
    Full,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Quick => "quick",
            Mode::Full => "full",
        }
    }

    /// Parses the answer to the interactive mode prompt.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "1" | "quick" | "q" => Some(Mode::Quick),
            "2" | "full" | "f" => Some(Mode::Full),
            _ => None,
        }
    }
}

/// Command-line flags. Paths given here override the environment.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "assess", version, about = "Adaptive role-play assessment in the terminal")]
pub struct Args {
    /// Assessment mode; asked interactively when omitted.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Path to the case document.
    #[arg(long)]
    pub case: Option<PathBuf>,

    /// Path to the metrics document.
    #[arg(long)]
    pub metrics: Option<PathBuf>,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: Provider,
    pub api_base: String,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub llm_timeout: Duration,
    pub rephrase_followups: bool,
    pub log_level: Level,
    pub prompts_path: PathBuf,
    pub case_path: PathBuf,
    pub metrics_path: PathBuf,
    pub sessions_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "ollama" => Provider::Ollama,
            "openai" => Provider::OpenAI,
            "offline" => Provider::Offline,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not one of ollama, openai, offline", other),
                ));
            }
        };

        let api_base = std::env::var("LLM_API_BASE")
            .unwrap_or_else(|_| provider.default_api_base().to_string());
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "tinyllama".to_string());

        let timeout_str = std::env::var("LLM_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let timeout_secs = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LLM_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let rephrase_str =
            std::env::var("REPHRASE_FOLLOWUPS").unwrap_or_else(|_| "false".to_string());
        let rephrase_followups = match rephrase_str.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "REPHRASE_FOLLOWUPS".to_string(),
                    format!("'{}' is not a boolean", rephrase_str),
                ));
            }
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let path_var = |name: &str, default: &str| {
            std::env::var(name)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(default))
        };
        let prompts_path = path_var("PROMPTS_PATH", "./prompts");
        let case_path = path_var("CASE_PATH", "./data/case_doc.json");
        let metrics_path = path_var("METRICS_PATH", "./data/metrics.json");
        let sessions_dir = path_var("SESSIONS_DIR", "./sessions");

        if provider == Provider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            api_base,
            openai_api_key,
            chat_model,
            llm_timeout: Duration::from_secs(timeout_secs),
            rephrase_followups,
            log_level,
            prompts_path,
            case_path,
            metrics_path,
            sessions_dir,
        })
    }

    /// Applies command-line path overrides.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(case) = &args.case {
            self.case_path = case.clone();
        }
        if let Some(metrics) = &args.metrics {
            self.metrics_path = metrics.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("LLM_PROVIDER");
            env::remove_var("LLM_API_BASE");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("CHAT_MODEL");
            env::remove_var("LLM_TIMEOUT_SECS");
            env::remove_var("REPHRASE_FOLLOWUPS");
            env::remove_var("RUST_LOG");
            env::remove_var("PROMPTS_PATH");
            env::remove_var("CASE_PATH");
            env::remove_var("METRICS_PATH");
            env::remove_var("SESSIONS_DIR");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    fn test_mode_choice_parsing() {
        assert_eq!(Mode::from_choice("1"), Some(Mode::Quick));
        assert_eq!(Mode::from_choice(" Full \n"), Some(Mode::Full));
        assert_eq!(Mode::from_choice("3"), None);
        assert_eq!(Mode::Quick.as_str(), "quick");
    }

    #[test]
    fn test_args_parse_mode_and_paths() {
        let args = Args::parse_from(["assess", "--mode", "full", "--case", "/tmp/case.json"]);
        assert_eq!(args.mode, Some(Mode::Full));
        assert_eq!(args.case, Some(PathBuf::from("/tmp/case.json")));
        assert_eq!(args.metrics, None);

        assert!(Args::try_parse_from(["assess", "--mode", "medium"]).is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.api_base, "http://localhost:11434/v1");
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.chat_model, "tinyllama");
        assert_eq!(config.llm_timeout, Duration::from_secs(30));
        assert!(!config.rephrase_followups);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.prompts_path, PathBuf::from("./prompts"));
        assert_eq!(config.case_path, PathBuf::from("./data/case_doc.json"));
        assert_eq!(config.metrics_path, PathBuf::from("./data/metrics.json"));
        assert_eq!(config.sessions_dir, PathBuf::from("./sessions"));
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "OpenAI");
            env::set_var("OPENAI_API_KEY", "test-openai-key");
            env::set_var("CHAT_MODEL", "gpt-4o-mini");
            env::set_var("LLM_TIMEOUT_SECS", "5");
            env::set_var("REPHRASE_FOLLOWUPS", "true");
            env::set_var("RUST_LOG", "debug");
            env::set_var("CASE_PATH", "/custom/case.json");
            env::set_var("SESSIONS_DIR", "/custom/sessions");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.openai_api_key, Some("test-openai-key".to_string()));
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.llm_timeout, Duration::from_secs(5));
        assert!(config.rephrase_followups);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.case_path, PathBuf::from("/custom/case.json"));
        assert_eq!(config.sessions_dir, PathBuf::from("/custom/sessions"));
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "openai");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(msg) => {
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_values() {
        for (var, value) in [
            ("LLM_PROVIDER", "gemini"),
            ("LLM_TIMEOUT_SECS", "0"),
            ("LLM_TIMEOUT_SECS", "soon"),
            ("REPHRASE_FOLLOWUPS", "maybe"),
            ("RUST_LOG", "not-a-level"),
        ] {
            clear_env_vars();
            unsafe {
                env::set_var(var, value);
            }
            match Config::from_env().unwrap_err() {
                ConfigError::InvalidValue(name, _) => assert_eq!(name, var),
                other => panic!("Expected InvalidValue for {var}, got {other:?}"),
            }
        }
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_args_override_paths() {
        clear_env_vars();
        let args = Args {
            mode: None,
            case: None,
            metrics: Some(PathBuf::from("/override/metrics.json")),
        };
        let config = Config::from_env().unwrap().with_args(&args);
        assert_eq!(config.case_path, PathBuf::from("./data/case_doc.json"));
        assert_eq!(config.metrics_path, PathBuf::from("/override/metrics.json"));
    }
}
