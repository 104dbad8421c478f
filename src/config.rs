use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::time::Duration;

/// Default OpenAI API root
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default vision model
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Default cap on generated tokens
pub const DEFAULT_MAX_TOKENS: u32 = 300;
/// Default listening port
pub const DEFAULT_PORT: u16 = 3104;
/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default request body cap in megabytes
pub const DEFAULT_BODY_LIMIT_MB: usize = 100;
/// Default zone for computing today's date
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
/// Default location of the optional settings file
pub const DEFAULT_CONFIG_FILE: &str = "config/server.toml";

/// Main configuration structure for the service
#[derive(Clone)]
pub struct Config {
    /// OpenAI API key
    pub openai_api_key: String,
    /// OpenAI API root, without a trailing slash
    pub openai_base_url: String,
    /// Model identifier sent with every completion
    pub model: String,
    /// Generation length cap
    pub max_tokens: u32,
    /// Optional timeout for the model call, none by default
    pub request_timeout_secs: Option<u64>,
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request body cap in megabytes
    pub body_limit_mb: usize,
    /// Timezone for computing today's date
    pub timezone: Tz,
}

/// Non-secret settings that may come from the settings file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub openai_base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub body_limit_mb: Option<usize>,
    pub timezone: Option<String>,
}

impl FileSettings {
    /// Read the settings file, treating a missing file as empty
    pub fn read(path: &str) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)
                .map_err(|e| config_error(&format!("Invalid settings file {}: {}", path, e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl Config {
    /// Load configuration from environment and settings file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let file = FileSettings::read(&path)?;

        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Build configuration from a variable lookup, falling back to file settings
    pub fn from_sources<F>(lookup: F, file: FileSettings) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| env_error("OPENAI_API_KEY"))?;

        let openai_base_url = lookup("OPENAI_BASE_URL")
            .or(file.openai_base_url)
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = lookup("OPENAI_MODEL")
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = parse_var(&lookup, "OPENAI_MAX_TOKENS")?
            .or(file.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let request_timeout_secs =
            parse_var(&lookup, "OPENAI_TIMEOUT_SECS")?.or(file.request_timeout_secs);

        let host = lookup("HOST")
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = parse_var(&lookup, "PORT")?
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let body_limit_mb = parse_var(&lookup, "BODY_LIMIT_MB")?
            .or(file.body_limit_mb)
            .unwrap_or(DEFAULT_BODY_LIMIT_MB);

        let timezone_name = lookup("TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone_name)))?;

        Ok(Config {
            openai_api_key,
            openai_base_url,
            model,
            max_tokens,
            request_timeout_secs,
            host,
            port,
            body_limit_mb,
            timezone,
        })
    }

    /// Request body cap in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }

    /// Timeout for the model call, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// The API key never ends up in logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("body_limit_mb", &self.body_limit_mb)
            .field("timezone", &self.timezone)
            .finish()
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| config_error(&format!("Invalid {} value: {}", key, raw))),
        None => Ok(None),
    }
}
