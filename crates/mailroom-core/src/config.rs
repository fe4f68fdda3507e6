use std::collections::HashMap;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{MailroomError, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
/// Hard cap on an inbound multipart body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

/// Top-level config (mailroom.toml + MAILROOM_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailroomConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub chats: ChatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Requests with a larger multipart body are rejected with 400.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub rate: RateConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            rate: RateConfig::default(),
        }
    }
}

/// Admission throttle shared by the message routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Milliseconds to mint one admission token.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    /// Tokens the bucket may hold while idle.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            burst: default_burst(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token value. Takes priority over `token_file`.
    pub token: Option<String>,
    /// Path to a file holding the bot token; contents are trimmed.
    pub token_file: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_file: None,
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatsConfig {
    /// Destination chat for the unlabelled message route.
    pub default_id: String,
    /// Optional JSON file of `{"chats": {label: id}}`.
    pub directory_path: Option<String>,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}
fn default_period_ms() -> u64 {
    2_000
}
fn default_burst() -> u32 {
    1
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl MailroomConfig {
    /// Load config from a TOML file with MAILROOM_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./mailroom.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or("mailroom.toml");

        let config: MailroomConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MAILROOM_").split("_"))
            .extract()
            .map_err(|e| MailroomError::Config(e.to_string()))?;

        Ok(config)
    }
}

impl TelegramConfig {
    /// Resolve the bot token: inline value first, else the token file.
    ///
    /// File contents are trimmed; an empty token is a startup error, not a
    /// value to pass downstream.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_deref() {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        let path = self.token_file.as_deref().ok_or_else(|| {
            MailroomError::Config("telegram.token or telegram.token_file must be set".to_string())
        })?;
        let raw = std::fs::read_to_string(path)?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(MailroomError::Config(format!("token file {path} is empty")));
        }
        Ok(token.to_string())
    }
}

impl ChatsConfig {
    /// Build the label → chat-id directory. A missing path is an empty
    /// directory, not an error.
    pub fn load_directory(&self) -> Result<HashMap<String, String>> {
        let Some(path) = self.directory_path.as_deref() else {
            return Ok(HashMap::new());
        };
        let data = std::fs::read_to_string(path)?;
        parse_directory(&data)
    }
}

/// Parse a `{"chats": {label: id}}` document. A missing `chats` key yields an
/// empty directory.
pub fn parse_directory(data: &str) -> Result<HashMap<String, String>> {
    #[derive(Deserialize)]
    struct DirectoryFile {
        #[serde(default)]
        chats: HashMap<String, String>,
    }

    let file: DirectoryFile = serde_json::from_str(data)?;
    Ok(file.chats)
}
