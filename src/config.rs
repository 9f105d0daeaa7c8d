use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Full URL of the `/verify-signature` endpoint.
    pub verify_url: String,
    pub identity_environment_id: String,
    /// Directory backing the client key-value store. Falls back to the
    /// platform data directory when unset.
    #[serde(default)]
    pub history_dir: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Defaults, then the TOML file at `config_path` if it exists, then
    /// `MESSAGE_VERIFIER__SECTION__KEY` environment variables.
    pub fn load(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::new(config_path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix("MESSAGE_VERIFIER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn get_verify_url(&self) -> &str {
        &self.client.verify_url
    }

    /// Environment the identity provider implementation is constructed for.
    pub fn get_identity_environment_id(&self) -> &str {
        &self.client.identity_environment_id
    }

    pub fn get_request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.client.request_timeout_seconds)
    }

    pub fn get_history_dir(&self) -> PathBuf {
        match &self.client.history_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("message-verifier"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            client: ClientConfig {
                verify_url: "http://127.0.0.1:3000/verify-signature".to_string(),
                identity_environment_id: "change-me".to_string(),
                history_dir: None,
                request_timeout_seconds: 30,
            },
        }
    }
}
