//! Configuration management infrastructure.
//!
//! Persists the client registration (identifier, key material locations,
//! suite and provider endpoints) as TOML, with JSON export.

use crate::domain::crypto::SignatureSuite;
use crate::infra::error::{EsiaError, EsiaResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Provider test environment authorization endpoint.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://esia-portal1.test.gosuslugi.ru/aas/oauth2/ac";

/// Provider test environment token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://esia-portal1.test.gosuslugi.ru/aas/oauth2/te";

/// Client registration and provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsiaConfiguration {
    /// Client system identifier issued by the provider
    pub client_id: String,

    /// PEM file with the client certificate, optionally followed by its chain
    pub certificate_path: PathBuf,

    /// PEM file with the PKCS#8 private key
    pub private_key_path: PathBuf,

    /// PEM file with the provider's public key for token verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_public_key_path: Option<PathBuf>,

    /// Signature suite, written as "rsa" or "gost"
    pub suite: SignatureSuite,

    /// Requested scopes, space separated
    pub scope: String,

    pub authorization_url: String,
    pub token_url: String,

    /// Redirect URI registered for the client
    pub callback_url: String,

    /// "online" or "offline"
    pub access_type: String,
}

impl Default for EsiaConfiguration {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            certificate_path: PathBuf::new(),
            private_key_path: PathBuf::new(),
            provider_public_key_path: None,
            suite: SignatureSuite::RsaSha256,
            scope: "fullname email".to_string(),
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            callback_url: String::new(),
            access_type: "online".to_string(),
        }
    }
}

impl EsiaConfiguration {
    /// Check the values needed to actually sign on behalf of the client.
    ///
    /// A freshly created default file passes [`ConfigManager::load`] but not
    /// this check until the registration fields are filled in.
    pub fn require_client_registration(&self) -> EsiaResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "client_id is not set".to_string(),
            ));
        }
        if self.certificate_path.as_os_str().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "certificate_path is not set".to_string(),
            ));
        }
        if self.private_key_path.as_os_str().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "private_key_path is not set".to_string(),
            ));
        }
        if self.callback_url.trim().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "callback_url is not set".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> EsiaResult<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| EsiaError::ConfigurationError(format!("Invalid {field} '{value}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(EsiaError::ConfigurationError(format!(
            "{field} must use http or https, not {scheme}"
        ))),
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> EsiaResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> EsiaResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("esia-auth").join("config.toml"))
        } else {
            Ok(PathBuf::from("esia-auth-config.toml"))
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default(&self) -> EsiaResult<EsiaConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::info!(
                "Configuration file not found, creating default: {}",
                self.config_path.display()
            );
            let default_config = EsiaConfiguration::default();
            self.save(&default_config)?;
            Ok(default_config)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> EsiaResult<EsiaConfiguration> {
        log::info!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            EsiaError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: EsiaConfiguration = toml::from_str(&content).map_err(|e| {
            EsiaError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        self.validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &EsiaConfiguration) -> EsiaResult<()> {
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EsiaError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            EsiaError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            EsiaError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        log::info!("Configuration saved successfully");
        Ok(())
    }

    /// Validate configuration values
    pub fn validate_config(&self, config: &EsiaConfiguration) -> EsiaResult<()> {
        validate_url("authorization_url", &config.authorization_url)?;
        validate_url("token_url", &config.token_url)?;
        if !config.callback_url.is_empty() {
            validate_url("callback_url", &config.callback_url)?;
        }

        if config.scope.trim().is_empty() {
            return Err(EsiaError::ConfigurationError(
                "scope must not be empty".to_string(),
            ));
        }

        match config.access_type.as_str() {
            "online" | "offline" => Ok(()),
            other => Err(EsiaError::ConfigurationError(format!(
                "access_type must be 'online' or 'offline', not '{other}'"
            ))),
        }
    }

    /// Update a specific configuration value
    pub fn update_value(&self, key: &str, value: &str) -> EsiaResult<()> {
        let mut config = self.load_or_create_default()?;

        match key {
            "client_id" => config.client_id = value.to_string(),
            "certificate_path" => config.certificate_path = PathBuf::from(value),
            "private_key_path" => config.private_key_path = PathBuf::from(value),
            "provider_public_key_path" => {
                config.provider_public_key_path =
                    (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "suite" => config.suite = value.parse()?,
            "scope" => config.scope = value.to_string(),
            "authorization_url" => config.authorization_url = value.to_string(),
            "token_url" => config.token_url = value.to_string(),
            "callback_url" => config.callback_url = value.to_string(),
            "access_type" => config.access_type = value.to_string(),
            _ => {
                return Err(EsiaError::ConfigurationError(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }

        self.validate_config(&config)?;
        self.save(&config)
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Export configuration as a portable format
    pub fn export_config(&self, format: ExportFormat) -> EsiaResult<String> {
        let config = self.load()?;

        match format {
            ExportFormat::Toml => toml::to_string_pretty(&config)
                .map_err(|e| EsiaError::ConfigurationError(format!("TOML export failed: {e}"))),
            ExportFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| EsiaError::ConfigurationError(format!("JSON export failed: {e}"))),
        }
    }

    /// Import configuration from a string
    pub fn import_config(&self, content: &str, format: ExportFormat) -> EsiaResult<()> {
        let config: EsiaConfiguration = match format {
            ExportFormat::Toml => toml::from_str(content).map_err(|e| {
                EsiaError::ConfigurationError(format!("TOML import failed: {e}"))
            })?,
            ExportFormat::Json => serde_json::from_str(content).map_err(|e| {
                EsiaError::ConfigurationError(format!("JSON import failed: {e}"))
            })?,
        };

        self.validate_config(&config)?;
        self.save(&config)
    }
}

/// Configuration export/import formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Toml,
    Json,
}
