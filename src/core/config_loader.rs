//! Configuration file loader for video-publisher
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::ConfigError;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".video-publisher.yaml";

/// Supported schema version
const SUPPORTED_VERSION: &str = "1.0";

lazy_static! {
    /// Environment variable pattern (${VAR_NAME})
    static ref ENV_VAR_REGEX: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Project path to look for `.video-publisher.yaml` in
    pub project_path: PathBuf,

    /// Explicit config file, overrides the project lookup
    pub config_path: Option<PathBuf>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    pub valid: bool,
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "account.login")
    pub field: String,
    pub message: String,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. Environment variables (`VIDEO_PUBLISHER_*`)
    /// 2. Config file (explicit path, or `./.video-publisher.yaml`)
    /// 3. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PublisherConfig, ConfigError> {
        let mut config = PublisherConfig::default();

        let file_path = options
            .config_path
            .clone()
            .unwrap_or_else(|| options.project_path.join(CONFIG_FILENAME));

        match Self::load_config_file(&file_path).await? {
            Some(file_config) => {
                tracing::debug!(path = %file_path.display(), "loaded config file");
                Self::merge_into(&mut config, file_config);
            }
            None if options.config_path.is_some() => {
                return Err(ConfigError::Read {
                    path: file_path,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
                });
            }
            None => {}
        }

        if let Some(env_config) = Self::load_env_config(&options.env) {
            Self::merge_into(&mut config, env_config);
        }

        Ok(Self::expand_env_vars(config, &options.env))
    }

    /// Load configuration from a YAML or TOML file
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub async fn load_config_file(file_path: &Path) -> Result<Option<PublisherConfig>, ConfigError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|source| ConfigError::Read {
            path: file_path.to_path_buf(),
            source,
        })?;

        Self::parse(file_path, &content).map(Some)
    }

    fn parse(file_path: &Path, content: &str) -> Result<PublisherConfig, ConfigError> {
        let is_toml = file_path.extension().and_then(|e| e.to_str()) == Some("toml");

        let parsed = if is_toml {
            toml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: file_path.to_path_buf(),
            message,
        })
    }

    /// Load configuration from environment variables
    fn load_env_config(env: &HashMap<String, String>) -> Option<PublisherConfig> {
        let get = |name: &str| env.get(name).cloned();

        let account = AccountConfig {
            login: get("VIDEO_PUBLISHER_LOGIN"),
            password: get("VIDEO_PUBLISHER_PASSWORD"),
            channel_id: get("VIDEO_PUBLISHER_CHANNEL_ID"),
        };
        let google = GoogleConfig {
            client_id: get("VIDEO_PUBLISHER_GOOGLE_CLIENT_ID"),
            client_secret: get("VIDEO_PUBLISHER_GOOGLE_CLIENT_SECRET"),
            refresh_token: get("VIDEO_PUBLISHER_GOOGLE_REFRESH_TOKEN"),
            access_token: get("VIDEO_PUBLISHER_GOOGLE_ACCESS_TOKEN"),
        };
        let script = get("VIDEO_PUBLISHER_SCRIPT");

        let has_changes = account != AccountConfig::default()
            || google != GoogleConfig::default()
            || script.is_some();

        if !has_changes {
            return None;
        }

        // Sections left empty here are skipped by merge_into
        Some(PublisherConfig {
            version: String::new(),
            automation: AutomationConfig {
                runtime: None,
                script,
                working_directory: None,
                timeout_secs: None,
                placeholder_description: None,
            },
            account: Some(account),
            google: Some(google),
            api: ApiConfig {
                token_url: String::new(),
                base_url: String::new(),
                upload_base_url: String::new(),
            },
        })
    }

    /// Merge source config into target, field by field
    fn merge_into(target: &mut PublisherConfig, source: PublisherConfig) {
        if !source.version.is_empty() {
            target.version = source.version;
        }

        let automation = source.automation;
        let target_automation = &mut target.automation;
        merge_option(&mut target_automation.runtime, automation.runtime);
        merge_option(&mut target_automation.script, automation.script);
        merge_option(&mut target_automation.working_directory, automation.working_directory);
        merge_option(&mut target_automation.timeout_secs, automation.timeout_secs);
        merge_option(
            &mut target_automation.placeholder_description,
            automation.placeholder_description,
        );

        if let Some(account) = source.account {
            let target_account = target.account.get_or_insert_with(AccountConfig::default);
            merge_option(&mut target_account.login, account.login);
            merge_option(&mut target_account.password, account.password);
            merge_option(&mut target_account.channel_id, account.channel_id);
        }

        if let Some(google) = source.google {
            let target_google = target.google.get_or_insert_with(GoogleConfig::default);
            merge_option(&mut target_google.client_id, google.client_id);
            merge_option(&mut target_google.client_secret, google.client_secret);
            merge_option(&mut target_google.refresh_token, google.refresh_token);
            merge_option(&mut target_google.access_token, google.access_token);
        }

        if !source.api.token_url.is_empty() {
            target.api.token_url = source.api.token_url;
        }
        if !source.api.base_url.is_empty() {
            target.api.base_url = source.api.base_url;
        }
        if !source.api.upload_base_url.is_empty() {
            target.api.upload_base_url = source.api.upload_base_url;
        }
    }

    /// Expand `${VAR}` references in credentials and paths
    fn expand_env_vars(mut config: PublisherConfig, env: &HashMap<String, String>) -> PublisherConfig {
        let expand = |value: &mut Option<String>| {
            if let Some(v) = value {
                *v = Self::expand_string(v, env);
            }
        };

        expand(&mut config.automation.script);
        expand(&mut config.automation.working_directory);

        if let Some(account) = &mut config.account {
            expand(&mut account.login);
            expand(&mut account.password);
            expand(&mut account.channel_id);
        }

        if let Some(google) = &mut config.google {
            expand(&mut google.client_id);
            expand(&mut google.client_secret);
            expand(&mut google.refresh_token);
            expand(&mut google.access_token);
        }

        config
    }

    /// Expand environment variables in a single string
    ///
    /// Unknown variables are left untouched.
    /// True when `value` still contains a `${VAR}` reference after expansion
    pub fn has_unresolved_reference(value: &str) -> bool {
        ENV_VAR_REGEX.is_match(value)
    }

    fn expand_string(input: &str, env: &HashMap<String, String>) -> String {
        ENV_VAR_REGEX
            .replace_all(input, |caps: &Captures| {
                let var_name = &caps[1];
                match env.get(var_name) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!(variable = var_name, "environment variable not found");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Validate configuration
    pub fn validate(config: &PublisherConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.version.is_empty() {
            errors.push(ConfigValidationError {
                field: "version".to_string(),
                message: "version is required".to_string(),
            });
        } else if config.version != SUPPORTED_VERSION {
            warnings.push(ConfigValidationWarning {
                field: "version".to_string(),
                message: format!("Unknown version: {}", config.version),
                suggestion: Some(format!("Currently supported version is \"{}\" only", SUPPORTED_VERSION)),
            });
        }

        if config.automation.script.as_deref().is_none_or(str::is_empty) {
            errors.push(ConfigValidationError {
                field: "automation.script".to_string(),
                message: "automation script is required".to_string(),
            });
        }

        if config.automation.timeout_secs == Some(0) {
            errors.push(ConfigValidationError {
                field: "automation.timeoutSecs".to_string(),
                message: "timeout must be greater than zero".to_string(),
            });
        }

        let account = config.account.clone().unwrap_or_default();
        for (field, value) in [
            ("account.login", &account.login),
            ("account.password", &account.password),
            ("account.channelId", &account.channel_id),
        ] {
            if value.as_deref().is_none_or(str::is_empty) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: format!("{} is required", field),
                });
            }
        }

        let google = config.google.clone().unwrap_or_default();
        if !google.has_client_credentials() && google.access_token.is_none() {
            warnings.push(ConfigValidationWarning {
                field: "google".to_string(),
                message: "No OAuth client credentials or access token configured".to_string(),
                suggestion: Some(
                    "Set google.clientId/clientSecret/refreshToken or pass --access-token".to_string(),
                ),
            });
        }

        let unexpanded = [
            &account.login,
            &account.password,
            &account.channel_id,
            &google.client_id,
            &google.client_secret,
            &google.refresh_token,
            &google.access_token,
        ];
        if unexpanded
            .iter()
            .any(|v| v.as_deref().is_some_and(Self::has_unresolved_reference))
        {
            warnings.push(ConfigValidationWarning {
                field: "account/google".to_string(),
                message: "Some credentials reference unset environment variables".to_string(),
                suggestion: None,
            });
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }
}

fn merge_option<T>(target: &mut Option<T>, source: Option<T>) {
    if source.is_some() {
        *target = source;
    }
}
