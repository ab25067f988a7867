//! Configuration structures for video-publisher
//!
//! This module provides type-safe configuration management with serde support.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublisherConfig {
    /// Schema version
    pub version: String,

    /// Browser-automation uploader settings
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Automation account (login, password, channel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountConfig>,

    /// OAuth client used for metadata and thumbnail updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleConfig>,

    /// Data API endpoints
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            automation: AutomationConfig::default(),
            account: None,
            google: None,
            api: ApiConfig::default(),
        }
    }
}

/// Browser-automation uploader settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutomationConfig {
    /// Script runtime (default: "node")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Path to the automation script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    /// Working directory for the script (default: "./")
    #[serde(skip_serializing_if = "Option::is_none", rename = "workingDirectory")]
    pub working_directory: Option<String>,

    /// Timeout in seconds (default: 900)
    #[serde(skip_serializing_if = "Option::is_none", rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,

    /// Description sent in place of the real one
    #[serde(skip_serializing_if = "Option::is_none", rename = "placeholderDescription")]
    pub placeholder_description: Option<String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            runtime: Some("node".to_string()),
            script: None,
            working_directory: None,
            timeout_secs: Some(900),
            placeholder_description: None,
        }
    }
}

/// Automation account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccountConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "channelId")]
    pub channel_id: Option<String>,
}

/// OAuth client credentials, or a pre-fetched access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GoogleConfig {
    #[serde(skip_serializing_if = "Option::is_none", rename = "clientId")]
    pub client_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "clientSecret")]
    pub client_secret: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "refreshToken")]
    pub refresh_token: Option<String>,

    /// Skips the token exchange when set
    #[serde(skip_serializing_if = "Option::is_none", rename = "accessToken")]
    pub access_token: Option<String>,
}

impl GoogleConfig {
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

/// Data API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(rename = "tokenUrl")]
    pub token_url: String,

    #[serde(rename = "baseUrl")]
    pub base_url: String,

    #[serde(rename = "uploadBaseUrl")]
    pub upload_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PublisherConfig::default();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.automation.runtime.as_deref(), Some("node"));
        assert_eq!(config.automation.timeout_secs, Some(900));
        assert!(config.account.is_none());
        assert_eq!(config.api.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r#"
version: "1.0"
automation:
  script: ./automation/post.js
  timeoutSecs: 600
account:
  login: me@example.com
  password: hunter2
  channelId: UC123
google:
  clientId: client
  clientSecret: secret
  refreshToken: refresh
"#;

        let config: PublisherConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.automation.script.as_deref(), Some("./automation/post.js"));
        assert_eq!(config.automation.timeout_secs, Some(600));
        assert_eq!(config.account.unwrap().channel_id.as_deref(), Some("UC123"));
        assert!(config.google.unwrap().has_client_credentials());
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_serialize_skips_missing_sections() {
        let yaml = serde_yaml::to_string(&PublisherConfig::default()).unwrap();

        assert!(yaml.contains("version"));
        assert!(!yaml.contains("account"));
        assert!(yaml.contains("tokenUrl"));
    }

    #[test]
    fn test_google_config_partial_credentials() {
        let google = GoogleConfig {
            client_id: Some("client".to_string()),
            ..Default::default()
        };
        assert!(!google.has_client_credentials());
    }
}
