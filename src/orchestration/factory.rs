//! Builds a production [`VideoPublisher`] from configuration

use super::video_publisher::VideoPublisher;
use crate::core::config::PublisherConfig;
use crate::core::config_loader::ConfigLoader;
use crate::core::traits::Logger;
use crate::core::video::{AccessToken, ClientCredentials, UploadCredentials};
use crate::plugins::{AutomationUploader, GoogleTokenSource, YoutubeThumbnailUploader, YoutubeVideoUpdater};
use crate::security::ScriptExecutor;
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_RUNTIME: &str = "node";
const DEFAULT_TIMEOUT_SECS: u64 = 900;
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Wires the concrete collaborators described by a [`PublisherConfig`]
pub struct VideoPublisherFactory {
    config: PublisherConfig,
    project_path: PathBuf,
}

impl VideoPublisherFactory {
    /// `project_path` anchors relative script and working directory paths
    pub fn new(config: PublisherConfig, project_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_path: project_path.into(),
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn make(&self, logger: Arc<dyn Logger>) -> Result<VideoPublisher> {
        let automation = &self.config.automation;

        let script = automation
            .script
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("automation.script is not configured"))?;

        let working_dir = match automation.working_directory.as_deref() {
            Some(dir) => self.project_path.join(dir),
            None => self.project_path.clone(),
        };

        let mut executor = ScriptExecutor::new(&working_dir)
            .with_context(|| format!("invalid automation working directory {}", working_dir.display()))?;
        executor.set_timeout(Duration::from_secs(
            automation.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ));

        let runtime = automation.runtime.as_deref().unwrap_or(DEFAULT_RUNTIME);
        if !ScriptExecutor::is_allowed(runtime) {
            return Err(anyhow!("automation runtime '{}' is not allowed", runtime));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let api = &self.config.api;

        let publisher = VideoPublisher::new(
            logger,
            Arc::new(AutomationUploader::new(
                executor,
                runtime,
                self.project_path.join(script),
            )),
            Arc::new(GoogleTokenSource::new(http.clone(), api.token_url.clone())),
            Arc::new(YoutubeVideoUpdater::new(http.clone(), api.base_url.clone())),
            Arc::new(YoutubeThumbnailUploader::new(http, api.upload_base_url.clone())),
        );

        Ok(match automation.placeholder_description.as_deref() {
            Some(placeholder) => publisher.with_placeholder_description(placeholder),
            None => publisher,
        })
    }

    /// Automation account from the `account` section
    pub fn upload_credentials(&self) -> Result<UploadCredentials> {
        let account = self
            .config
            .account
            .as_ref()
            .ok_or_else(|| anyhow!("account section is not configured"))?;

        let field = |value: &Option<String>, name: &str| {
            resolved(value, name)?.ok_or_else(|| anyhow!("{} is not configured", name))
        };

        Ok(UploadCredentials::new(
            field(&account.login, "account.login")?,
            field(&account.password, "account.password")?,
            field(&account.channel_id, "account.channelId")?,
        ))
    }

    /// OAuth client credentials, when all three values are configured
    pub fn client_credentials(&self) -> Result<Option<ClientCredentials>> {
        let Some(google) = self.config.google.as_ref() else {
            return Ok(None);
        };

        let client_id = resolved(&google.client_id, "google.clientId")?;
        let client_secret = resolved(&google.client_secret, "google.clientSecret")?;
        let refresh_token = resolved(&google.refresh_token, "google.refreshToken")?;

        Ok(match (client_id, client_secret, refresh_token) {
            (Some(id), Some(secret), Some(refresh)) => Some(ClientCredentials::new(id, secret, refresh)),
            _ => None,
        })
    }

    /// Pre-fetched access token from the `google` section
    pub fn access_token(&self) -> Result<Option<AccessToken>> {
        let Some(google) = self.config.google.as_ref() else {
            return Ok(None);
        };

        Ok(resolved(&google.access_token, "google.accessToken")?.map(AccessToken::new))
    }
}

/// A configured, non-empty value whose `${VAR}` references were all expanded
fn resolved(value: &Option<String>, name: &str) -> Result<Option<String>> {
    match value.as_deref().filter(|v| !v.is_empty()) {
        Some(v) if ConfigLoader::has_unresolved_reference(v) => Err(anyhow!(
            "{} references an unset environment variable: {}",
            name,
            v
        )),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AccountConfig, GoogleConfig};
    use crate::core::traits::{LogContext, LogLevel};

    struct NullLogger;

    impl Logger for NullLogger {
        fn log(&self, _level: LogLevel, _message: &str, _context: &LogContext) {}
    }

    fn config() -> PublisherConfig {
        let mut config = PublisherConfig::default();
        config.automation.script = Some("post.js".to_string());
        config.account = Some(AccountConfig {
            login: Some("me@example.com".to_string()),
            password: Some("hunter2".to_string()),
            channel_id: Some("UC123".to_string()),
        });
        config.google = Some(GoogleConfig {
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: None,
        });
        config
    }

    #[test]
    fn test_make_with_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let factory = VideoPublisherFactory::new(config(), dir.path());

        assert!(factory.make(Arc::new(NullLogger)).is_ok());
    }

    #[test]
    fn test_make_requires_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.automation.script = None;

        let error = VideoPublisherFactory::new(config, dir.path())
            .make(Arc::new(NullLogger))
            .err()
            .unwrap();
        assert!(error.to_string().contains("automation.script"));
    }

    #[test]
    fn test_make_rejects_disallowed_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.automation.runtime = Some("python".to_string());

        assert!(VideoPublisherFactory::new(config, dir.path()).make(Arc::new(NullLogger)).is_err());
    }

    #[test]
    fn test_make_rejects_missing_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.automation.working_directory = Some("does-not-exist".to_string());

        assert!(VideoPublisherFactory::new(config, dir.path()).make(Arc::new(NullLogger)).is_err());
    }

    #[test]
    fn test_credentials_from_config() {
        let factory = VideoPublisherFactory::new(config(), ".");

        let credentials = factory.upload_credentials().unwrap();
        assert_eq!(credentials.login, "me@example.com");
        assert_eq!(credentials.channel_id, "UC123");

        assert_eq!(factory.client_credentials().unwrap().unwrap().client_id, "client");
        assert!(factory.access_token().unwrap().is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = config();
        config.account.as_mut().unwrap().password = None;
        config.google.as_mut().unwrap().refresh_token = None;
        config.google.as_mut().unwrap().access_token = Some("ya29.token".to_string());

        let factory = VideoPublisherFactory::new(config, ".");

        let error = factory.upload_credentials().unwrap_err();
        assert!(error.to_string().contains("account.password"));
        assert!(factory.client_credentials().unwrap().is_none());
        assert_eq!(factory.access_token().unwrap().unwrap().expose(), "ya29.token");
    }

    #[test]
    fn test_unexpanded_placeholders_are_rejected() {
        let mut config = config();
        config.account.as_mut().unwrap().password = Some("${VIDEO_PUBLISHER_PASSWORD}".to_string());
        config.google.as_mut().unwrap().client_id = Some("${GOOGLE_CLIENT_ID}".to_string());
        config.google.as_mut().unwrap().access_token = Some("${GOOGLE_ACCESS_TOKEN}".to_string());

        let factory = VideoPublisherFactory::new(config, ".");

        let error = factory.upload_credentials().unwrap_err();
        assert!(error.to_string().contains("account.password"));
        assert!(!error.to_string().contains("hunter2"));

        let error = factory.client_credentials().unwrap_err();
        assert!(error.to_string().contains("google.clientId"));

        assert!(factory.access_token().is_err());
    }

    #[tokio::test]
    async fn test_access_token_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = std::collections::HashMap::new();
        env.insert("VIDEO_PUBLISHER_GOOGLE_ACCESS_TOKEN".to_string(), "ya29.env".to_string());

        let config = ConfigLoader::load(crate::core::config_loader::ConfigLoadOptions {
            project_path: dir.path().to_path_buf(),
            config_path: None,
            env,
        })
        .await
        .unwrap();

        let factory = VideoPublisherFactory::new(config, dir.path());
        assert_eq!(factory.access_token().unwrap().unwrap().expose(), "ya29.env");
    }

    #[tokio::test]
    async fn test_init_template_without_env_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::core::config_loader::CONFIG_FILENAME),
            r#"
version: "1.0"
automation:
  script: ./post.js
account:
  login: ${VIDEO_PUBLISHER_LOGIN}
  password: ${VIDEO_PUBLISHER_PASSWORD}
  channelId: UC123
google:
  clientId: ${GOOGLE_CLIENT_ID}
  clientSecret: ${GOOGLE_CLIENT_SECRET}
  refreshToken: ${GOOGLE_REFRESH_TOKEN}
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(crate::core::config_loader::ConfigLoadOptions {
            project_path: dir.path().to_path_buf(),
            ..Default::default()
        })
        .await
        .unwrap();
        let factory = VideoPublisherFactory::new(config, dir.path());

        assert!(factory.upload_credentials().is_err());
        assert!(factory.client_credentials().is_err());
    }
}
