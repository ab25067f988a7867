//! Google OAuth2 token source (refresh-token grant)

use crate::core::config::DEFAULT_TOKEN_URL;
use crate::core::error::TokenError;
use crate::core::traits::TokenSource;
use crate::core::video::{AccessToken, ClientCredentials};
use crate::security::SecretMasker;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// Error codes meaning the credentials themselves were rejected
const AUTH_ERRORS: &[&str] = &["invalid_grant", "invalid_client", "unauthorized_client"];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges a refresh token for an access token
pub struct GoogleTokenSource {
    client: reqwest::Client,
    token_url: String,
}

impl Default for GoogleTokenSource {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_TOKEN_URL)
    }
}

impl GoogleTokenSource {
    pub fn new(client: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    async fn exchange(&self, client: &ClientCredentials) -> Result<AccessToken, TokenError> {
        tracing::debug!(token_url = %self.token_url, client_id = %client.client_id, "exchanging refresh token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.expose_secret()),
                ("refresh_token", client.refresh_token.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let rejection = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .filter(|r| AUTH_ERRORS.contains(&r.error.as_str()));

            if let Some(rejection) = rejection {
                return Err(TokenError::Auth {
                    error: rejection.error,
                    description: rejection.error_description.unwrap_or_default(),
                });
            }

            let masker = SecretMasker::new([
                client.client_secret.expose_secret(),
                client.refresh_token.expose_secret(),
            ]);
            return Err(TokenError::Http {
                status: status.as_u16(),
                body: masker.mask(&body),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| TokenError::MalformedResponse(e.to_string()))?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!(expires_in = ?parsed.expires_in, "access token obtained");
                Ok(AccessToken::new(token))
            }
            _ => Err(TokenError::MalformedResponse(
                "response has no access_token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ClientCredentials {
        ClientCredentials::new("clientId", "clientSecret-0123456789", "refreshToken-0123456789")
    }

    async fn source(server: &MockServer) -> GoogleTokenSource {
        GoogleTokenSource::new(reqwest::Client::new(), format!("{}/token", server.uri()))
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=clientId"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = source(&server).await.exchange(&client()).await.unwrap();

        assert_eq!(token.expose(), "ya29.token");
    }

    #[tokio::test]
    async fn test_invalid_grant_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&server)
            .await;

        let error = source(&server).await.exchange(&client()).await.unwrap_err();

        match error {
            TokenError::Auth { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "Token has been expired or revoked.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_http_error_with_masked_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend echoed refreshToken-0123456789"))
            .mount(&server)
            .await;

        let error = source(&server).await.exchange(&client()).await.unwrap_err();

        assert_eq!(error.code(), "TOKEN_HTTP");
        assert!(!error.to_string().contains("refreshToken-0123456789"));
    }

    #[tokio::test]
    async fn test_missing_access_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "expires_in": 3599 })))
            .mount(&server)
            .await;

        let error = source(&server).await.exchange(&client()).await.unwrap_err();

        assert_eq!(error.code(), "TOKEN_MALFORMED_RESPONSE");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let source = GoogleTokenSource::new(reqwest::Client::new(), "http://127.0.0.1:1/token");

        let error = source.exchange(&client()).await.unwrap_err();

        assert_eq!(error.code(), "TOKEN_TRANSPORT");
    }
}
