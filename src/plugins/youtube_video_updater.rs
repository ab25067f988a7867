//! YouTube Data API metadata updater
//!
//! Restores the real title, description, tags, category and audience flag on
//! a video uploaded with sanitized metadata.

use crate::core::config::DEFAULT_API_BASE_URL;
use crate::core::error::ApiError;
use crate::core::traits::MetadataUpdater;
use crate::core::video::{AccessToken, VideoMetadata};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VideoResource<'a> {
    id: &'a str,
    snippet: Snippet<'a>,
    status: Status,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    category_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    self_declared_made_for_kids: bool,
}

/// `videos.update` client
pub struct YoutubeVideoUpdater {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YoutubeVideoUpdater {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_API_BASE_URL)
    }
}

impl YoutubeVideoUpdater {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MetadataUpdater for YoutubeVideoUpdater {
    async fn update(
        &self,
        token: &AccessToken,
        video_id: &str,
        metadata: &VideoMetadata,
        tags: &[String],
        made_for_kids: bool,
    ) -> Result<(), ApiError> {
        let url = format!("{}/youtube/v3/videos", self.base_url);
        let resource = VideoResource {
            id: video_id,
            snippet: Snippet {
                title: &metadata.title,
                description: &metadata.description,
                tags,
                category_id: metadata.category.id().to_string(),
            },
            status: Status {
                self_declared_made_for_kids: made_for_kids,
            },
        };

        tracing::debug!(video_id = %video_id, "updating video metadata");

        let response = self
            .client
            .put(&url)
            .query(&[("part", "snippet,status")])
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .json(&resource)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ApiError::BadVideoId {
                video_id: video_id.to_string(),
            },
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message: body },
            _ => ApiError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::Category;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metadata() -> VideoMetadata {
        VideoMetadata::new("My Épique Title!", "A long description", Category::Education)
    }

    fn tags() -> Vec<String> {
        vec!["tag1".to_string(), "tag2".to_string()]
    }

    #[tokio::test]
    async fn test_update_sends_original_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("part", "snippet,status"))
            .and(header("authorization", "Bearer accessToken"))
            .and(body_json(json!({
                "id": "yIucwdfnZIM",
                "snippet": {
                    "title": "My Épique Title!",
                    "description": "A long description",
                    "tags": ["tag1", "tag2"],
                    "categoryId": "27"
                },
                "status": { "selfDeclaredMadeForKids": true }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "yIucwdfnZIM" })))
            .expect(1)
            .mount(&server)
            .await;

        let updater = YoutubeVideoUpdater::new(reqwest::Client::new(), server.uri());
        updater
            .update(&AccessToken::new("accessToken"), "yIucwdfnZIM", &metadata(), &tags(), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_not_found_is_bad_video_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let updater = YoutubeVideoUpdater::new(reqwest::Client::new(), server.uri());
        let error = updater
            .update(&AccessToken::new("accessToken"), "missing", &metadata(), &tags(), false)
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::BadVideoId { ref video_id } if video_id == "missing"));
    }

    #[tokio::test]
    async fn test_unauthorized_and_other_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/youtube/v3/videos"))
            .and(header("authorization", "Bearer expired"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/youtube/v3/videos"))
            .and(header("authorization", "Bearer accessToken"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalidCategoryId"))
            .mount(&server)
            .await;

        let updater = YoutubeVideoUpdater::new(reqwest::Client::new(), format!("{}/", server.uri()));

        let error = updater
            .update(&AccessToken::new("expired"), "id", &metadata(), &tags(), false)
            .await
            .unwrap_err();
        assert_eq!(error.code(), "API_UNAUTHORIZED");

        let error = updater
            .update(&AccessToken::new("accessToken"), "id", &metadata(), &tags(), false)
            .await
            .unwrap_err();
        match error {
            ApiError::Http { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalidCategoryId");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
