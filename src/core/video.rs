//! Publish request value objects
//!
//! A [`PublishRequest`] carries the authoritative metadata supplied by the
//! caller. The upload stage never sees it directly: it receives an
//! [`UploadPayload`] derived from the request with a slugified title and a
//! placeholder description.

use deunicode::deunicode_char;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Description sent to the automation uploader in place of the real one
pub const DEFAULT_PLACEHOLDER_DESCRIPTION: &str = "Une epique description";

// ============================================================================
// Category
// ============================================================================

/// YouTube video category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FilmAndAnimation,
    AutosAndVehicles,
    Music,
    PetsAndAnimals,
    Sports,
    TravelAndEvents,
    Gaming,
    PeopleAndBlogs,
    Comedy,
    Entertainment,
    NewsAndPolitics,
    HowtoAndStyle,
    Education,
    ScienceAndTechnology,
    NonprofitsAndActivism,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::FilmAndAnimation,
        Category::AutosAndVehicles,
        Category::Music,
        Category::PetsAndAnimals,
        Category::Sports,
        Category::TravelAndEvents,
        Category::Gaming,
        Category::PeopleAndBlogs,
        Category::Comedy,
        Category::Entertainment,
        Category::NewsAndPolitics,
        Category::HowtoAndStyle,
        Category::Education,
        Category::ScienceAndTechnology,
        Category::NonprofitsAndActivism,
    ];

    /// Numeric category id used by the Data API (`snippet.categoryId`)
    pub fn id(&self) -> u32 {
        match self {
            Self::FilmAndAnimation => 1,
            Self::AutosAndVehicles => 2,
            Self::Music => 10,
            Self::PetsAndAnimals => 15,
            Self::Sports => 17,
            Self::TravelAndEvents => 19,
            Self::Gaming => 20,
            Self::PeopleAndBlogs => 22,
            Self::Comedy => 23,
            Self::Entertainment => 24,
            Self::NewsAndPolitics => 25,
            Self::HowtoAndStyle => 26,
            Self::Education => 27,
            Self::ScienceAndTechnology => 28,
            Self::NonprofitsAndActivism => 29,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.id() == id)
    }

    /// Kebab-case name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilmAndAnimation => "film-and-animation",
            Self::AutosAndVehicles => "autos-and-vehicles",
            Self::Music => "music",
            Self::PetsAndAnimals => "pets-and-animals",
            Self::Sports => "sports",
            Self::TravelAndEvents => "travel-and-events",
            Self::Gaming => "gaming",
            Self::PeopleAndBlogs => "people-and-blogs",
            Self::Comedy => "comedy",
            Self::Entertainment => "entertainment",
            Self::NewsAndPolitics => "news-and-politics",
            Self::HowtoAndStyle => "howto-and-style",
            Self::Education => "education",
            Self::ScienceAndTechnology => "science-and-technology",
            Self::NonprofitsAndActivism => "nonprofits-and-activism",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts either the kebab-case name or the numeric id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");

        if let Ok(id) = normalized.parse::<u32>() {
            return Self::from_id(id).ok_or_else(|| format!("unknown category id: {}", id));
        }

        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

// ============================================================================
// Request
// ============================================================================

/// Identifying metadata of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
        }
    }
}

/// What to publish and with which metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub metadata: VideoMetadata,

    /// Applied by the metadata stage only
    pub tags: Vec<String>,

    pub made_for_kids: bool,

    pub video_file_path: PathBuf,

    /// `None` skips the thumbnail stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_file_path: Option<PathBuf>,
}

impl PublishRequest {
    pub fn new(metadata: VideoMetadata, video_file_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            tags: Vec::new(),
            made_for_kids: false,
            video_file_path: video_file_path.into(),
            thumbnail_file_path: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_made_for_kids(mut self, made_for_kids: bool) -> Self {
        self.made_for_kids = made_for_kids;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_file_path: impl Into<PathBuf>) -> Self {
        self.thumbnail_file_path = Some(thumbnail_file_path.into());
        self
    }

    pub fn thumbnail_file_path(&self) -> Option<&Path> {
        self.thumbnail_file_path.as_deref()
    }
}

/// Metadata handed to the automation uploader
///
/// Built from a [`VideoMetadata`], never from user input directly. The
/// automation layer breaks on long free-form text and special characters, so
/// the real values are restored afterwards through the Data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPayload {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl UploadPayload {
    pub fn sanitized(metadata: &VideoMetadata, placeholder_description: &str) -> Self {
        Self {
            title: slugify(&metadata.title, ' '),
            description: placeholder_description.to_string(),
            category: metadata.category,
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Account used by the automation uploader
#[derive(Debug, Clone)]
pub struct UploadCredentials {
    pub login: String,
    pub password: SecretString,
    pub channel_id: String,
}

impl UploadCredentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: SecretString::new(password.into().into()),
            channel_id: channel_id.into(),
        }
    }
}

/// OAuth client credentials exchanged for an [`AccessToken`]
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
            refresh_token: SecretString::new(refresh_token.into().into()),
        }
    }
}

/// Opaque bearer token for the Data API
#[derive(Debug, Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into().into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

/// Platform-assigned id on (partial) success, `None` when nothing was published
pub type PublishOutcome = Option<String>;

// ============================================================================
// Slug
// ============================================================================

/// Reduce `input` to lowercase ASCII words joined by `separator`
///
/// Letters from any script are transliterated to ASCII, `@` becomes `at`,
/// the opposite dash (`-` or `_`) counts as a separator and any other
/// punctuation is dropped.
pub fn slugify(input: &str, separator: char) -> String {
    let flip = if separator == '-' { '_' } else { '-' };
    let mut folded = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '@' => {
                folded.push(separator);
                folded.push_str("at");
                folded.push(separator);
            }
            c if c == flip => folded.push(separator),
            c if c.is_ascii() => folded.push(c.to_ascii_lowercase()),
            c => {
                if let Some(ascii) = deunicode_char(c) {
                    folded.extend(ascii.chars().map(|a| a.to_ascii_lowercase()));
                }
            }
        }
    }

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c == separator || c.is_ascii_whitespace() {
            pending_separator = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(separator);
            }
            pending_separator = false;
            slug.push(c);
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_plain_title() {
        assert_eq!(slugify("title", ' '), "title");
    }

    #[test]
    fn test_slugify_strips_punctuation_and_lowercases() {
        assert_eq!(slugify("Hello, World! How's it going?", ' '), "hello world hows it going");
    }

    #[test]
    fn test_slugify_folds_diacritics() {
        assert_eq!(slugify("L'été à Montréal", ' '), "lete a montreal");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  a -- b\t\tc  ", ' '), "a b c");
        assert_eq!(slugify("Rust_is-great", '-'), "rust-is-great");
    }

    #[test]
    fn test_slugify_at_sign() {
        assert_eq!(slugify("me@home", ' '), "me at home");
    }

    #[test]
    fn test_slugify_transliterates_cyrillic() {
        assert_eq!(slugify("Привет мир", ' '), "privet mir");
    }

    #[test]
    fn test_slugify_transliterates_latin_extended() {
        assert_eq!(slugify("Ğüzel Şehir", ' '), "guzel sehir");
        assert_eq!(slugify("Straße", ' '), "strasse");
    }

    #[test]
    fn test_slugify_keeps_letters_from_other_scripts() {
        for title in ["日本語のビデオ", "Ελληνικά", "日本 video 2024"] {
            let slug = slugify(title, ' ');
            assert!(!slug.is_empty(), "{}", title);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '),
                "{} -> {}",
                title,
                slug
            );
        }
        assert!(slugify("日本 video 2024", ' ').ends_with("video 2024"));
    }

    #[test]
    fn test_slugify_punctuation_only_is_empty() {
        assert_eq!(slugify("!!!", ' '), "");
    }

    #[test]
    fn test_upload_payload_title_survives_non_latin_scripts() {
        let metadata = VideoMetadata::new("Привет мир", "description", Category::Education);
        let payload = UploadPayload::sanitized(&metadata, DEFAULT_PLACEHOLDER_DESCRIPTION);

        assert_eq!(payload.title, "privet mir");
    }

    #[test]
    fn test_upload_payload_is_sanitized() {
        let metadata = VideoMetadata::new("title", "description", Category::Education);
        let payload = UploadPayload::sanitized(&metadata, DEFAULT_PLACEHOLDER_DESCRIPTION);

        assert_eq!(payload.title, "title");
        assert_eq!(payload.description, "Une epique description");
        assert_eq!(payload.category, Category::Education);
        assert_eq!(metadata.description, "description");
    }

    #[test]
    fn test_category_ids() {
        assert_eq!(Category::Education.id(), 27);
        assert_eq!(Category::PeopleAndBlogs.id(), 22);
        assert_eq!(Category::from_id(28), Some(Category::ScienceAndTechnology));
        assert_eq!(Category::from_id(3), None);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("education".parse::<Category>(), Ok(Category::Education));
        assert_eq!("Howto_And_Style".parse::<Category>(), Ok(Category::HowtoAndStyle));
        assert_eq!("27".parse::<Category>(), Ok(Category::Education));
        assert!("cooking".parse::<Category>().is_err());
        assert!("99".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::NewsAndPolitics).unwrap();
        assert_eq!(json, r#""news-and-politics""#);

        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_request_builder() {
        let request = PublishRequest::new(
            VideoMetadata::new("title", "description", Category::Education),
            "video.mp4",
        )
        .with_tags(["tag1", "tag2", "tag3"])
        .with_thumbnail("thumbnail.png");

        assert_eq!(request.tags, vec!["tag1", "tag2", "tag3"]);
        assert!(!request.made_for_kids);
        assert_eq!(request.thumbnail_file_path(), Some(Path::new("thumbnail.png")));
    }

    #[test]
    fn test_empty_thumbnail_path_is_still_present() {
        let request = PublishRequest::new(
            VideoMetadata::new("title", "description", Category::Education),
            "video.mp4",
        )
        .with_thumbnail("");

        assert!(request.thumbnail_file_path().is_some());
    }

    #[test]
    fn test_access_token_bearer() {
        let token = AccessToken::new("abc");
        assert_eq!(token.expose(), "abc");
        assert_eq!(token.bearer(), "Bearer abc");
        assert!(!format!("{:?}", token).contains("abc"));
    }
}
