pub mod automation_uploader;
pub mod google_token_source;
pub mod youtube_thumbnail_uploader;
pub mod youtube_video_updater;

pub use automation_uploader::{AutomationUploader, ScriptReport, parse_script_output};
pub use google_token_source::GoogleTokenSource;
pub use youtube_thumbnail_uploader::{YoutubeThumbnailUploader, thumbnail_content_type};
pub use youtube_video_updater::YoutubeVideoUpdater;
