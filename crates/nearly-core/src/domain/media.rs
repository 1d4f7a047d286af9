//! Uploaded media and the streaming descriptor built from it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, required_text};
use crate::error::DomainError;

/// Coarse media classification used by feeds and the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    /// Classify by MIME prefix, falling back to the file extension when the
    /// MIME type is missing or generic.
    pub fn classify(content_type: Option<&str>, file_name: &str) -> Self {
        let mime = content_type
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty() && c != "application/octet-stream");

        match mime {
            Some(mime) => Self::from_mime(&mime),
            None => Self::from_extension(file_name),
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaType::Image
        } else if mime.starts_with("video/") || mime == "application/vnd.apple.mpegurl" {
            MediaType::Video
        } else if mime.starts_with("audio/") {
            MediaType::Audio
        } else {
            MediaType::Document
        }
    }

    fn from_extension(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" | "avif" => MediaType::Image,
            "mp4" | "mov" | "webm" | "m4v" | "mkv" | "m3u8" => MediaType::Video,
            "mp3" | "wav" | "m4a" | "aac" | "ogg" | "flac" => MediaType::Audio,
            _ => MediaType::Document,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Document => "document",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            "document" => Ok(MediaType::Document),
            other => Err(DomainError::validation(format!(
                "unknown media type '{other}'"
            ))),
        }
    }
}

/// Upstream transcode pipeline status of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranscodeStatus {
    Uploaded,
    Transcoding,
    Ready,
    Failed,
}

impl TranscodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscodeStatus::Uploaded => "UPLOADED",
            TranscodeStatus::Transcoding => "TRANSCODING",
            TranscodeStatus::Ready => "READY",
            TranscodeStatus::Failed => "FAILED",
        }
    }

    /// Still waiting on the transcoder.
    pub fn is_processing(&self) -> bool {
        matches!(self, TranscodeStatus::Uploaded | TranscodeStatus::Transcoding)
    }

    pub fn can_transition_to(&self, next: TranscodeStatus) -> bool {
        use TranscodeStatus::*;
        matches!(
            (*self, next),
            (Uploaded, Transcoding)
                | (Transcoding, Ready)
                | (Transcoding, Failed)
                | (Failed, Transcoding)
        )
    }
}

impl fmt::Display for TranscodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranscodeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UPLOADED" => Ok(TranscodeStatus::Uploaded),
            "TRANSCODING" => Ok(TranscodeStatus::Transcoding),
            "READY" => Ok(TranscodeStatus::Ready),
            "FAILED" => Ok(TranscodeStatus::Failed),
            other => Err(DomainError::validation(format!(
                "unknown transcode status '{other}'"
            ))),
        }
    }
}

/// One progressive MP4 rendition, labelled by quality (`1080p`, `720p`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub quality: String,
    pub url: String,
}

impl Rendition {
    pub fn new(quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            url: url.into(),
        }
    }
}

/// Everything a reel player needs to pick a source.
///
/// Renditions keep the order the transcoder listed them in; "first available"
/// in source selection means first in this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub hls_url: Option<String>,
    #[serde(default)]
    pub mp4_urls: Vec<Rendition>,
    pub mp4_fallback_url: Option<String>,
    pub video_url: Option<String>,
    pub poster_url: Option<String>,
    pub transcode_status: TranscodeStatus,
}

impl VideoDescriptor {
    /// A descriptor for a plain progressive video with no transcoder output.
    pub fn progressive(video_url: impl Into<String>) -> Self {
        Self {
            hls_url: None,
            mp4_urls: Vec::new(),
            mp4_fallback_url: None,
            video_url: Some(video_url.into()),
            poster_url: None,
            transcode_status: TranscodeStatus::Ready,
        }
    }

    pub fn rendition(&self, quality: &str) -> Option<&str> {
        self.mp4_urls
            .iter()
            .find(|r| r.quality == quality)
            .map(|r| r.url.as_str())
    }
}

/// How a client should upload a file of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    /// Small files go straight to the media service in one request.
    Direct,
    /// Large files are uploaded to a presigned URL and registered afterwards.
    Presigned,
}

impl UploadStrategy {
    pub const DEFAULT_DIRECT_LIMIT: u64 = 10 * 1024 * 1024;

    pub fn for_size(size_bytes: u64, direct_limit: u64) -> Self {
        if size_bytes <= direct_limit {
            UploadStrategy::Direct
        } else {
            UploadStrategy::Presigned
        }
    }
}

/// Callback payload from the transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeUpdate {
    pub status: TranscodeStatus,
    pub hls_url: Option<String>,
    #[serde(default)]
    pub mp4_urls: Vec<Rendition>,
    pub thumbnail_url: Option<String>,
}

/// Media entity - an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub media_type: MediaType,
    pub size_bytes: i64,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub hls_url: Option<String>,
    pub mp4_urls: Vec<Rendition>,
    pub transcode_status: TranscodeStatus,
    pub created_at: DateTime<Utc>,
}

impl Media {
    /// Register an uploaded file. Videos wait for the transcoder; everything
    /// else is ready immediately.
    pub fn new(
        owner_id: Uuid,
        file_name: &str,
        content_type: Option<&str>,
        size_bytes: i64,
        url: &str,
        thumbnail_url: Option<String>,
    ) -> Result<Self, DomainError> {
        if size_bytes < 0 {
            return Err(DomainError::validation("size must not be negative"));
        }
        let file_name = required_text("file_name", file_name, 255)?;
        let url = required_text("url", url, 2048)?;
        let media_type = MediaType::classify(content_type, &file_name);
        let transcode_status = if media_type == MediaType::Video {
            TranscodeStatus::Uploaded
        } else {
            TranscodeStatus::Ready
        };

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            content_type: content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("application/octet-stream")
                .to_string(),
            file_name,
            media_type,
            size_bytes,
            url,
            thumbnail_url,
            hls_url: None,
            mp4_urls: Vec::new(),
            transcode_status,
            created_at: Utc::now(),
        })
    }

    pub fn apply_transcode(&mut self, update: TranscodeUpdate) -> Result<(), DomainError> {
        if self.media_type != MediaType::Video {
            return Err(DomainError::InvalidTransition(format!(
                "{} media is never transcoded",
                self.media_type
            )));
        }
        if !self.transcode_status.can_transition_to(update.status) {
            return Err(DomainError::InvalidTransition(format!(
                "{} -> {}",
                self.transcode_status, update.status
            )));
        }

        self.transcode_status = update.status;
        if update.hls_url.is_some() {
            self.hls_url = update.hls_url;
        }
        if !update.mp4_urls.is_empty() {
            self.mp4_urls = update.mp4_urls;
        }
        if update.thumbnail_url.is_some() {
            self.thumbnail_url = update.thumbnail_url;
        }
        Ok(())
    }

    /// Streaming descriptor for a video; `None` for other media types.
    pub fn video_descriptor(&self) -> Option<VideoDescriptor> {
        (self.media_type == MediaType::Video).then(|| VideoDescriptor {
            hls_url: self.hls_url.clone(),
            mp4_urls: self.mp4_urls.clone(),
            mp4_fallback_url: None,
            video_url: Some(self.url.clone()),
            poster_url: self.thumbnail_url.clone(),
            transcode_status: self.transcode_status,
        })
    }
}

impl Record for Media {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime_prefix_then_extension() {
        assert_eq!(MediaType::classify(Some("video/mp4"), "x"), MediaType::Video);
        assert_eq!(MediaType::classify(Some("IMAGE/PNG"), "x"), MediaType::Image);
        assert_eq!(MediaType::classify(Some("audio/mpeg"), "x"), MediaType::Audio);
        assert_eq!(MediaType::classify(Some("text/plain"), "a.mp4"), MediaType::Document);
        assert_eq!(
            MediaType::classify(Some("application/octet-stream"), "clip.MOV"),
            MediaType::Video
        );
        assert_eq!(MediaType::classify(None, "photo.jpeg"), MediaType::Image);
        assert_eq!(MediaType::classify(None, "notes"), MediaType::Document);
    }

    #[test]
    fn test_upload_strategy_threshold() {
        let limit = UploadStrategy::DEFAULT_DIRECT_LIMIT;
        assert_eq!(UploadStrategy::for_size(limit, limit), UploadStrategy::Direct);
        assert_eq!(UploadStrategy::for_size(limit + 1, limit), UploadStrategy::Presigned);
    }

    #[test]
    fn test_video_lifecycle() {
        let mut media = Media::new(
            Uuid::new_v4(),
            "reel.mp4",
            Some("video/mp4"),
            1024,
            "https://cdn.example/raw/reel.mp4",
            None,
        )
        .unwrap();
        assert_eq!(media.transcode_status, TranscodeStatus::Uploaded);

        media
            .apply_transcode(TranscodeUpdate {
                status: TranscodeStatus::Transcoding,
                hls_url: None,
                mp4_urls: vec![],
                thumbnail_url: None,
            })
            .unwrap();
        media
            .apply_transcode(TranscodeUpdate {
                status: TranscodeStatus::Ready,
                hls_url: Some("https://cdn.example/hls/master.m3u8".into()),
                mp4_urls: vec![Rendition::new("720p", "https://cdn.example/720.mp4")],
                thumbnail_url: Some("https://cdn.example/thumb.jpg".into()),
            })
            .unwrap();

        let descriptor = media.video_descriptor().unwrap();
        assert_eq!(descriptor.transcode_status, TranscodeStatus::Ready);
        assert_eq!(descriptor.rendition("720p"), Some("https://cdn.example/720.mp4"));
        assert_eq!(descriptor.poster_url.as_deref(), Some("https://cdn.example/thumb.jpg"));

        let back = media.apply_transcode(TranscodeUpdate {
            status: TranscodeStatus::Uploaded,
            hls_url: None,
            mp4_urls: vec![],
            thumbnail_url: None,
        });
        assert!(matches!(back, Err(DomainError::InvalidTransition(_))));
    }

    #[test]
    fn test_uploaded_video_must_pass_through_transcoding() {
        use TranscodeStatus::*;
        for next in [Ready, Failed, Uploaded] {
            assert!(!Uploaded.can_transition_to(next), "UPLOADED -> {next}");
        }
        assert!(Uploaded.can_transition_to(Transcoding));
        assert!(Failed.can_transition_to(Transcoding));
        assert!(!Ready.can_transition_to(Transcoding));

        let mut media = Media::new(Uuid::new_v4(), "clip.mp4", Some("video/mp4"), 10, "u", None)
            .unwrap();
        let skipped = media.apply_transcode(TranscodeUpdate {
            status: Ready,
            hls_url: Some("https://cdn.example/hls/master.m3u8".into()),
            mp4_urls: vec![],
            thumbnail_url: None,
        });
        assert!(matches!(skipped, Err(DomainError::InvalidTransition(_))));
        assert_eq!(media.transcode_status, Uploaded);
        assert!(media.hls_url.is_none());
    }

    #[test]
    fn test_images_are_ready_and_have_no_descriptor() {
        let media = Media::new(Uuid::new_v4(), "a.png", Some("image/png"), 1, "u", None).unwrap();
        assert_eq!(media.transcode_status, TranscodeStatus::Ready);
        assert!(media.video_descriptor().is_none());
    }

    #[test]
    fn test_transcode_status_wire_format() {
        let json = serde_json::to_string(&TranscodeStatus::Transcoding).unwrap();
        assert_eq!(json, "\"TRANSCODING\"");
        assert_eq!("ready".parse::<TranscodeStatus>().unwrap(), TranscodeStatus::Ready);
    }
}
