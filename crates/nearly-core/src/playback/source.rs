//! HLS versus progressive MP4 source negotiation.

use serde::{Deserialize, Serialize};

use crate::domain::VideoDescriptor;

/// What the runtime can play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackCapabilities {
    /// An MSE-based HLS library is available.
    pub mse_hls: bool,
    /// The media element plays HLS manifests natively (Safari).
    pub native_hls: bool,
}

/// A concrete source handed to the media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    /// Played through the adaptive-streaming library.
    Hls(String),
    /// Manifest assigned directly to the media element's `src`.
    NativeHls(String),
    /// Plain MP4 file.
    Progressive(String),
}

impl PlaybackSource {
    pub fn url(&self) -> &str {
        match self {
            PlaybackSource::Hls(url)
            | PlaybackSource::NativeHls(url)
            | PlaybackSource::Progressive(url) => url,
        }
    }

    pub fn is_hls_library(&self) -> bool {
        matches!(self, PlaybackSource::Hls(_))
    }
}

fn non_empty(url: Option<&str>) -> Option<&str> {
    url.filter(|u| !u.trim().is_empty())
}

/// Best progressive URL: the explicit fallback, then 1080p, then 720p, then
/// the first listed rendition, then the original upload.
pub fn best_progressive_url(descriptor: &VideoDescriptor) -> Option<&str> {
    non_empty(descriptor.mp4_fallback_url.as_deref())
        .or_else(|| non_empty(descriptor.rendition("1080p")))
        .or_else(|| non_empty(descriptor.rendition("720p")))
        .or_else(|| {
            descriptor
                .mp4_urls
                .iter()
                .map(|r| r.url.as_str())
                .find(|u| !u.trim().is_empty())
        })
        .or_else(|| non_empty(descriptor.video_url.as_deref()))
}

/// Pick the source to play.
///
/// Once HLS has been given up on (`use_fallback`), only progressive sources
/// are considered.
pub fn select_source(
    descriptor: &VideoDescriptor,
    caps: PlaybackCapabilities,
    use_fallback: bool,
) -> Option<PlaybackSource> {
    let progressive =
        || best_progressive_url(descriptor).map(|u| PlaybackSource::Progressive(u.to_string()));

    if use_fallback {
        return progressive();
    }

    match non_empty(descriptor.hls_url.as_deref()) {
        Some(manifest) if caps.mse_hls => Some(PlaybackSource::Hls(manifest.to_string())),
        Some(manifest) if caps.native_hls => Some(PlaybackSource::NativeHls(manifest.to_string())),
        _ => progressive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rendition, TranscodeStatus};

    fn descriptor() -> VideoDescriptor {
        VideoDescriptor {
            hls_url: Some("https://cdn/v/master.m3u8".into()),
            mp4_urls: vec![
                Rendition::new("480p", "https://cdn/v/480.mp4"),
                Rendition::new("720p", "https://cdn/v/720.mp4"),
                Rendition::new("1080p", "https://cdn/v/1080.mp4"),
            ],
            mp4_fallback_url: None,
            video_url: Some("https://cdn/v/raw.mp4".into()),
            poster_url: None,
            transcode_status: TranscodeStatus::Ready,
        }
    }

    const MSE: PlaybackCapabilities = PlaybackCapabilities {
        mse_hls: true,
        native_hls: false,
    };

    #[test]
    fn test_prefers_1080p_over_720p() {
        let mut d = descriptor();
        d.mp4_urls = vec![
            Rendition::new("1080p", "A"),
            Rendition::new("720p", "B"),
        ];
        assert_eq!(best_progressive_url(&d), Some("A"));
        d.mp4_urls.reverse();
        assert_eq!(best_progressive_url(&d), Some("A"));
    }

    #[test]
    fn test_progressive_chain_order() {
        let mut d = descriptor();
        d.mp4_fallback_url = Some("https://cdn/v/best.mp4".into());
        assert_eq!(best_progressive_url(&d), Some("https://cdn/v/best.mp4"));

        d.mp4_fallback_url = None;
        d.mp4_urls.retain(|r| r.quality != "1080p");
        assert_eq!(best_progressive_url(&d), Some("https://cdn/v/720.mp4"));

        d.mp4_urls.retain(|r| r.quality != "720p");
        assert_eq!(best_progressive_url(&d), Some("https://cdn/v/480.mp4"));

        d.mp4_urls.clear();
        assert_eq!(best_progressive_url(&d), Some("https://cdn/v/raw.mp4"));

        d.video_url = None;
        assert_eq!(best_progressive_url(&d), None);
    }

    #[test]
    fn test_selection_policy() {
        let d = descriptor();
        assert_eq!(
            select_source(&d, MSE, false),
            Some(PlaybackSource::Hls("https://cdn/v/master.m3u8".into()))
        );

        let safari = PlaybackCapabilities {
            mse_hls: false,
            native_hls: true,
        };
        assert_eq!(
            select_source(&d, safari, false),
            Some(PlaybackSource::NativeHls("https://cdn/v/master.m3u8".into()))
        );

        let neither = PlaybackCapabilities::default();
        assert_eq!(
            select_source(&d, neither, false),
            Some(PlaybackSource::Progressive("https://cdn/v/1080.mp4".into()))
        );

        // fallback wins even when HLS is supported
        assert_eq!(
            select_source(&d, MSE, true),
            Some(PlaybackSource::Progressive("https://cdn/v/1080.mp4".into()))
        );
    }

    #[test]
    fn test_blank_manifest_is_ignored() {
        let mut d = descriptor();
        d.hls_url = Some("  ".into());
        assert_eq!(
            select_source(&d, MSE, false),
            Some(PlaybackSource::Progressive("https://cdn/v/1080.mp4".into()))
        );
    }
}
