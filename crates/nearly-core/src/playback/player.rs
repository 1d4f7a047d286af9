//! The reel player state machine.

use std::time::Duration;

use crate::domain::{TranscodeStatus, VideoDescriptor};

use super::config::{PlaybackConfig, PrefetchBudget};
use super::source::{PlaybackCapabilities, PlaybackSource, select_source};
use super::visibility::is_visible;

/// Timers the player asks the host to run. At most one of each kind is
/// pending at a time, so the kind doubles as the timer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Single-tap disambiguation window.
    Tap,
    /// HLS retry backoff.
    Retry,
    /// End of the bounded prefetch window for a preloading reel.
    Preload,
}

/// Everything the host reports to the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Mounted,
    DescriptorChanged(VideoDescriptor),
    ActiveChanged(bool),
    PreloadChanged(bool),
    Intersection { is_intersecting: bool, ratio: f64 },
    MediaPlaying,
    MediaPaused,
    MediaWaiting,
    MediaCanPlay,
    MediaEnded,
    MediaError,
    /// `play()` was refused, usually by an autoplay policy.
    PlayRejected,
    TimeUpdate { current_time: f64, duration: f64 },
    BufferUpdate { buffered_end: f64, duration: f64 },
    /// Fatal error from the adaptive-streaming library.
    HlsFatalError,
    Tap,
    RetryRequested,
    TimerFired(TimerKind),
    Unmounted,
}

/// Side effects the host must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Create an adaptive-streaming library instance for the manifest and
    /// attach it to the media element.
    AttachHls { url: String },
    /// Destroy the current library instance, cancelling its downloads.
    DestroyHls,
    /// Assign a URL to the media element's `src`.
    SetSource { url: String },
    /// Start segment loading. `None` means unbounded.
    StartLoad { budget: Option<PrefetchBudget> },
    StopLoad,
    Play,
    Pause,
    Seek { position: f64 },
    StartTimer { timer: TimerKind, after: Duration },
    CancelTimer { timer: TimerKind },
    /// Forward a confirmed single tap to the caller.
    SingleTap,
    /// Forward a double tap to the caller (like).
    DoubleTap,
    /// Playback failed for good; forward to the caller's error callback.
    ReportError { message: String },
}

/// Overlay the host should render on top of the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Upload still waiting on the transcoder.
    Processing,
    /// The transcoder gave up on this video.
    TranscodeFailed,
    Loading,
    /// Both HLS and the MP4 fallback failed; a retry button is offered.
    Unavailable,
}

/// State machine for one reel.
#[derive(Debug, Clone)]
pub struct ReelPlayer {
    config: PlaybackConfig,
    caps: PlaybackCapabilities,
    descriptor: VideoDescriptor,

    active: bool,
    preload: bool,
    visible: bool,
    manually_paused: bool,
    playing: bool,

    source: Option<PlaybackSource>,
    use_fallback: bool,
    retry_count: u32,
    retry_pending: bool,
    loading: bool,
    error: Option<String>,

    tap_pending: bool,
    preload_pending: bool,

    progress: f64,
    buffered: f64,
}

impl ReelPlayer {
    pub fn new(
        descriptor: VideoDescriptor,
        caps: PlaybackCapabilities,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            config,
            caps,
            descriptor,
            active: false,
            preload: false,
            visible: false,
            manually_paused: false,
            playing: false,
            source: None,
            use_fallback: false,
            retry_count: 0,
            retry_pending: false,
            loading: false,
            error: None,
            tap_pending: false,
            preload_pending: false,
            progress: 0.0,
            buffered: 0.0,
        }
    }

    /// Feed one event and collect the commands it produces.
    pub fn handle(&mut self, event: PlayerEvent) -> Vec<PlayerCommand> {
        let mut out = Vec::new();

        match event {
            PlayerEvent::Mounted => self.load_source(true, &mut out),
            PlayerEvent::DescriptorChanged(descriptor) => {
                self.on_descriptor_changed(descriptor, &mut out)
            }
            PlayerEvent::ActiveChanged(active) => self.on_active_changed(active, &mut out),
            PlayerEvent::PreloadChanged(preload) => {
                if self.preload != preload {
                    self.preload = preload;
                    self.apply_load_policy(&mut out);
                }
            }
            PlayerEvent::Intersection {
                is_intersecting,
                ratio,
            } => self.on_intersection(is_intersecting, ratio, &mut out),
            PlayerEvent::MediaPlaying => {
                self.playing = true;
                self.loading = false;
            }
            PlayerEvent::MediaPaused => self.playing = false,
            PlayerEvent::MediaWaiting => self.loading = true,
            PlayerEvent::MediaCanPlay => self.loading = false,
            PlayerEvent::PlayRejected => {
                tracing::debug!("play() rejected, waiting for a tap");
                self.playing = false;
            }
            PlayerEvent::MediaEnded => self.on_ended(&mut out),
            PlayerEvent::MediaError => self.on_media_error(&mut out),
            PlayerEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                if let Some(pct) = percentage(current_time, duration) {
                    self.progress = pct;
                }
            }
            PlayerEvent::BufferUpdate {
                buffered_end,
                duration,
            } => {
                if let Some(pct) = percentage(buffered_end, duration) {
                    self.buffered = pct;
                }
            }
            PlayerEvent::HlsFatalError => self.on_hls_fatal(&mut out),
            PlayerEvent::Tap => self.on_tap(&mut out),
            PlayerEvent::RetryRequested => self.on_manual_retry(&mut out),
            PlayerEvent::TimerFired(timer) => self.on_timer(timer, &mut out),
            PlayerEvent::Unmounted => self.on_unmounted(&mut out),
        }

        out
    }

    pub fn source(&self) -> Option<&PlaybackSource> {
        self.source.as_ref()
    }

    pub fn descriptor(&self) -> &VideoDescriptor {
        &self.descriptor
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_manually_paused(&self) -> bool {
        self.manually_paused
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn uses_fallback(&self) -> bool {
        self.use_fallback
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Playback position as a percentage of the duration.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// End of the buffered range as a percentage of the duration.
    pub fn buffered(&self) -> f64 {
        self.buffered
    }

    /// Transcode status gates the overlay before playback state does.
    pub fn overlay(&self) -> Overlay {
        match self.descriptor.transcode_status {
            TranscodeStatus::Uploaded | TranscodeStatus::Transcoding => Overlay::Processing,
            TranscodeStatus::Failed => Overlay::TranscodeFailed,
            TranscodeStatus::Ready if self.error.is_some() => Overlay::Unavailable,
            TranscodeStatus::Ready if self.loading => Overlay::Loading,
            TranscodeStatus::Ready => Overlay::None,
        }
    }

    pub fn shows_mute_control(&self) -> bool {
        self.descriptor.transcode_status != TranscodeStatus::Failed
    }

    /// The retry affordance only exists in the terminal error state.
    pub fn can_retry(&self) -> bool {
        self.overlay() == Overlay::Unavailable
    }

    fn should_play(&self) -> bool {
        self.active
            && self.visible
            && !self.manually_paused
            && self.error.is_none()
            && self.source.is_some()
    }

    fn hls_attached(&self) -> bool {
        self.source.as_ref().is_some_and(PlaybackSource::is_hls_library)
    }

    /// Run source selection and switch sources when the choice changed.
    /// `force` reloads even an unchanged source.
    fn load_source(&mut self, force: bool, out: &mut Vec<PlayerCommand>) {
        let next = select_source(&self.descriptor, self.caps, self.use_fallback);
        if !force && next == self.source {
            return;
        }

        if self.hls_attached() {
            out.push(PlayerCommand::DestroyHls);
        }
        self.cancel_timer(TimerKind::Retry, out);
        self.cancel_timer(TimerKind::Preload, out);
        self.progress = 0.0;
        self.buffered = 0.0;
        self.playing = false;

        let Some(source) = next else {
            self.source = None;
            self.fail("no playable source", out);
            return;
        };

        tracing::debug!(source = ?source, fallback = self.use_fallback, "Loading reel source");
        match &source {
            PlaybackSource::Hls(url) => out.push(PlayerCommand::AttachHls { url: url.clone() }),
            PlaybackSource::NativeHls(url) | PlaybackSource::Progressive(url) => {
                out.push(PlayerCommand::SetSource { url: url.clone() })
            }
        }
        self.source = Some(source);
        self.loading = true;

        self.apply_load_policy(out);
        self.reconcile_playback(out);
    }

    /// Only the adaptive-streaming library has explicit load control.
    fn apply_load_policy(&mut self, out: &mut Vec<PlayerCommand>) {
        if !self.hls_attached() || self.error.is_some() {
            return;
        }

        if self.active {
            self.cancel_timer(TimerKind::Preload, out);
            out.push(PlayerCommand::StartLoad { budget: None });
        } else if self.preload {
            out.push(PlayerCommand::StartLoad {
                budget: Some(self.config.preload_budget()),
            });
            self.cancel_timer(TimerKind::Preload, out);
            self.preload_pending = true;
            out.push(PlayerCommand::StartTimer {
                timer: TimerKind::Preload,
                after: self.config.preload_window(),
            });
        } else {
            self.cancel_timer(TimerKind::Preload, out);
            out.push(PlayerCommand::StopLoad);
        }
    }

    fn reconcile_playback(&mut self, out: &mut Vec<PlayerCommand>) {
        let should_play = self.should_play();
        if should_play && !self.playing {
            out.push(PlayerCommand::Play);
            self.playing = true;
        } else if !should_play && self.playing {
            out.push(PlayerCommand::Pause);
            self.playing = false;
        }
    }

    fn pause_now(&mut self, out: &mut Vec<PlayerCommand>) {
        out.push(PlayerCommand::Pause);
        self.playing = false;
    }

    fn cancel_timer(&mut self, timer: TimerKind, out: &mut Vec<PlayerCommand>) {
        let pending = match timer {
            TimerKind::Tap => &mut self.tap_pending,
            TimerKind::Retry => &mut self.retry_pending,
            TimerKind::Preload => &mut self.preload_pending,
        };
        if *pending {
            *pending = false;
            out.push(PlayerCommand::CancelTimer { timer });
        }
    }

    fn fail(&mut self, message: &str, out: &mut Vec<PlayerCommand>) {
        tracing::warn!(error = %message, "Reel playback unavailable");
        if self.playing {
            self.pause_now(out);
        }
        self.error = Some(message.to_string());
        self.loading = false;
        out.push(PlayerCommand::ReportError {
            message: message.to_string(),
        });
    }

    fn on_descriptor_changed(&mut self, descriptor: VideoDescriptor, out: &mut Vec<PlayerCommand>) {
        if descriptor == self.descriptor {
            return;
        }
        let same_sources = descriptor.hls_url == self.descriptor.hls_url
            && descriptor.mp4_urls == self.descriptor.mp4_urls
            && descriptor.mp4_fallback_url == self.descriptor.mp4_fallback_url
            && descriptor.video_url == self.descriptor.video_url;
        self.descriptor = descriptor;

        if !same_sources {
            self.error = None;
            self.use_fallback = false;
            self.retry_count = 0;
            self.load_source(false, out);
        }
    }

    fn on_active_changed(&mut self, active: bool, out: &mut Vec<PlayerCommand>) {
        if self.active == active {
            return;
        }
        self.active = active;

        if active {
            // a reel that scrolls back into focus autoplays again
            self.manually_paused = false;
            self.apply_load_policy(out);
            self.reconcile_playback(out);
        } else {
            self.pause_now(out);
            self.apply_load_policy(out);
        }
    }

    fn on_intersection(&mut self, is_intersecting: bool, ratio: f64, out: &mut Vec<PlayerCommand>) {
        let visible = is_visible(is_intersecting, ratio, self.config.visibility_threshold);
        if visible == self.visible {
            return;
        }
        self.visible = visible;

        if !visible && self.playing {
            self.pause_now(out);
        } else {
            self.reconcile_playback(out);
        }
    }

    fn on_ended(&mut self, out: &mut Vec<PlayerCommand>) {
        out.push(PlayerCommand::Seek { position: 0.0 });
        self.playing = false;
        self.progress = 0.0;
        if self.should_play() {
            out.push(PlayerCommand::Play);
            self.playing = true;
        }
    }

    fn on_hls_fatal(&mut self, out: &mut Vec<PlayerCommand>) {
        if !self.hls_attached() || self.retry_pending {
            return;
        }

        if self.retry_count < self.config.max_hls_retries {
            let after = self.config.retry_delay(self.retry_count);
            self.retry_count += 1;
            self.retry_pending = true;
            tracing::debug!(
                attempt = self.retry_count,
                delay_ms = after.as_millis() as u64,
                "HLS fatal error, retrying"
            );
            out.push(PlayerCommand::StartTimer {
                timer: TimerKind::Retry,
                after,
            });
        } else {
            tracing::warn!(
                retries = self.retry_count,
                "HLS retries exhausted, switching to MP4 fallback"
            );
            self.use_fallback = true;
            self.retry_count = 0;
            self.load_source(false, out);
        }
    }

    fn on_media_error(&mut self, out: &mut Vec<PlayerCommand>) {
        if self.source.is_none() || self.error.is_some() {
            return;
        }

        if !self.use_fallback {
            tracing::debug!("Media element error, trying MP4 fallback");
            self.use_fallback = true;
            self.retry_count = 0;
            self.load_source(true, out);
        } else {
            self.fail("video unavailable", out);
        }
    }

    fn on_manual_retry(&mut self, out: &mut Vec<PlayerCommand>) {
        if self.error.is_none() {
            return;
        }
        tracing::debug!("Manual retry requested");
        self.error = None;
        self.retry_count = 0;
        self.use_fallback = false;
        self.load_source(true, out);
    }

    fn on_tap(&mut self, out: &mut Vec<PlayerCommand>) {
        if self.tap_pending {
            self.cancel_timer(TimerKind::Tap, out);
            out.push(PlayerCommand::DoubleTap);
        } else {
            self.tap_pending = true;
            out.push(PlayerCommand::StartTimer {
                timer: TimerKind::Tap,
                after: self.config.double_tap_window(),
            });
        }
    }

    fn on_timer(&mut self, timer: TimerKind, out: &mut Vec<PlayerCommand>) {
        match timer {
            TimerKind::Tap if self.tap_pending => {
                self.tap_pending = false;
                out.push(PlayerCommand::SingleTap);
                self.toggle_play(out);
            }
            TimerKind::Retry if self.retry_pending => {
                self.retry_pending = false;
                // an idle reel stays stopped; the retry happens on activation
                if self.hls_attached() && (self.active || self.preload) {
                    self.loading = true;
                    self.apply_load_policy(out);
                }
            }
            TimerKind::Preload if self.preload_pending => {
                self.preload_pending = false;
                if !self.active && self.hls_attached() {
                    out.push(PlayerCommand::StopLoad);
                }
            }
            // stale timer the host fired after a cancel
            _ => {}
        }
    }

    fn toggle_play(&mut self, out: &mut Vec<PlayerCommand>) {
        if self.source.is_none() || self.error.is_some() {
            return;
        }
        if self.playing {
            self.manually_paused = true;
            self.pause_now(out);
        } else {
            self.manually_paused = false;
            out.push(PlayerCommand::Play);
            self.playing = true;
        }
    }

    fn on_unmounted(&mut self, out: &mut Vec<PlayerCommand>) {
        if self.hls_attached() {
            out.push(PlayerCommand::DestroyHls);
        }
        for timer in [TimerKind::Tap, TimerKind::Retry, TimerKind::Preload] {
            self.cancel_timer(timer, out);
        }
        self.source = None;
        self.playing = false;
        self.loading = false;
    }
}

fn percentage(value: f64, duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0 && value.is_finite())
        .then(|| (value / duration * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rendition;

    const MSE: PlaybackCapabilities = PlaybackCapabilities {
        mse_hls: true,
        native_hls: false,
    };

    fn descriptor() -> VideoDescriptor {
        VideoDescriptor {
            hls_url: Some("https://cdn/r/master.m3u8".into()),
            mp4_urls: vec![
                Rendition::new("1080p", "https://cdn/r/1080.mp4"),
                Rendition::new("720p", "https://cdn/r/720.mp4"),
            ],
            mp4_fallback_url: None,
            video_url: None,
            poster_url: None,
            transcode_status: TranscodeStatus::Ready,
        }
    }

    fn mounted(caps: PlaybackCapabilities) -> ReelPlayer {
        let mut player = ReelPlayer::new(descriptor(), caps, PlaybackConfig::default());
        player.handle(PlayerEvent::Mounted);
        player
    }

    /// Mounted, active and on screen: the normal state of the centred reel.
    fn playing(caps: PlaybackCapabilities) -> ReelPlayer {
        let mut player = mounted(caps);
        player.handle(PlayerEvent::ActiveChanged(true));
        player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 1.0,
        });
        player.handle(PlayerEvent::MediaPlaying);
        player
    }

    fn fail_hls(player: &mut ReelPlayer) -> Vec<PlayerCommand> {
        let out = player.handle(PlayerEvent::HlsFatalError);
        if player.retry_pending {
            player.handle(PlayerEvent::TimerFired(TimerKind::Retry));
        }
        out
    }

    #[test]
    fn test_mount_attaches_hls_and_stops_loading_when_idle() {
        let mut player = ReelPlayer::new(descriptor(), MSE, PlaybackConfig::default());
        let out = player.handle(PlayerEvent::Mounted);
        assert_eq!(
            out,
            vec![
                PlayerCommand::AttachHls {
                    url: "https://cdn/r/master.m3u8".into()
                },
                PlayerCommand::StopLoad,
            ]
        );
        assert!(player.is_loading());
    }

    #[test]
    fn test_unsupported_hls_goes_straight_to_mp4() {
        let mut player =
            ReelPlayer::new(descriptor(), PlaybackCapabilities::default(), PlaybackConfig::default());
        let out = player.handle(PlayerEvent::Mounted);
        assert_eq!(
            out,
            vec![PlayerCommand::SetSource {
                url: "https://cdn/r/1080.mp4".into()
            }]
        );
        assert!(!out.iter().any(|c| matches!(c, PlayerCommand::AttachHls { .. })));
    }

    #[test]
    fn test_native_hls_assigns_manifest_to_src() {
        let caps = PlaybackCapabilities {
            mse_hls: false,
            native_hls: true,
        };
        let player = mounted(caps);
        assert_eq!(
            player.source(),
            Some(&PlaybackSource::NativeHls("https://cdn/r/master.m3u8".into()))
        );
    }

    #[test]
    fn test_plays_only_when_active_visible_and_not_paused() {
        let mut player = mounted(MSE);
        let out = player.handle(PlayerEvent::ActiveChanged(true));
        assert_eq!(out, vec![PlayerCommand::StartLoad { budget: None }]);

        let out = player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 0.5,
        });
        assert!(out.is_empty());

        let out = player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 0.7,
        });
        assert_eq!(out, vec![PlayerCommand::Play]);
        assert!(player.is_playing());
    }

    #[test]
    fn test_deactivation_always_pauses() {
        let mut player = playing(MSE);
        let out = player.handle(PlayerEvent::ActiveChanged(false));
        assert_eq!(out[0], PlayerCommand::Pause);
        assert!(out.contains(&PlayerCommand::StopLoad));
        assert!(!player.is_playing());

        // even when the player did not believe it was playing
        let mut player = mounted(MSE);
        player.handle(PlayerEvent::ActiveChanged(true));
        player.handle(PlayerEvent::PlayRejected);
        let out = player.handle(PlayerEvent::ActiveChanged(false));
        assert_eq!(out[0], PlayerCommand::Pause);
    }

    #[test]
    fn test_scrolling_out_of_view_pauses_immediately() {
        let mut player = playing(MSE);
        let out = player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 0.3,
        });
        assert_eq!(out, vec![PlayerCommand::Pause]);
        assert!(!player.is_visible());

        let out = player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 0.9,
        });
        assert_eq!(out, vec![PlayerCommand::Play]);
    }

    #[test]
    fn test_preload_prefetches_then_stops_after_window() {
        let mut player = mounted(MSE);
        let out = player.handle(PlayerEvent::PreloadChanged(true));
        assert_eq!(
            out,
            vec![
                PlayerCommand::StartLoad {
                    budget: Some(PrefetchBudget {
                        max_segments: 2,
                        max_buffer_secs: 4
                    })
                },
                PlayerCommand::StartTimer {
                    timer: TimerKind::Preload,
                    after: Duration::from_secs(2)
                },
            ]
        );

        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Preload));
        assert_eq!(out, vec![PlayerCommand::StopLoad]);
    }

    #[test]
    fn test_activation_during_preload_cancels_the_stop() {
        let mut player = mounted(MSE);
        player.handle(PlayerEvent::PreloadChanged(true));
        let out = player.handle(PlayerEvent::ActiveChanged(true));
        assert_eq!(
            out,
            vec![
                PlayerCommand::CancelTimer {
                    timer: TimerKind::Preload
                },
                PlayerCommand::StartLoad { budget: None },
            ]
        );
        // a late timer must not stop the active reel
        assert!(player.handle(PlayerEvent::TimerFired(TimerKind::Preload)).is_empty());
    }

    #[test]
    fn test_retry_after_deactivation_keeps_loading_stopped() {
        let mut player = playing(MSE);
        player.handle(PlayerEvent::HlsFatalError);
        let out = player.handle(PlayerEvent::ActiveChanged(false));
        assert_eq!(out, vec![PlayerCommand::Pause, PlayerCommand::StopLoad]);

        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Retry));
        assert!(
            !out.iter().any(|c| matches!(c, PlayerCommand::StartLoad { .. })),
            "idle reel restarted loading: {out:?}"
        );
        assert!(!player.is_loading());

        // coming back into focus loads without limits
        let out = player.handle(PlayerEvent::ActiveChanged(true));
        assert!(out.contains(&PlayerCommand::StartLoad { budget: None }));
    }

    #[test]
    fn test_retry_while_preloading_rearms_the_preload_window() {
        let mut player = mounted(MSE);
        player.handle(PlayerEvent::PreloadChanged(true));
        player.handle(PlayerEvent::TimerFired(TimerKind::Preload));
        player.handle(PlayerEvent::HlsFatalError);

        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Retry));
        assert_eq!(
            out,
            vec![
                PlayerCommand::StartLoad {
                    budget: Some(PrefetchBudget {
                        max_segments: 2,
                        max_buffer_secs: 4
                    })
                },
                PlayerCommand::StartTimer {
                    timer: TimerKind::Preload,
                    after: Duration::from_secs(2)
                },
            ]
        );

        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Preload));
        assert_eq!(out, vec![PlayerCommand::StopLoad]);
    }

    #[test]
    fn test_hls_retries_with_linear_backoff_then_falls_back() {
        let mut player = playing(MSE);

        let out = fail_hls(&mut player);
        assert_eq!(
            out,
            vec![PlayerCommand::StartTimer {
                timer: TimerKind::Retry,
                after: Duration::from_millis(1000)
            }]
        );
        assert_eq!(player.retry_count(), 1);

        let out = fail_hls(&mut player);
        assert_eq!(
            out,
            vec![PlayerCommand::StartTimer {
                timer: TimerKind::Retry,
                after: Duration::from_millis(2000)
            }]
        );
        assert_eq!(player.retry_count(), 2);

        let out = player.handle(PlayerEvent::HlsFatalError);
        assert_eq!(out[0], PlayerCommand::DestroyHls);
        assert!(out.contains(&PlayerCommand::SetSource {
            url: "https://cdn/r/1080.mp4".into()
        }));
        assert!(player.uses_fallback());
        assert_eq!(player.retry_count(), 0);
        assert_eq!(
            player.source(),
            Some(&PlaybackSource::Progressive("https://cdn/r/1080.mp4".into()))
        );
    }

    #[test]
    fn test_fallback_is_sticky_until_manual_retry() {
        let mut player = playing(MSE);
        for _ in 0..3 {
            fail_hls(&mut player);
        }
        assert!(player.uses_fallback());

        // unrelated events never bring HLS back
        player.handle(PlayerEvent::ActiveChanged(false));
        player.handle(PlayerEvent::PreloadChanged(true));
        player.handle(PlayerEvent::ActiveChanged(true));
        let mut d = descriptor();
        d.poster_url = Some("https://cdn/r/poster.jpg".into());
        player.handle(PlayerEvent::DescriptorChanged(d));
        assert!(matches!(player.source(), Some(PlaybackSource::Progressive(_))));

        // the MP4 fails as well: terminal
        let out = player.handle(PlayerEvent::MediaError);
        assert!(out.contains(&PlayerCommand::ReportError {
            message: "video unavailable".into()
        }));
        assert_eq!(player.overlay(), Overlay::Unavailable);
        assert!(player.can_retry());

        let out = player.handle(PlayerEvent::RetryRequested);
        assert!(out.contains(&PlayerCommand::AttachHls {
            url: "https://cdn/r/master.m3u8".into()
        }));
        assert!(!player.uses_fallback());
        assert_eq!(player.error(), None);
    }

    #[test]
    fn test_media_error_switches_to_fallback_without_retry_budget() {
        let mut player = playing(MSE);
        let out = player.handle(PlayerEvent::MediaError);
        assert_eq!(out[0], PlayerCommand::DestroyHls);
        assert!(out.contains(&PlayerCommand::SetSource {
            url: "https://cdn/r/1080.mp4".into()
        }));
        assert!(out.contains(&PlayerCommand::Play));
        assert!(player.error().is_none());

        let out = player.handle(PlayerEvent::MediaError);
        assert!(out.contains(&PlayerCommand::ReportError {
            message: "video unavailable".into()
        }));
        // further errors are not reported twice
        assert!(player.handle(PlayerEvent::MediaError).is_empty());
    }

    #[test]
    fn test_manual_retry_ignored_when_healthy() {
        let mut player = playing(MSE);
        assert!(!player.can_retry());
        assert!(player.handle(PlayerEvent::RetryRequested).is_empty());
    }

    #[test]
    fn test_no_source_is_terminal() {
        let d = VideoDescriptor {
            hls_url: None,
            mp4_urls: vec![],
            mp4_fallback_url: None,
            video_url: None,
            poster_url: None,
            transcode_status: TranscodeStatus::Ready,
        };
        let mut player = ReelPlayer::new(d, MSE, PlaybackConfig::default());
        let out = player.handle(PlayerEvent::Mounted);
        assert_eq!(
            out,
            vec![PlayerCommand::ReportError {
                message: "no playable source".into()
            }]
        );
        assert_eq!(player.overlay(), Overlay::Unavailable);
    }

    #[test]
    fn test_double_tap_fires_once_and_never_toggles() {
        let mut player = playing(MSE);
        let first = player.handle(PlayerEvent::Tap);
        assert_eq!(
            first,
            vec![PlayerCommand::StartTimer {
                timer: TimerKind::Tap,
                after: Duration::from_millis(300)
            }]
        );
        let second = player.handle(PlayerEvent::Tap);
        assert_eq!(
            second,
            vec![
                PlayerCommand::CancelTimer {
                    timer: TimerKind::Tap
                },
                PlayerCommand::DoubleTap,
            ]
        );
        // the cancelled timer firing late changes nothing
        assert!(player.handle(PlayerEvent::TimerFired(TimerKind::Tap)).is_empty());
        assert!(player.is_playing());
    }

    #[test]
    fn test_spaced_taps_are_two_single_taps_with_toggles() {
        let mut player = playing(MSE);

        player.handle(PlayerEvent::Tap);
        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Tap));
        assert_eq!(out, vec![PlayerCommand::SingleTap, PlayerCommand::Pause]);
        assert!(player.is_manually_paused());

        // visibility changes do not override a manual pause
        player.handle(PlayerEvent::Intersection {
            is_intersecting: false,
            ratio: 0.0,
        });
        let out = player.handle(PlayerEvent::Intersection {
            is_intersecting: true,
            ratio: 1.0,
        });
        assert!(out.is_empty());

        player.handle(PlayerEvent::Tap);
        let out = player.handle(PlayerEvent::TimerFired(TimerKind::Tap));
        assert_eq!(out, vec![PlayerCommand::SingleTap, PlayerCommand::Play]);
        assert!(!player.is_manually_paused());
    }

    #[test]
    fn test_ended_loops_while_active() {
        let mut player = playing(MSE);
        let out = player.handle(PlayerEvent::MediaEnded);
        assert_eq!(
            out,
            vec![PlayerCommand::Seek { position: 0.0 }, PlayerCommand::Play]
        );

        player.handle(PlayerEvent::ActiveChanged(false));
        let out = player.handle(PlayerEvent::MediaEnded);
        assert_eq!(out, vec![PlayerCommand::Seek { position: 0.0 }]);
    }

    #[test]
    fn test_progress_and_buffer_percentages() {
        let mut player = playing(MSE);
        player.handle(PlayerEvent::TimeUpdate {
            current_time: 3.0,
            duration: 12.0,
        });
        player.handle(PlayerEvent::BufferUpdate {
            buffered_end: 9.0,
            duration: 12.0,
        });
        assert_eq!(player.progress(), 25.0);
        assert_eq!(player.buffered(), 75.0);

        // unknown duration leaves the bars alone
        player.handle(PlayerEvent::TimeUpdate {
            current_time: 5.0,
            duration: f64::NAN,
        });
        assert_eq!(player.progress(), 25.0);
    }

    #[test]
    fn test_processing_overlay_hides_spinner_and_errors() {
        for status in [TranscodeStatus::Uploaded, TranscodeStatus::Transcoding] {
            let mut d = descriptor();
            d.transcode_status = status;
            d.hls_url = None;
            d.mp4_urls.clear();
            let mut player = ReelPlayer::new(d, MSE, PlaybackConfig::default());
            player.handle(PlayerEvent::Mounted);
            assert!(player.error().is_some());
            assert_eq!(player.overlay(), Overlay::Processing);
            assert!(!player.can_retry());

            player.handle(PlayerEvent::MediaWaiting);
            assert_eq!(player.overlay(), Overlay::Processing);
        }
    }

    #[test]
    fn test_failed_transcode_hides_mute_control() {
        let mut d = descriptor();
        d.transcode_status = TranscodeStatus::Failed;
        let player = ReelPlayer::new(d, MSE, PlaybackConfig::default());
        assert_eq!(player.overlay(), Overlay::TranscodeFailed);
        assert!(!player.shows_mute_control());
        assert!(mounted(MSE).shows_mute_control());
    }

    #[test]
    fn test_new_video_resets_fallback_and_replaces_hls_instance() {
        let mut player = playing(MSE);
        player.handle(PlayerEvent::MediaError);
        assert!(player.uses_fallback());

        let mut next = descriptor();
        next.hls_url = Some("https://cdn/other/master.m3u8".into());
        let out = player.handle(PlayerEvent::DescriptorChanged(next));
        assert!(out.contains(&PlayerCommand::AttachHls {
            url: "https://cdn/other/master.m3u8".into()
        }));
        assert!(!player.uses_fallback());
    }

    #[test]
    fn test_unmount_destroys_hls_and_cancels_timers() {
        let mut player = playing(MSE);
        player.handle(PlayerEvent::Tap);
        player.handle(PlayerEvent::HlsFatalError);
        let out = player.handle(PlayerEvent::Unmounted);
        assert_eq!(
            out,
            vec![
                PlayerCommand::DestroyHls,
                PlayerCommand::CancelTimer {
                    timer: TimerKind::Tap
                },
                PlayerCommand::CancelTimer {
                    timer: TimerKind::Retry
                },
            ]
        );
        assert!(player.source().is_none());
    }
}
