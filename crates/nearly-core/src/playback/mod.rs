//! Adaptive reel playback.
//!
//! [`ReelPlayer`] is a host-driven state machine: the host (browser shell,
//! native app) reports media-element, HLS-library, intersection and timer
//! events, and executes the [`PlayerCommand`]s that come back. The player
//! never touches a clock or a media element itself, which keeps every
//! transition deterministic and testable.

mod config;
mod player;
mod source;
mod visibility;

pub use config::{PlaybackConfig, PlaybackError, PrefetchBudget};
pub use player::{Overlay, PlayerCommand, PlayerEvent, ReelPlayer, TimerKind};
pub use source::{PlaybackCapabilities, PlaybackSource, best_progressive_url, select_source};
pub use visibility::{INTERSECTION_STEPS, intersection_thresholds, is_visible};
