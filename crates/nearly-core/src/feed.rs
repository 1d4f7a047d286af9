//! Reels feed composition.
//!
//! The feed tracks which reel is the active one. Two signals drive it: the
//! scroll position of the snapping container and per-item visibility
//! callbacks. Either may arrive first; both converge on the same index, and
//! a visibility callback is only trusted when the scroll estimate agrees
//! with it.

use crate::playback::PlaybackConfig;

/// What a feed item should be doing given the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemPlacement {
    pub active: bool,
    pub preload: bool,
    /// Far enough away that the player may be unmounted.
    pub unload: bool,
}

#[derive(Debug, Clone)]
pub struct ReelsFeed {
    len: usize,
    item_height: f64,
    current_index: usize,
    config: PlaybackConfig,
}

impl ReelsFeed {
    pub fn new(len: usize, item_height: f64, config: PlaybackConfig) -> Self {
        Self {
            len,
            item_height,
            current_index: 0,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Viewport resized; the snap height follows it.
    pub fn set_item_height(&mut self, item_height: f64) {
        self.item_height = item_height;
    }

    /// Items were appended or removed. Keeps the current index in range.
    pub fn set_len(&mut self, len: usize) -> Option<usize> {
        self.len = len;
        let clamped = self.current_index.min(len.saturating_sub(1));
        self.change_to(clamped)
    }

    /// Index the scroll position snaps to, or `None` for an empty feed or
    /// an unmeasured viewport.
    pub fn estimate_index(&self, scroll_top: f64) -> Option<usize> {
        if self.len == 0 || !(self.item_height > 0.0) || !scroll_top.is_finite() {
            return None;
        }
        let raw = (scroll_top / self.item_height).round().max(0.0) as usize;
        Some(raw.min(self.len - 1))
    }

    /// Scroll signal. Returns the new index when it changed.
    pub fn on_scroll(&mut self, scroll_top: f64) -> Option<usize> {
        let index = self.estimate_index(scroll_top)?;
        self.change_to(index)
    }

    /// Visibility signal for item `index`. Accepted only when the item is
    /// mostly on screen and the scroll estimate points at the same item.
    pub fn on_item_visible(&mut self, index: usize, ratio: f64, scroll_top: f64) -> Option<usize> {
        if index >= self.len || !(ratio > self.config.activation_ratio) {
            return None;
        }
        if self.estimate_index(scroll_top)? != index {
            tracing::debug!(index, scroll_top, "Ignoring visibility signal, scroll disagrees");
            return None;
        }
        self.change_to(index)
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.current_index
    }

    /// Neighbours within the preload distance, on either side.
    pub fn should_preload(&self, index: usize) -> bool {
        let d = self.distance(index);
        d > 0 && d <= self.config.preload_distance
    }

    pub fn should_unload(&self, index: usize) -> bool {
        self.distance(index) > self.config.unload_distance
    }

    pub fn placement(&self, index: usize) -> ItemPlacement {
        ItemPlacement {
            active: self.is_active(index),
            preload: self.should_preload(index),
            unload: self.should_unload(index),
        }
    }

    fn distance(&self, index: usize) -> usize {
        index.abs_diff(self.current_index)
    }

    fn change_to(&mut self, index: usize) -> Option<usize> {
        if index == self.current_index {
            return None;
        }
        tracing::debug!(from = self.current_index, to = index, "Active reel changed");
        self.current_index = index;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(len: usize) -> ReelsFeed {
        ReelsFeed::new(len, 800.0, PlaybackConfig::default())
    }

    #[test]
    fn test_scroll_rounds_to_nearest_item() {
        let mut feed = feed(10);
        assert_eq!(feed.on_scroll(390.0), None);
        assert_eq!(feed.on_scroll(410.0), Some(1));
        assert_eq!(feed.on_scroll(1600.0), Some(2));
        assert_eq!(feed.on_scroll(1610.0), None);
        // overscroll past the end clamps
        assert_eq!(feed.on_scroll(100_000.0), Some(9));
        assert_eq!(feed.on_scroll(-300.0), Some(0));
    }

    #[test]
    fn test_visibility_needs_majority_and_agreement() {
        let mut feed = feed(10);
        assert_eq!(feed.on_item_visible(1, 0.5, 800.0), None);
        assert_eq!(feed.on_item_visible(3, 0.9, 800.0), None);
        assert_eq!(feed.on_item_visible(1, 0.9, 800.0), Some(1));
        assert_eq!(feed.current_index(), 1);
    }

    #[test]
    fn test_both_signals_converge_once() {
        let mut feed = feed(10);
        assert_eq!(feed.on_item_visible(2, 0.8, 1600.0), Some(2));
        assert_eq!(feed.on_scroll(1600.0), None);

        assert_eq!(feed.on_scroll(2400.0), Some(3));
        assert_eq!(feed.on_item_visible(3, 0.8, 2400.0), None);
    }

    #[test]
    fn test_preload_and_unload_windows() {
        let mut feed = feed(12);
        feed.on_scroll(5.0 * 800.0);
        assert_eq!(feed.current_index(), 5);

        assert!(feed.should_preload(7));
        assert!(feed.should_preload(3));
        assert!(!feed.should_preload(5));
        assert!(!feed.should_preload(8));

        assert!(feed.should_unload(9));
        assert!(feed.should_unload(1));
        assert!(!feed.should_unload(8));

        assert_eq!(
            feed.placement(5),
            ItemPlacement {
                active: true,
                preload: false,
                unload: false
            }
        );
        assert_eq!(
            feed.placement(8),
            ItemPlacement {
                active: false,
                preload: false,
                unload: false
            }
        );
    }

    #[test]
    fn test_empty_or_unmeasured_feed_ignores_signals() {
        let mut empty = feed(0);
        assert_eq!(empty.on_scroll(800.0), None);
        assert_eq!(empty.on_item_visible(0, 1.0, 0.0), None);

        let mut unmeasured = ReelsFeed::new(5, 0.0, PlaybackConfig::default());
        assert_eq!(unmeasured.on_scroll(800.0), None);
    }

    #[test]
    fn test_set_len_keeps_index_in_range() {
        let mut feed = feed(10);
        feed.on_scroll(8.0 * 800.0);
        assert_eq!(feed.set_len(20), None);
        assert_eq!(feed.set_len(4), Some(3));
        assert_eq!(feed.current_index(), 3);
        assert_eq!(feed.set_len(0), Some(0));
    }
}
