// Viewport scrolling for the transcript
//
// ScrollState tracks the row offset of the viewport over the rendered lines.
// PendingScroll is the viewer's side of the ScrollCoordinator seam: line
// components (and translation tasks running off the UI thread) leave a
// request there, and the viewer applies it on the next frame.

use crate::scroll::{ScrollCoordinator, ScrollOptions};
use parking_lot::Mutex;

/// Scroll state for the transcript viewport
///
/// All quantities are terminal rows.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Row at the top of the viewport
    offset: usize,

    /// Rows of rendered content
    total: usize,

    /// Rows visible at once
    viewport: usize,

    /// Where an animated scroll is heading
    target: Option<usize>,

    /// Edge the viewport sticks to while new lines arrive
    follow: Option<Edge>,
}

/// End of the transcript holding the newest line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update content and viewport size; call once per frame before drawing
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        match self.follow {
            Some(edge) if self.target.is_none() => self.offset = self.edge_offset(edge),
            _ => self.offset = self.offset.min(self.max_offset()),
        }
        if let Some(target) = self.target.as_mut() {
            *target = (*target).min(self.total.saturating_sub(self.viewport));
        }
    }

    /// Bring the newest line into view as requested by a line
    pub fn request(&mut self, options: ScrollOptions) {
        tracing::trace!(
            orientation = ?options.orientation,
            animate = options.animate,
            reversed = options.reversed,
            "Scrolling to newest line"
        );
        let edge = if options.reversed {
            Edge::Top
        } else {
            Edge::Bottom
        };
        self.follow = Some(edge);

        let target = self.edge_offset(edge);
        if options.animate {
            self.target = Some(target);
        } else {
            self.offset = target;
            self.target = None;
        }
    }

    /// Advance an animated scroll by one frame
    ///
    /// Covers a third of the remaining distance, at least one row.
    pub fn step(&mut self) {
        let Some(target) = self.target else {
            return;
        };
        let distance = target.abs_diff(self.offset);
        let stride = distance.div_ceil(3).max(1).min(distance);
        if target > self.offset {
            self.offset += stride;
        } else {
            self.offset -= stride;
        }
        if self.offset == target {
            self.target = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Scroll up by `rows`; the user has taken over
    pub fn scroll_up(&mut self, rows: usize) {
        self.user_scrolled();
        self.offset = self.offset.saturating_sub(rows);
    }

    /// Scroll down by `rows`; the user has taken over
    pub fn scroll_down(&mut self, rows: usize) {
        self.user_scrolled();
        self.offset = (self.offset + rows).min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.max(1));
    }

    fn user_scrolled(&mut self) {
        self.target = None;
        self.follow = None;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn edge_offset(&self, edge: Edge) -> usize {
        match edge {
            Edge::Top => 0,
            Edge::Bottom => self.max_offset(),
        }
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

/// Latest scroll request from any line, applied once per frame
#[derive(Default)]
pub struct PendingScroll(Mutex<Option<ScrollOptions>>);

impl PendingScroll {
    pub fn take(&self) -> Option<ScrollOptions> {
        self.0.lock().take()
    }
}

impl ScrollCoordinator for PendingScroll {
    fn scroll_to_newest(&self, options: ScrollOptions) {
        *self.0.lock() = Some(options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::Orientation;

    fn options(animate: bool, reversed: bool) -> ScrollOptions {
        ScrollOptions {
            orientation: Orientation::Horizontal,
            animate,
            reversed,
        }
    }

    #[test]
    fn test_jump_to_bottom_and_follow_growth() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);
        scroll.request(options(false, false));
        assert_eq!(scroll.offset(), 15);

        scroll.update_dimensions(30, 5);
        assert_eq!(scroll.offset(), 25);
    }

    #[test]
    fn test_reversed_order_targets_top() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);
        scroll.scroll_down(10);
        scroll.request(options(false, true));
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_animation_converges() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(40, 10);
        scroll.request(options(true, false));
        assert_eq!(scroll.offset(), 0);
        assert!(scroll.is_animating());

        scroll.step();
        assert_eq!(scroll.offset(), 10);
        for _ in 0..20 {
            scroll.step();
        }
        assert_eq!(scroll.offset(), 30);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_user_scroll_cancels_follow() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);
        scroll.request(options(true, false));
        scroll.scroll_up(1);
        assert!(!scroll.is_animating());

        let offset = scroll.offset();
        scroll.update_dimensions(30, 5);
        assert_eq!(scroll.offset(), offset);
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(12, 5);
        scroll.page_down();
        scroll.page_down();
        assert_eq!(scroll.offset(), 7);
        scroll.page_up();
        scroll.page_up();
        assert_eq!(scroll.offset(), 0);
    }

    #[test]
    fn test_pending_scroll_keeps_latest_request() {
        let pending = PendingScroll::default();
        pending.scroll_to_newest(options(true, false));
        pending.scroll_to_newest(options(false, true));
        assert_eq!(pending.take(), Some(options(false, true)));
        assert_eq!(pending.take(), None);
    }
}
