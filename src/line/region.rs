//! Screen geometry shared by hit-testing and outside-click detection

use ratatui::layout::{Position, Rect};

/// A text selection made by dragging across the viewer, in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    /// Build a range from drag anchor and head, whichever way the drag went
    pub fn new(anchor: Position, head: Position) -> Self {
        if (anchor.y, anchor.x) <= (head.y, head.x) {
            Self {
                start: anchor,
                end: head,
            }
        } else {
            Self {
                start: head,
                end: anchor,
            }
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether any cell covered by the range lies inside `area`
    ///
    /// The range covers cells row by row: from `start` to the end of its
    /// row, every full row in between, then up to and including `end`.
    pub fn intersects(&self, area: Rect) -> bool {
        if area.is_empty() {
            return false;
        }
        let top = area.y.max(self.start.y);
        let bottom = (area.bottom() - 1).min(self.end.y);

        (top..=bottom).any(|row| {
            let from = if row == self.start.y { self.start.x } else { 0 };
            let to = if row == self.end.y { self.end.x } else { u16::MAX };
            from < area.right() && to >= area.x
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(a: (u16, u16), b: (u16, u16)) -> TextRange {
        TextRange::new(Position::new(a.0, a.1), Position::new(b.0, b.1))
    }

    #[test]
    fn test_new_orders_endpoints() {
        let r = range((5, 3), (2, 1));
        assert_eq!(r.start, Position::new(2, 1));
        assert_eq!(r.end, Position::new(5, 3));
    }

    #[test]
    fn test_multi_row_range_covers_middle_rows() {
        let area = Rect::new(10, 4, 20, 2);
        assert!(range((50, 2), (0, 6)).intersects(area));
        assert!(range((0, 0), (0, 9)).intersects(area));
    }

    #[test]
    fn test_single_row_range_outside_columns() {
        let area = Rect::new(10, 4, 20, 1);
        assert!(!range((0, 4), (9, 4)).intersects(area));
        assert!(!range((30, 4), (40, 4)).intersects(area));
        assert!(range((9, 4), (10, 4)).intersects(area));
    }

    #[test]
    fn test_range_ending_before_area_row() {
        let area = Rect::new(0, 4, 20, 2);
        assert!(!range((0, 0), (50, 3)).intersects(area));
        // starts after the last column of the last row
        assert!(!range((20, 5), (5, 7)).intersects(area));
    }

    #[test]
    fn test_empty_area_never_intersects() {
        assert!(!range((0, 0), (10, 10)).intersects(Rect::new(2, 2, 0, 3)));
    }
}
