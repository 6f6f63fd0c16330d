//! Pointer input mapping
//!
//! Browsers report pointer positions in client space (origin top-left, y
//! down). The simulation works in page space: origin at the bottom-left of
//! the viewport, y up, so the floor the pet walks on is `y = 0`.

use glam::Vec2;

/// Minimum pointer travel (px) before a press counts as a drag
pub const DRAG_THRESHOLD: f32 = 4.0;

/// Convert a client-space pointer position to page space
#[inline]
pub fn page_point(client_x: f32, client_y: f32, viewport_height: f32) -> Vec2 {
    Vec2::new(client_x, viewport_height - client_y)
}

/// Recognizes press-move-release drags. A release that travelled less than
/// `DRAG_THRESHOLD` is a click and yields nothing.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    start: Option<Vec2>,
    travelled: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.travelled
    }

    pub fn press(&mut self, pos: Vec2) {
        self.start = Some(pos);
        self.travelled = false;
    }

    pub fn moved(&mut self, pos: Vec2) {
        if let Some(start) = self.start {
            if start.distance(pos) >= DRAG_THRESHOLD {
                self.travelled = true;
            }
        }
    }

    /// Finish the gesture, returning the drop point for a completed drag
    pub fn release(&mut self, pos: Vec2) -> Option<Vec2> {
        self.moved(pos);
        let dropped = self.travelled.then_some(pos);
        self.start = None;
        self.travelled = false;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_point_flips_y() {
        assert_eq!(page_point(10.0, 0.0, 800.0), Vec2::new(10.0, 800.0));
        assert_eq!(page_point(10.0, 800.0, 800.0), Vec2::new(10.0, 0.0));
        assert_eq!(page_point(5.0, 300.0, 800.0), Vec2::new(5.0, 500.0));
    }

    #[test]
    fn test_click_is_not_a_drag() {
        let mut drag = DragTracker::new();
        drag.press(Vec2::new(100.0, 100.0));
        drag.moved(Vec2::new(101.0, 101.0));
        assert!(!drag.is_dragging());
        assert_eq!(drag.release(Vec2::new(101.0, 100.0)), None);
    }

    #[test]
    fn test_drag_release_yields_drop_point() {
        let mut drag = DragTracker::new();
        drag.press(Vec2::new(100.0, 100.0));
        drag.moved(Vec2::new(150.0, 120.0));
        assert!(drag.is_dragging());
        assert_eq!(drag.release(Vec2::new(160.0, 130.0)), Some(Vec2::new(160.0, 130.0)));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_release_without_press() {
        let mut drag = DragTracker::new();
        assert_eq!(drag.release(Vec2::new(10.0, 10.0)), None);
    }
}
