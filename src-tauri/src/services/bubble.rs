//! Bubble chat panel: transcript plus the edge-drag resize gesture.

use serde::Serialize;

use super::anchor_layout::{place_above, Point, Rect, Size};

pub const DEFAULT_SIZE: Size = Size {
    width: 300.0,
    height: 200.0,
};
pub const MIN_SIZE: Size = Size {
    width: 250.0,
    height: 150.0,
};
pub const MAX_SIZE: Size = Size {
    width: 600.0,
    height: 500.0,
};
/// Distance from the right/bottom edge that starts a resize.
pub const RESIZE_EDGE: f64 = 10.0;
pub const ANCHOR_GAP: f64 = 10.0;

pub const USER_LABEL: &str = "你";
pub const FALLBACK_PET_NAME: &str = "宠物";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    Default,
    Horizontal,
    Vertical,
    Diagonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeHit {
    pub right: bool,
    pub bottom: bool,
}

impl EdgeHit {
    pub fn any(&self) -> bool {
        self.right || self.bottom
    }

    pub fn cursor(&self) -> CursorHint {
        match (self.right, self.bottom) {
            (true, true) => CursorHint::Diagonal,
            (true, false) => CursorHint::Horizontal,
            (false, true) => CursorHint::Vertical,
            (false, false) => CursorHint::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResizeGesture {
    Idle,
    Resizing { start: Point, origin: Size },
}

#[derive(Debug, Clone)]
pub struct BubbleState {
    size: Size,
    visible: bool,
    gesture: ResizeGesture,
    transcript: Vec<String>,
}

impl Default for BubbleState {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            visible: false,
            gesture: ResizeGesture::Idle,
            transcript: Vec::new(),
        }
    }
}

impl BubbleState {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.gesture = ResizeGesture::Idle;
        }
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, ResizeGesture::Resizing { .. })
    }

    /// `local` is relative to the bubble's top-left corner.
    pub fn hit_test(&self, local: Point) -> EdgeHit {
        EdgeHit {
            right: self.size.width - local.x < RESIZE_EDGE,
            bottom: self.size.height - local.y < RESIZE_EDGE,
        }
    }

    /// Begin a resize if the press lands on an edge. Returns whether it did.
    pub fn pointer_down(&mut self, local: Point, screen: Point) -> bool {
        if !self.hit_test(local).any() {
            return false;
        }
        self.gesture = ResizeGesture::Resizing {
            start: screen,
            origin: self.size,
        };
        true
    }

    /// New size while a resize is in progress, clamped to the bubble bounds.
    pub fn pointer_move(&mut self, screen: Point) -> Option<Size> {
        let ResizeGesture::Resizing { start, origin } = self.gesture else {
            return None;
        };
        let delta = screen.offset_from(start);
        let next = Size::new(origin.width + delta.x, origin.height + delta.y)
            .clamp(MIN_SIZE, MAX_SIZE);
        self.size = next;
        Some(next)
    }

    pub fn pointer_up(&mut self) {
        self.gesture = ResizeGesture::Idle;
    }

    /// Sync with a size the window system applied on its own.
    pub fn set_size(&mut self, size: Size) {
        self.size = size.clamp(MIN_SIZE, MAX_SIZE);
    }

    pub fn position_near(&self, anchor: Rect) -> Point {
        place_above(anchor, self.size, ANCHOR_GAP)
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn push_user(&mut self, text: &str) -> String {
        let line = format!("{USER_LABEL}: {text}");
        self.transcript.push(line.clone());
        line
    }

    pub fn push_reply(&mut self, pet_name: &str, reply: &str) -> String {
        let name = if pet_name.trim().is_empty() {
            FALLBACK_PET_NAME
        } else {
            pet_name
        };
        let line = format!("{name}: {reply}");
        self.transcript.push(line.clone());
        line
    }
}

/// Trimmed message, or `None` if there is nothing to send.
pub fn prepare_input(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_detected_within_margin() {
        let bubble = BubbleState::default();
        assert!(!bubble.hit_test(Point::new(150.0, 100.0)).any());
        assert_eq!(bubble.hit_test(Point::new(295.0, 20.0)).cursor(), CursorHint::Horizontal);
        assert_eq!(bubble.hit_test(Point::new(20.0, 195.0)).cursor(), CursorHint::Vertical);
        assert_eq!(bubble.hit_test(Point::new(291.0, 191.0)).cursor(), CursorHint::Diagonal);
        // Exactly RESIZE_EDGE away is outside the margin.
        assert!(!bubble.hit_test(Point::new(290.0, 20.0)).any());
    }

    #[test]
    fn resize_follows_drag_delta() {
        let mut bubble = BubbleState::default();
        assert!(bubble.pointer_down(Point::new(295.0, 195.0), Point::new(500.0, 500.0)));
        assert!(bubble.is_resizing());

        assert_eq!(
            bubble.pointer_move(Point::new(540.0, 530.0)),
            Some(Size::new(340.0, 230.0))
        );
        // Delta is measured from the press, not the previous move.
        assert_eq!(
            bubble.pointer_move(Point::new(520.0, 510.0)),
            Some(Size::new(320.0, 210.0))
        );

        bubble.pointer_up();
        assert!(!bubble.is_resizing());
        assert_eq!(bubble.pointer_move(Point::new(900.0, 900.0)), None);
        assert_eq!(bubble.size(), Size::new(320.0, 210.0));
    }

    #[test]
    fn resize_is_clamped() {
        let mut bubble = BubbleState::default();
        bubble.pointer_down(Point::new(299.0, 100.0), Point::new(0.0, 0.0));
        assert_eq!(bubble.pointer_move(Point::new(-500.0, -500.0)), Some(MIN_SIZE));
        assert_eq!(bubble.pointer_move(Point::new(1000.0, 1000.0)), Some(MAX_SIZE));
    }

    #[test]
    fn press_away_from_edges_does_not_resize() {
        let mut bubble = BubbleState::default();
        assert!(!bubble.pointer_down(Point::new(100.0, 100.0), Point::new(0.0, 0.0)));
        assert_eq!(bubble.pointer_move(Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn transcript_lines_use_pet_name() {
        let mut bubble = BubbleState::default();
        assert_eq!(bubble.push_user("在吗"), "你: 在吗");
        assert_eq!(bubble.push_reply("gmds", "在的！"), "gmds: 在的！");
        assert_eq!(bubble.push_reply("  ", "嗯"), "宠物: 嗯");
        assert_eq!(bubble.transcript().len(), 3);
    }

    #[test]
    fn blank_input_is_ignored() {
        assert_eq!(prepare_input("  hi  "), Some("hi".to_string()));
        assert_eq!(prepare_input(" \t "), None);
    }

    #[test]
    fn sits_centered_above_anchor() {
        let bubble = BubbleState::default();
        let anchor = Rect::new(Point::new(400.0, 600.0), Size::new(200.0, 200.0));
        assert_eq!(bubble.position_near(anchor), Point::new(350.0, 390.0));
    }

    #[test]
    fn user_line_is_recorded_before_any_reply() {
        let mut bubble = BubbleState::default();
        let line = bubble.push_user("在吗");
        assert_eq!(bubble.transcript(), &[line]);
    }
}
