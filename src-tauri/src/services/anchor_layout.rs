//! Placement of the chat surfaces relative to the pet window.
//!
//! All values are logical pixels in desktop coordinates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn clamp(self, min: Size, max: Size) -> Size {
        Size {
            width: self.width.clamp(min.width, max.width),
            height: self.height.clamp(min.height, max.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width * 0.5
    }
}

/// Center `panel` horizontally above `anchor`, leaving `gap` between them.
pub fn place_above(anchor: Rect, panel: Size, gap: f64) -> Point {
    Point {
        x: (anchor.center_x() - panel.width * 0.5).round(),
        y: anchor.top - panel.height - gap,
    }
}

/// Center `panel` horizontally below `anchor`, leaving `gap` between them.
pub fn place_below(anchor: Rect, panel: Size, gap: f64) -> Point {
    Point {
        x: (anchor.center_x() - panel.width * 0.5).round(),
        y: anchor.bottom() + gap,
    }
}

/// Top-right placement next to `anchor`, shifted by `jitter`.
pub fn place_beside(anchor: Rect, gap: f64, jitter: (i32, i32)) -> Point {
    Point {
        x: anchor.right() + gap + jitter.0 as f64,
        y: anchor.top + jitter.1 as f64,
    }
}
