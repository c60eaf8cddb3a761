//! Window labels and geometry helpers shared by the pet and its surfaces.

pub mod pet_window;
pub mod surfaces;

use tauri::{LogicalPosition, LogicalSize, WebviewWindow};

use crate::services::anchor_layout::{Point, Rect, Size};

pub const PET_LABEL: &str = "pet";
pub const BUBBLE_LABEL: &str = "bubble";
pub const CAPTION_LABEL: &str = "subtitle";
pub const INPUT_LABEL: &str = "subtitle-input";
pub const SETTINGS_LABEL: &str = "settings";

/// Outer frame of `window` in logical pixels.
pub(crate) fn logical_rect(window: &WebviewWindow) -> Option<Rect> {
    let scale = window.scale_factor().ok()?;
    let pos = window.outer_position().ok()?.to_logical::<f64>(scale);
    let size = window.outer_size().ok()?.to_logical::<f64>(scale);
    Some(Rect::new(
        Point::new(pos.x, pos.y),
        Size::new(size.width, size.height),
    ))
}

pub(crate) fn move_to(window: &WebviewWindow, point: Point) {
    let _ = window.set_position(tauri::Position::Logical(LogicalPosition {
        x: point.x,
        y: point.y,
    }));
}

pub(crate) fn resize_to(window: &WebviewWindow, size: Size) {
    let _ = window.set_size(tauri::Size::Logical(LogicalSize {
        width: size.width,
        height: size.height,
    }));
}
