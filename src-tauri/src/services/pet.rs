//! Pet window controller: drag handling, display mode and bubble ownership.
//!
//! Pure state; the command layer applies the returned actions to windows.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use super::anchor_layout::{Point, Rect, Size};
use super::bubble::BubbleState;
use crate::error::PetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Bubble,
    Subtitle,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Bubble => DisplayMode::Subtitle,
            DisplayMode::Subtitle => DisplayMode::Bubble,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer position relative to the window origin at press time.
    Dragging { offset: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Bubble,
    Subtitle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChatAction {
    ShowBubble { at: Point },
    HideBubble,
    ShowSubtitleInput,
    HideSubtitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeToggle {
    pub mode: DisplayMode,
    pub hide: Vec<Surface>,
}

pub struct PetController {
    position: Point,
    size: Size,
    drag: DragState,
    mode: DisplayMode,
    bubble: BubbleState,
}

impl PetController {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            drag: DragState::Idle,
            mode: DisplayMode::Bubble,
            bubble: BubbleState::default(),
        }
    }

    pub fn anchor(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn bubble(&self) -> &BubbleState {
        &self.bubble
    }

    pub fn bubble_mut(&mut self) -> &mut BubbleState {
        &mut self.bubble
    }

    pub fn press(&mut self, pointer: Point) {
        self.drag = DragState::Dragging {
            offset: pointer.offset_from(self.position),
        };
    }

    /// Where the window goes for this pointer position, if a drag is active.
    pub fn drag_to(&mut self, pointer: Point) -> Option<Point> {
        let DragState::Dragging { offset } = self.drag else {
            return None;
        };
        self.position = pointer.offset_from(offset);
        Some(self.position)
    }

    pub fn release(&mut self) {
        self.drag = DragState::Idle;
    }

    /// The visible surface that has to follow the pet when it moves.
    pub fn follower(&self, subtitle_visible: bool) -> Option<Surface> {
        if self.bubble.is_visible() {
            Some(Surface::Bubble)
        } else if subtitle_visible {
            Some(Surface::Subtitle)
        } else {
            None
        }
    }

    /// Open (or dismiss) the chat surface of the current mode.
    pub fn open_chat(&mut self, subtitle_visible: bool) -> ChatAction {
        match self.mode {
            DisplayMode::Bubble => {
                if self.bubble.is_visible() {
                    self.bubble.set_visible(false);
                    ChatAction::HideBubble
                } else {
                    self.bubble.set_visible(true);
                    ChatAction::ShowBubble {
                        at: self.bubble.position_near(self.anchor()),
                    }
                }
            }
            DisplayMode::Subtitle => {
                if subtitle_visible {
                    ChatAction::HideSubtitle
                } else {
                    ChatAction::ShowSubtitleInput
                }
            }
        }
    }

    /// Switch modes, hiding every surface that is currently up.
    pub fn toggle_mode(&mut self, subtitle_visible: bool) -> ModeToggle {
        let mut hide = Vec::new();
        if self.bubble.is_visible() {
            self.bubble.set_visible(false);
            hide.push(Surface::Bubble);
        }
        if subtitle_visible {
            hide.push(Surface::Subtitle);
        }
        self.mode = self.mode.toggled();
        ModeToggle {
            mode: self.mode,
            hide,
        }
    }
}

/// Managed wrapper around the controller.
pub struct PetState(Mutex<PetController>);

impl PetState {
    pub fn new(controller: PetController) -> Self {
        Self(Mutex::new(controller))
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, PetController>, PetError> {
        self.0
            .lock()
            .map_err(|_| PetError::internal("Pet state lock poisoned"))
    }
}
