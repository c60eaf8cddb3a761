use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter, Manager, State};

use crate::error::PetError;
use crate::services::anchor_layout::Point;
use crate::services::bubble::{prepare_input, CursorHint};
use crate::services::chat::ChatService;
use crate::services::config::SettingsState;
use crate::services::pet::PetState;
use crate::windows::{self, BUBBLE_LABEL};

pub const EVT_BUBBLE_LINE: &str = "bubble-line";

/// The two transcript lines produced by one exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleTurn {
    pub user_line: String,
    pub reply_line: String,
}

/// Pointer in both bubble-local and desktop coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubblePointerArgs {
    pub local_x: f64,
    pub local_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
}

impl BubblePointerArgs {
    fn local(&self) -> Point {
        Point::new(self.local_x, self.local_y)
    }

    fn screen(&self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }
}

/// Send a message from the bubble. Blank input is a no-op (`None`).
///
/// The user line is pushed to the page right away; the reply line comes back
/// as the result.
#[tauri::command]
pub async fn bubble_send(
    app: AppHandle,
    pet: State<'_, PetState>,
    chat: State<'_, ChatService>,
    settings: State<'_, SettingsState>,
    text: String,
) -> Result<Option<BubbleTurn>, PetError> {
    let Some(text) = prepare_input(&text) else {
        return Ok(None);
    };

    let user_line = pet.lock()?.bubble_mut().push_user(&text);
    let _ = app.emit_to(BUBBLE_LABEL, EVT_BUBBLE_LINE, user_line.clone());
    let reply = chat.send(&text).await;
    let pet_name = settings.snapshot()?.pet_name;
    let reply_line = pet.lock()?.bubble_mut().push_reply(&pet_name, &reply);

    Ok(Some(BubbleTurn {
        user_line,
        reply_line,
    }))
}

#[tauri::command]
pub fn bubble_transcript(pet: State<'_, PetState>) -> Result<Vec<String>, PetError> {
    Ok(pet.lock()?.bubble().transcript().to_vec())
}

#[tauri::command]
pub fn bubble_pointer_down(
    pet: State<'_, PetState>,
    args: BubblePointerArgs,
) -> Result<bool, PetError> {
    Ok(pet.lock()?.bubble_mut().pointer_down(args.local(), args.screen()))
}

/// Resize while the gesture is active; always reports the cursor to show.
#[tauri::command]
pub fn bubble_pointer_move(
    app: AppHandle,
    pet: State<'_, PetState>,
    args: BubblePointerArgs,
) -> Result<CursorHint, PetError> {
    let (hint, resized) = {
        let mut pet = pet.lock()?;
        let bubble = pet.bubble_mut();
        let resized = bubble.pointer_move(args.screen());
        (bubble.hit_test(args.local()).cursor(), resized)
    };

    if let Some(size) = resized {
        if let Some(window) = app.get_webview_window(BUBBLE_LABEL) {
            windows::resize_to(&window, size);
        }
    }
    Ok(hint)
}

#[tauri::command]
pub fn bubble_pointer_up(pet: State<'_, PetState>) -> Result<(), PetError> {
    pet.lock()?.bubble_mut().pointer_up();
    Ok(())
}
