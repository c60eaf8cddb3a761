use tauri::{AppHandle, State};

use crate::error::PetError;
use crate::services::anchor_layout::Size;
use crate::services::bubble::prepare_input;
use crate::services::chat::ChatService;
use crate::services::pet::{DisplayMode, PetState};
use crate::services::subtitle::{SubtitleManager, DEFAULT_INTERVAL};

/// Send from the subtitle input and play the reply as captions.
///
/// A reply that arrives after the subtitles were dismissed, or after a switch
/// to bubble mode, is logged and dropped.
#[tauri::command]
pub async fn subtitle_send(
    app: AppHandle,
    chat: State<'_, ChatService>,
    pet: State<'_, PetState>,
    subtitles: State<'_, SubtitleManager>,
    text: String,
) -> Result<Option<String>, PetError> {
    let Some(text) = prepare_input(&text) else {
        return Ok(None);
    };

    let session = subtitles.session();
    let reply = chat.send(&text).await;

    let still_subtitles = pet.lock()?.mode() == DisplayMode::Subtitle;
    if !still_subtitles || !subtitles.show_reply(&app, session, &reply, DEFAULT_INTERVAL) {
        log::info!("Subtitles dismissed before the reply arrived; dropping it");
    }
    Ok(Some(reply))
}

#[tauri::command]
pub fn subtitle_hide(app: AppHandle, subtitles: State<'_, SubtitleManager>) {
    subtitles.hide(&app);
}

/// The input page reports its laid-out size so it can be kept centered.
#[tauri::command]
pub fn subtitle_input_resized(
    app: AppHandle,
    subtitles: State<'_, SubtitleManager>,
    width: f64,
    height: f64,
) -> Result<(), PetError> {
    if !(width > 0.0 && height > 0.0) {
        return Err(PetError::invalid_input(format!(
            "Invalid input size {width}x{height}"
        )));
    }
    subtitles.set_input_size(&app, Size::new(width, height));
    Ok(())
}
