use tauri::{AppHandle, Manager, State};
use tauri_plugin_dialog::DialogExt;

use crate::error::PetError;
use crate::services::chat::ChatService;
use crate::services::config::{Settings, SettingsState};
use crate::tray;
use crate::windows::{pet_window, surfaces};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[tauri::command]
pub fn settings_get(settings: State<'_, SettingsState>) -> Result<Settings, PetError> {
    settings.snapshot()
}

/// Persist and apply new settings, then close the dialog.
#[tauri::command]
pub async fn settings_save(app: AppHandle, settings: Settings) -> Result<(), PetError> {
    apply_settings(&app, settings)?;
    surfaces::close_settings_window(&app);
    Ok(())
}

#[tauri::command]
pub fn settings_cancel(app: AppHandle) {
    surfaces::close_settings_window(&app);
}

/// Native picker for the sprite; `None` when the user cancels.
#[tauri::command]
pub async fn settings_pick_image(app: AppHandle) -> Result<Option<String>, PetError> {
    let picked = tauri::async_runtime::spawn_blocking(move || {
        app.dialog()
            .file()
            .set_title("选择宠物图片")
            .add_filter("图片文件", IMAGE_EXTENSIONS)
            .blocking_pick_file()
    })
    .await?;

    let Some(file) = picked else {
        return Ok(None);
    };
    let path = file
        .into_path()
        .map_err(|e| PetError::invalid_input(e.to_string()))?;
    Ok(Some(path.to_string_lossy().into_owned()))
}

fn apply_settings(app: &AppHandle, next: Settings) -> Result<(), PetError> {
    app.state::<SettingsState>().replace(next.clone())?;
    log::info!(
        "Settings saved (pet_name={}, model={}, api_url={})",
        next.pet_name,
        next.model,
        next.api_url
    );

    if !next.pet_image.trim().is_empty() {
        if let Err(err) = pet_window::apply_sprite(app, &next.pet_image) {
            log::warn!("Keeping previous sprite: {}", err);
        }
    }

    app.state::<ChatService>().configure(&next);
    tray::update_tooltip(app, &next);
    Ok(())
}
