use serde::Deserialize;
use tauri::{AppHandle, Manager, State};

use crate::error::PetError;
use crate::menu;
use crate::services::anchor_layout::Point;
use crate::services::config::SettingsState;
use crate::services::pet::{DisplayMode, PetState};
use crate::windows::{self, pet_window, PET_LABEL};

/// Pointer position in desktop logical pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenPointArgs {
    pub screen_x: f64,
    pub screen_y: f64,
}

impl ScreenPointArgs {
    fn point(self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }
}

#[tauri::command]
pub fn pet_pointer_down(pet: State<'_, PetState>, args: ScreenPointArgs) -> Result<(), PetError> {
    pet.lock()?.press(args.point());
    Ok(())
}

#[tauri::command]
pub fn pet_pointer_move(
    app: AppHandle,
    pet: State<'_, PetState>,
    args: ScreenPointArgs,
) -> Result<(), PetError> {
    let Some(target) = pet.lock()?.drag_to(args.point()) else {
        return Ok(());
    };
    if let Some(window) = app.get_webview_window(PET_LABEL) {
        windows::move_to(&window, target);
    }
    Ok(())
}

#[tauri::command]
pub fn pet_pointer_up(pet: State<'_, PetState>) -> Result<(), PetError> {
    pet.lock()?.release();
    Ok(())
}

/// Double-click on the pet.
#[tauri::command]
pub async fn pet_open_chat(app: AppHandle) -> Result<(), PetError> {
    pet_window::open_chat(&app)
}

#[tauri::command]
pub async fn pet_toggle_mode(app: AppHandle) -> Result<DisplayMode, PetError> {
    pet_window::toggle_mode(&app)
}

#[tauri::command]
pub fn pet_display_mode(pet: State<'_, PetState>) -> Result<DisplayMode, PetError> {
    Ok(pet.lock()?.mode())
}

#[tauri::command]
pub fn pet_context_menu(app: AppHandle, window: tauri::Window) -> Result<(), PetError> {
    let context_menu = menu::build_pet_menu(&app)?;
    window.popup_menu(&context_menu)?;
    Ok(())
}

/// Sprite for the pet page to render on load.
#[tauri::command]
pub async fn pet_sprite(
    app: AppHandle,
    settings: State<'_, SettingsState>,
) -> Result<pet_window::PetSprite, PetError> {
    let pet_image = settings.snapshot()?.pet_image;
    pet_window::apply_sprite(&app, &pet_image)
}
