use tauri::{Manager, WindowEvent};

mod commands;
mod error;
mod menu;
pub mod services;
mod tray;
mod windows;

use crate::commands::{bubble_commands, pet_commands, settings_commands, subtitle_commands};
use crate::services::anchor_layout::{Point, Size};
use crate::services::chat::{self, ChatService};
use crate::services::config::{ConfigStore, SettingsState};
use crate::services::paths;
use crate::services::pet::{PetController, PetState};
use crate::services::subtitle::SubtitleManager;
use crate::windows::{pet_window, surfaces, BUBBLE_LABEL, INPUT_LABEL, PET_LABEL, SETTINGS_LABEL};

pub use crate::error::PetError;

const DEFAULT_PET_SIZE: Size = Size {
    width: 200.0,
    height: 200.0,
};

pub fn run() {
    let settings_path = paths::settings_path().unwrap_or_else(|err| {
        eprintln!("[desk-pet] {}; using ./data/settings.json", err);
        std::path::PathBuf::from("data").join("settings.json")
    });
    let settings_state = SettingsState::load(ConfigStore::new(settings_path));
    let initial = settings_state.snapshot().unwrap_or_default();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_dialog::init())
        .manage(ChatService::new(&initial))
        .manage(settings_state)
        .manage(PetState::new(PetController::new(
            Point::new(0.0, 0.0),
            DEFAULT_PET_SIZE,
        )))
        .manage(SubtitleManager::new())
        .invoke_handler(tauri::generate_handler![
            pet_commands::pet_pointer_down,
            pet_commands::pet_pointer_move,
            pet_commands::pet_pointer_up,
            pet_commands::pet_open_chat,
            pet_commands::pet_toggle_mode,
            pet_commands::pet_display_mode,
            pet_commands::pet_context_menu,
            pet_commands::pet_sprite,
            bubble_commands::bubble_send,
            bubble_commands::bubble_transcript,
            bubble_commands::bubble_pointer_down,
            bubble_commands::bubble_pointer_move,
            bubble_commands::bubble_pointer_up,
            subtitle_commands::subtitle_send,
            subtitle_commands::subtitle_hide,
            subtitle_commands::subtitle_input_resized,
            settings_commands::settings_get,
            settings_commands::settings_save,
            settings_commands::settings_cancel,
            settings_commands::settings_pick_image,
            chat::service::chat_clear_history,
        ])
        .on_menu_event(|app, event| menu::handle_menu_event(app, event.id().as_ref()))
        .on_window_event(|window, event| match event {
            WindowEvent::Moved(_) | WindowEvent::Resized(_) if window.label() == PET_LABEL => {
                pet_window::follow_pet(window.app_handle());
            }
            // Only the settings dialog really closes; everything else hides.
            WindowEvent::CloseRequested { api, .. } if window.label() != SETTINGS_LABEL => {
                api.prevent_close();
                let _ = window.hide();
                match window.label() {
                    BUBBLE_LABEL => {
                        if let Ok(mut pet) = window.state::<PetState>().lock() {
                            pet.bubble_mut().set_visible(false);
                        }
                    }
                    INPUT_LABEL => window.state::<SubtitleManager>().hide(window.app_handle()),
                    _ => {}
                }
            }
            _ => {}
        })
        .setup(move |app| {
            tray::setup_tray(app)?;
            surfaces::create_surfaces(app.handle())?;

            if let Err(err) = pet_window::apply_sprite(app.handle(), &initial.pet_image) {
                log::warn!("Pet sprite unavailable, keeping default size: {}", err);
            }
            pet_window::follow_pet(app.handle());
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
