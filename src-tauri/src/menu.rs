//! Pet context menu and the app-wide menu event dispatch (tray included).

use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    AppHandle,
};

use crate::windows::{pet_window, surfaces};

pub(crate) const PET_CHAT: &str = "pet_chat";
pub(crate) const PET_TOGGLE_MODE: &str = "pet_toggle_mode";
pub(crate) const PET_HIDE: &str = "pet_hide";
pub(crate) const PET_QUIT: &str = "pet_quit";

pub(crate) const TRAY_SHOW: &str = "tray_show";
pub(crate) const TRAY_HIDE: &str = "tray_hide";
pub(crate) const TRAY_SETTINGS: &str = "tray_settings";
pub(crate) const TRAY_QUIT: &str = "tray_quit";

pub(crate) fn build_pet_menu(app: &AppHandle) -> tauri::Result<Menu<tauri::Wry>> {
    let chat_i = MenuItem::with_id(app, PET_CHAT, "对话", true, None::<&str>)?;
    let toggle_i = MenuItem::with_id(app, PET_TOGGLE_MODE, "切换模式", true, None::<&str>)?;
    let hide_i = MenuItem::with_id(app, PET_HIDE, "隐藏", true, None::<&str>)?;
    let quit_i = MenuItem::with_id(app, PET_QUIT, "退出", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;
    Menu::with_items(app, &[&chat_i, &toggle_i, &hide_i, &sep, &quit_i])
}

pub(crate) fn handle_menu_event(app: &AppHandle, id: &str) {
    match id {
        PET_CHAT => {
            if let Err(err) = pet_window::open_chat(app) {
                log::warn!("Failed to open chat: {}", err);
            }
        }
        PET_TOGGLE_MODE => {
            if let Err(err) = pet_window::toggle_mode(app) {
                log::warn!("Failed to switch display mode: {}", err);
            }
        }
        PET_HIDE | TRAY_HIDE => {
            let _ = pet_window::hide_pet(app);
        }
        TRAY_SHOW => {
            let _ = pet_window::show_pet(app);
        }
        TRAY_SETTINGS => {
            // Window creation from the event loop thread can deadlock on
            // Windows; hand it to the async runtime.
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(err) = surfaces::open_settings_window(&app) {
                    log::warn!("Failed to open settings: {}", err);
                }
            });
        }
        PET_QUIT | TRAY_QUIT => {
            log::info!("Quit requested from menu");
            app.exit(0);
        }
        _ => {}
    }
}
