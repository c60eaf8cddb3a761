use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle,
};

use crate::menu;
use crate::services::config::Settings;
use crate::windows::pet_window;

pub(crate) const TRAY_ID: &str = "pet-tray";
pub(crate) const DEFAULT_TOOLTIP: &str = "桌面宠物";

pub(crate) fn setup_tray(app: &tauri::App) -> tauri::Result<()> {
    let show_i = MenuItem::with_id(app, menu::TRAY_SHOW, "显示宠物", true, None::<&str>)?;
    let hide_i = MenuItem::with_id(app, menu::TRAY_HIDE, "隐藏宠物", true, None::<&str>)?;
    let settings_i = MenuItem::with_id(app, menu::TRAY_SETTINGS, "设置", true, None::<&str>)?;
    let quit_i = MenuItem::with_id(app, menu::TRAY_QUIT, "退出", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;
    let tray_menu = Menu::with_items(app, &[&show_i, &hide_i, &settings_i, &sep, &quit_i])?;
    let icon = app.default_window_icon().cloned();

    // Menu clicks go through the app-wide handler registered in `run`.
    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip(DEFAULT_TOOLTIP)
        .menu(&tray_menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                if let Err(err) = pet_window::toggle_pet_visibility(tray.app_handle()) {
                    log::warn!("Failed to toggle pet window: {}", err);
                }
            }
        });

    if let Some(i) = icon {
        builder = builder.icon(i);
    }

    builder.build(app)?;
    Ok(())
}

/// Hover text after settings are applied: the pet's name, or the app name
/// while it has none.
pub(crate) fn tooltip_for(settings: &Settings) -> String {
    let name = settings.pet_name.trim();
    if name.is_empty() {
        DEFAULT_TOOLTIP.to_string()
    } else {
        name.to_string()
    }
}

pub(crate) fn update_tooltip(app: &AppHandle, settings: &Settings) {
    if let Some(tray) = app.tray_by_id(TRAY_ID) {
        let _ = tray.set_tooltip(Some(tooltip_for(settings)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_uses_pet_name() {
        let mut settings = Settings::default();
        assert_eq!(tooltip_for(&settings), "gmds");

        settings.pet_name = "  ".to_string();
        assert_eq!(tooltip_for(&settings), DEFAULT_TOOLTIP);
    }
}
