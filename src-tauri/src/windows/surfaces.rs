//! Borderless companion windows: bubble, subtitle caption, subtitle input,
//! plus the settings dialog.
//!
//! The borderless ones are created hidden during setup and reused afterwards;
//! `ensure_*` only builds a window when it is missing (e.g. closed by the OS).

use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::services::anchor_layout::Size;
use crate::services::bubble;
use crate::services::subtitle::DEFAULT_INPUT_SIZE;

use super::{BUBBLE_LABEL, CAPTION_LABEL, INPUT_LABEL, SETTINGS_LABEL};

const CAPTION_SIZE: Size = Size {
    width: 400.0,
    height: 120.0,
};
const SETTINGS_SIZE: Size = Size {
    width: 400.0,
    height: 360.0,
};

fn build_overlay(
    app: &AppHandle,
    label: &str,
    page: &str,
    size: Size,
) -> tauri::Result<WebviewWindow> {
    if let Some(window) = app.get_webview_window(label) {
        return Ok(window);
    }

    let builder = WebviewWindowBuilder::new(app, label, WebviewUrl::App(page.into()))
        .title(label)
        .inner_size(size.width, size.height)
        .decorations(false)
        .shadow(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .resizable(false)
        .visible(false);

    #[cfg(not(target_os = "macos"))]
    let builder = builder.transparent(true);

    let window = builder.build()?;
    log::info!("Created {} window", label);
    Ok(window)
}

pub fn ensure_bubble_window(app: &AppHandle) -> tauri::Result<WebviewWindow> {
    build_overlay(app, BUBBLE_LABEL, "bubble.html", bubble::DEFAULT_SIZE)
}

/// The caption never takes input; clicks fall through to the desktop.
pub fn ensure_caption_window(app: &AppHandle) -> tauri::Result<WebviewWindow> {
    let existed = app.get_webview_window(CAPTION_LABEL).is_some();
    let window = build_overlay(app, CAPTION_LABEL, "subtitle.html", CAPTION_SIZE)?;
    if !existed {
        window.set_ignore_cursor_events(true)?;
        let _ = window.set_focusable(false);
    }
    Ok(window)
}

pub fn ensure_input_window(app: &AppHandle) -> tauri::Result<WebviewWindow> {
    build_overlay(app, INPUT_LABEL, "subtitle-input.html", DEFAULT_INPUT_SIZE)
}

pub fn create_surfaces(app: &AppHandle) -> tauri::Result<()> {
    ensure_bubble_window(app)?;
    ensure_caption_window(app)?;
    ensure_input_window(app)?;
    Ok(())
}

pub fn hide_bubble_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(BUBBLE_LABEL) {
        let _ = window.hide();
    }
}

/// Show the settings dialog, creating it on first use.
pub fn open_settings_window(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(SETTINGS_LABEL) {
        window.show()?;
        window.set_focus()?;
        return Ok(());
    }

    WebviewWindowBuilder::new(app, SETTINGS_LABEL, WebviewUrl::App("settings.html".into()))
        .title("设置")
        .inner_size(SETTINGS_SIZE.width, SETTINGS_SIZE.height)
        .resizable(false)
        .always_on_top(true)
        .center()
        .build()?;
    Ok(())
}

pub fn close_settings_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(SETTINGS_LABEL) {
        let _ = window.close();
    }
}
