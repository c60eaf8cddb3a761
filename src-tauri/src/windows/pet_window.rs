//! The pet itself: sprite loading plus the actions shared by the pet's
//! commands, the context menu and the tray.

use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

use crate::error::PetError;
use crate::services::anchor_layout::{Point, Size};
use crate::services::paths;
use crate::services::pet::{ChatAction, DisplayMode, PetState, Surface};
use crate::services::subtitle::SubtitleManager;

use super::{BUBBLE_LABEL, PET_LABEL, surfaces};

pub const EVT_PET_SPRITE_CHANGED: &str = "pet-sprite-changed";
pub const EVT_DISPLAY_MODE_CHANGED: &str = "display-mode-changed";
pub const EVT_BUBBLE_FOCUS_INPUT: &str = "bubble-focus-input";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSprite {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Read a PNG/JPEG/GIF sprite into a data URL plus its pixel size.
pub fn load_sprite(path: &Path) -> Result<PetSprite, PetError> {
    let bytes = std::fs::read(path)?;
    let reader = ImageReader::new(Cursor::new(&bytes)).with_guessed_format()?;
    let mime = match reader.format() {
        Some(ImageFormat::Png) => "image/png",
        Some(ImageFormat::Jpeg) => "image/jpeg",
        Some(ImageFormat::Gif) => "image/gif",
        other => {
            return Err(PetError::invalid_input(format!(
                "Unsupported sprite format {:?}: {}",
                other,
                path.display()
            )));
        }
    };
    let (width, height) = reader.into_dimensions()?;

    Ok(PetSprite {
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(&bytes)),
        width,
        height,
    })
}

/// Load `path`, size the pet window to it and hand it to the pet page.
pub fn apply_sprite(app: &AppHandle, path: &str) -> Result<PetSprite, PetError> {
    let resolved = paths::resolve_asset(path);
    let sprite = load_sprite(&resolved)?;
    let size = Size::new(sprite.width as f64, sprite.height as f64);

    if let Some(window) = app.get_webview_window(PET_LABEL) {
        super::resize_to(&window, size);
    }
    app.state::<PetState>().lock()?.set_size(size);
    app.emit_to(PET_LABEL, EVT_PET_SPRITE_CHANGED, sprite.clone())?;

    log::info!(
        "Pet sprite set to {} ({}x{})",
        resolved.display(),
        sprite.width,
        sprite.height
    );
    Ok(sprite)
}

/// Re-read the pet's frame and drag whatever surface is open along with it.
pub fn follow_pet(app: &AppHandle) {
    let Some(window) = app.get_webview_window(PET_LABEL) else {
        return;
    };
    let Some(rect) = super::logical_rect(&window) else {
        return;
    };

    let subtitles = app.state::<SubtitleManager>();
    let pet_state = app.state::<PetState>();
    let bubble_target = {
        let Ok(mut pet) = pet_state.lock() else {
            return;
        };
        pet.set_position(Point::new(rect.left, rect.top));
        pet.set_size(Size::new(rect.width, rect.height));
        match pet.follower(subtitles.is_active()) {
            Some(Surface::Bubble) => Some(pet.bubble().position_near(pet.anchor())),
            _ => None,
        }
    };

    // Repositions the caption/input only while they are up.
    subtitles.anchor_moved(app, rect);

    if let Some(at) = bubble_target {
        if let Some(bubble) = app.get_webview_window(BUBBLE_LABEL) {
            super::move_to(&bubble, at);
        }
    }
}

/// Open or dismiss the chat surface of the current display mode.
pub fn open_chat(app: &AppHandle) -> Result<(), PetError> {
    let subtitles = app.state::<SubtitleManager>();
    let action = app.state::<PetState>().lock()?.open_chat(subtitles.is_visible());

    match action {
        ChatAction::ShowBubble { at } => {
            let window = surfaces::ensure_bubble_window(app)?;
            super::move_to(&window, at);
            window.show()?;
            window.set_focus()?;
            app.emit_to(BUBBLE_LABEL, EVT_BUBBLE_FOCUS_INPUT, ())?;
        }
        ChatAction::HideBubble => surfaces::hide_bubble_window(app),
        ChatAction::ShowSubtitleInput => subtitles.show_input(app),
        ChatAction::HideSubtitle => subtitles.hide(app),
    }
    Ok(())
}

pub fn toggle_mode(app: &AppHandle) -> Result<DisplayMode, PetError> {
    let subtitles = app.state::<SubtitleManager>();
    let toggle = app.state::<PetState>().lock()?.toggle_mode(subtitles.is_active());

    for surface in toggle.hide {
        match surface {
            Surface::Bubble => surfaces::hide_bubble_window(app),
            Surface::Subtitle => subtitles.hide(app),
        }
    }

    log::info!("Display mode switched to {:?}", toggle.mode);
    let _ = app.emit(EVT_DISPLAY_MODE_CHANGED, toggle.mode);
    Ok(toggle.mode)
}

pub fn show_pet(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(PET_LABEL) {
        window.show()?;
        window.set_focus()?;
    }
    Ok(())
}

pub fn hide_pet(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(PET_LABEL) {
        window.hide()?;
    }
    Ok(())
}

pub fn toggle_pet_visibility(app: &AppHandle) -> tauri::Result<()> {
    let Some(window) = app.get_webview_window(PET_LABEL) else {
        return Ok(());
    };
    if window.is_visible()? {
        window.hide()
    } else {
        window.show()?;
        window.set_focus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("desk-pet-sprite-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn png_sprite_becomes_data_url() {
        let dir = temp_dir();
        let path = dir.join("pet.png");
        image::RgbaImage::new(3, 2).save(&path).unwrap();

        let sprite = load_sprite(&path).unwrap();
        assert_eq!((sprite.width, sprite.height), (3, 2));
        assert!(sprite.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn format_is_sniffed_not_taken_from_extension() {
        let dir = temp_dir();
        let path = dir.join("pet.gif");
        image::RgbaImage::new(4, 4)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let sprite = load_sprite(&path).unwrap();
        assert!(sprite.data_url.starts_with("data:image/png;"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn non_image_is_rejected() {
        let dir = temp_dir();
        let path = dir.join("notes.png");
        std::fs::write(&path, "just text").unwrap();

        let err = load_sprite(&path).unwrap_err();
        assert!(matches!(err, PetError::InvalidInput { .. }));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_sprite_is_not_found() {
        let err = load_sprite(Path::new("/definitely/missing/pet.png")).unwrap_err();
        assert!(matches!(err, PetError::NotFound { .. }));
    }
}
