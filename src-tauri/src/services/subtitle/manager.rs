use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

use crate::services::anchor_layout::{Rect, Size};
use crate::windows::{self, surfaces, CAPTION_LABEL, INPUT_LABEL};

use super::machine::{CaptionEffect, SubtitleMachine};

pub const EVT_SUBTITLE_TEXT: &str = "subtitle-text";
pub const EVT_SUBTITLE_OPACITY: &str = "subtitle-opacity";
pub const EVT_SUBTITLE_FOCUS_INPUT: &str = "subtitle-focus-input";

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTextPayload {
    pub text: String,
}

/// Opacity target for the caption; `duration_ms == 0` means snap.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleOpacityPayload {
    pub opacity: f64,
    pub duration_ms: u64,
}

/// Drives a `SubtitleMachine` with real windows and runtime timers.
#[derive(Clone, Default)]
pub struct SubtitleManager {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    machine: Mutex<SubtitleMachine>,
    // NOTE: std Mutex is fine here; neither lock is held across .await.
    ticker: TickerSlot,
}

/// The running ticker task, tagged with the epoch it was started for.
#[derive(Default)]
struct TickerSlot {
    current: Mutex<Option<(u64, tauri::async_runtime::JoinHandle<()>)>>,
}

impl TickerSlot {
    fn arm(&self, epoch: u64, handle: tauri::async_runtime::JoinHandle<()>) {
        let Ok(mut slot) = self.current.lock() else {
            handle.abort();
            return;
        };
        if let Some((_, previous)) = slot.replace((epoch, handle)) {
            previous.abort();
        }
    }

    /// Abort the ticker only if it still belongs to `epoch`.
    fn disarm(&self, epoch: u64) -> bool {
        let Ok(mut slot) = self.current.lock() else {
            return false;
        };
        match slot.take() {
            Some((armed, handle)) if armed == epoch => {
                handle.abort();
                true
            }
            other => {
                *slot = other;
                false
            }
        }
    }

    #[cfg(test)]
    fn armed_epoch(&self) -> Option<u64> {
        self.current.lock().ok()?.as_ref().map(|(epoch, _)| *epoch)
    }
}

/// Calls `on_tick` every `interval`, starting one interval from now.
async fn run_ticker<F: FnMut()>(interval: Duration, mut on_tick: F) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; fragment 0 is already up.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        on_tick();
    }
}

impl SubtitleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hide generation; pass it back to `show_reply`.
    pub fn session(&self) -> u64 {
        self.inner.machine.lock().map(|m| m.session()).unwrap_or(0)
    }

    /// Show a chat reply unless the subtitles were dismissed while it was
    /// pending. Returns whether it was shown.
    pub fn show_reply(&self, app: &AppHandle, session: u64, text: &str, interval: Duration) -> bool {
        let mut shown = false;
        self.drive(app, |m| match m.show_reply(session, text, interval) {
            Some(effects) => {
                shown = true;
                effects
            }
            None => Vec::new(),
        });
        shown
    }

    pub fn hide(&self, app: &AppHandle) {
        self.drive(app, |m| m.hide());
    }

    pub fn show_input(&self, app: &AppHandle) {
        self.drive(app, |m| m.show_input());
    }

    pub fn anchor_moved(&self, app: &AppHandle, anchor: Rect) {
        self.drive(app, |m| m.anchor_moved(anchor));
    }

    pub fn set_input_size(&self, app: &AppHandle, size: Size) {
        self.drive(app, |m| m.set_input_size(size));
    }

    pub fn is_visible(&self) -> bool {
        self.inner
            .machine
            .lock()
            .map(|m| m.is_visible())
            .unwrap_or(false)
    }

    /// Input or caption is on screen.
    pub fn is_active(&self) -> bool {
        self.inner
            .machine
            .lock()
            .map(|m| m.is_visible() || m.is_caption_visible())
            .unwrap_or(false)
    }

    fn drive<F>(&self, app: &AppHandle, step: F)
    where
        F: FnOnce(&mut SubtitleMachine) -> Vec<CaptionEffect>,
    {
        let effects = {
            let Ok(mut machine) = self.inner.machine.lock() else {
                log::warn!("Subtitle state lock poisoned");
                return;
            };
            step(&mut machine)
        };

        for effect in effects {
            self.apply(app, effect);
        }
    }

    fn apply(&self, app: &AppHandle, effect: CaptionEffect) {
        match effect {
            CaptionEffect::SetOpacity(opacity) => emit_opacity(app, opacity, Duration::ZERO),
            CaptionEffect::SetText(text) => {
                let _ = app.emit_to(CAPTION_LABEL, EVT_SUBTITLE_TEXT, SubtitleTextPayload { text });
            }
            CaptionEffect::FadeIn(duration) => {
                match surfaces::ensure_caption_window(app) {
                    Ok(window) => {
                        let _ = window.show();
                    }
                    Err(err) => log::warn!("Caption window unavailable: {}", err),
                }
                emit_opacity(app, 1.0, duration);
            }
            CaptionEffect::FadeOut(duration) => emit_opacity(app, 0.0, duration),
            CaptionEffect::HideCaption => {
                if let Some(window) = app.get_webview_window(CAPTION_LABEL) {
                    let _ = window.hide();
                }
            }
            CaptionEffect::MoveCaption(point) => {
                if let Ok(window) = surfaces::ensure_caption_window(app) {
                    windows::move_to(&window, point);
                }
            }
            CaptionEffect::MoveInput(point) => {
                if let Ok(window) = surfaces::ensure_input_window(app) {
                    windows::move_to(&window, point);
                }
            }
            CaptionEffect::ShowInput => match surfaces::ensure_input_window(app) {
                Ok(window) => {
                    let _ = window.show();
                }
                Err(err) => log::warn!("Subtitle input window unavailable: {}", err),
            },
            CaptionEffect::HideInput => {
                if let Some(window) = app.get_webview_window(INPUT_LABEL) {
                    let _ = window.hide();
                }
            }
            CaptionEffect::FocusInput => {
                if let Some(window) = app.get_webview_window(INPUT_LABEL) {
                    let _ = window.set_focus();
                }
                let _ = app.emit_to(INPUT_LABEL, EVT_SUBTITLE_FOCUS_INPUT, ());
            }
            CaptionEffect::StartTicker { epoch, interval } => {
                self.start_ticker(app, epoch, interval)
            }
            CaptionEffect::StopTicker { epoch } => {
                self.inner.ticker.disarm(epoch);
            }
            CaptionEffect::ScheduleHide { epoch, delay } => {
                self.schedule(app, delay, move |m| m.linger_elapsed(epoch))
            }
            CaptionEffect::ScheduleFadeEnd { epoch, after } => {
                self.schedule(app, after, move |m| m.fade_finished(epoch))
            }
        }
    }

    fn start_ticker(&self, app: &AppHandle, epoch: u64, interval: Duration) {
        let manager = self.clone();
        let app = app.clone();
        let handle = tauri::async_runtime::spawn(run_ticker(interval, move || {
            manager.drive(&app, |m| m.tick(epoch));
        }));
        self.inner.ticker.arm(epoch, handle);
    }

    fn schedule<F>(&self, app: &AppHandle, delay: Duration, step: F)
    where
        F: FnOnce(&mut SubtitleMachine) -> Vec<CaptionEffect> + Send + 'static,
    {
        let manager = self.clone();
        let app = app.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.drive(&app, step);
        });
    }
}

fn emit_opacity(app: &AppHandle, opacity: f64, duration: Duration) {
    let _ = app.emit_to(
        CAPTION_LABEL,
        EVT_SUBTITLE_OPACITY,
        SubtitleOpacityPayload {
            opacity,
            duration_ms: duration.as_millis() as u64,
        },
    );
}
