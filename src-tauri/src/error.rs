use serde::{Deserialize, Serialize};

/// Error surfaced to the webview by commands that can fail.
///
/// Chat failures never end up here; the chat client collapses them into a
/// user-facing reply string instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PetError {
    NotFound { message: String },
    InvalidInput { message: String },
    Io { message: String },
    Window { message: String },
    Internal { message: String },
}

impl PetError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn window(message: impl Into<String>) -> Self {
        Self::Window {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::InvalidInput { message }
            | Self::Io { message }
            | Self::Window { message }
            | Self::Internal { message } => message,
        }
    }
}

impl From<std::io::Error> for PetError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return Self::not_found(err.to_string());
        }
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for PetError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}

impl From<tauri::Error> for PetError {
    fn from(err: tauri::Error) -> Self {
        Self::window(err.to_string())
    }
}

impl From<image::ImageError> for PetError {
    fn from(err: image::ImageError) -> Self {
        Self::invalid_input(format!("Unreadable sprite: {err}"))
    }
}

impl std::fmt::Display for PetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { message } => write!(f, "NotFound: {}", message),
            Self::InvalidInput { message } => write!(f, "InvalidInput: {}", message),
            Self::Io { message } => write!(f, "Io: {}", message),
            Self::Window { message } => write!(f, "Window: {}", message),
            Self::Internal { message } => write!(f, "Internal: {}", message),
        }
    }
}

impl std::error::Error for PetError {}
