use std::time::Duration;

use crate::services::config::Settings;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

pub const MSG_MISSING_KEY: &str = "请先配置 API Key";
pub const MSG_MISSING_URL: &str = "请先在设置中配置 API URL";
pub const MSG_AUTH_FAILED: &str = "API 请求失败，请检查配置";
pub const MSG_REQUEST_FAILED: &str = "请求失败，请检查网络或配置";

#[derive(Debug)]
enum ChatError {
    Transport(reqwest::Error),
    Status {
        status: u16,
        url: String,
        body: String,
    },
    Malformed(String),
}

impl ChatError {
    /// Configuration-looking failures: auth statuses, or a transport/status
    /// line that mentions the credential. The response body is not consulted.
    fn is_auth_related(&self) -> bool {
        let text = match self {
            Self::Status {
                status: 401 | 403, ..
            } => return true,
            Self::Status { status, url, .. } => format!("{status} for url: {url}"),
            Self::Transport(err) => err.to_string(),
            Self::Malformed(_) => return false,
        };
        text.contains("Bearer") || text.to_lowercase().contains("key")
    }

    fn user_message(&self) -> &'static str {
        if self.is_auth_related() {
            MSG_AUTH_FAILED
        } else {
            MSG_REQUEST_FAILED
        }
    }
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "Chat request failed: {}", err),
            Self::Status { status, url, body } => {
                write!(f, "Chat API error ({}) for {}: {}", status, url, body)
            }
            Self::Malformed(message) => write!(f, "Malformed chat response: {}", message),
        }
    }
}

/// A request detached from its `ChatClient`, so it can run without holding
/// the client.
pub(super) struct PendingChat {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    messages: Vec<ChatMessage>,
    generation: u64,
}

pub(super) struct ChatOutcome {
    generation: u64,
    result: Result<String, ChatError>,
}

impl PendingChat {
    pub(super) async fn send(self) -> ChatOutcome {
        let result = self.request_reply().await;
        ChatOutcome {
            generation: self.generation,
            result,
        }
    }

    async fn request_reply(&self) -> Result<String, ChatError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: &self.messages,
        };

        let response = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(ChatError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, url, body });
        }

        let body = response.text().await.map_err(ChatError::Transport)?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Malformed("no choices[0].message.content".to_string()))
    }
}

/// Conversation state plus the endpoint it talks to.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    history: Vec<ChatMessage>,
    /// Bumped by `clear_history`; replies to older requests are not recorded.
    generation: u64,
}

impl ChatClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            history: Vec::new(),
            generation: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.api_key, &settings.api_url, &settings.model)
    }

    pub fn set_config(
        &mut self,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) {
        self.api_key = api_key.into();
        self.base_url = base_url.into();
        self.model = model.into();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.generation += 1;
    }

    /// Send `message` and return the reply, or a user-facing error string.
    ///
    /// The user turn is recorded before the request goes out and stays in the
    /// history even when the request fails.
    pub async fn chat(&mut self, message: &str) -> String {
        match self.begin(message) {
            Ok(pending) => {
                let outcome = pending.send().await;
                self.finish(outcome)
            }
            Err(notice) => notice.to_string(),
        }
    }

    /// Record the user turn and snapshot everything the request needs.
    /// `Err` carries the notice for a missing key or URL; history is untouched.
    pub(super) fn begin(&mut self, message: &str) -> Result<PendingChat, &'static str> {
        if self.api_key.is_empty() {
            return Err(MSG_MISSING_KEY);
        }
        if self.base_url.is_empty() {
            return Err(MSG_MISSING_URL);
        }

        self.history.push(ChatMessage::user(message));
        Ok(PendingChat {
            http: self.http.clone(),
            url: completions_url(&self.base_url),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            messages: self.history.clone(),
            generation: self.generation,
        })
    }

    pub(super) fn finish(&mut self, outcome: ChatOutcome) -> String {
        match outcome.result {
            Ok(reply) => {
                if outcome.generation == self.generation {
                    self.history.push(ChatMessage::assistant(reply.clone()));
                }
                reply
            }
            Err(err) => {
                log::warn!("{}", err);
                err.user_message().to_string()
            }
        }
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim().trim_end_matches('/'))
}
