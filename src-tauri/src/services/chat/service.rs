use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::services::config::Settings;

use super::client::ChatClient;

/// Managed wrapper around the single `ChatClient`.
///
/// Sends queue on `in_flight` so a second message waits for the first reply.
/// The client itself is only locked briefly, never across the request, so
/// reconfiguring or clearing history works while a reply is pending.
pub struct ChatService {
    client: Mutex<ChatClient>,
    in_flight: tokio::sync::Mutex<()>,
}

impl ChatService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Mutex::new(ChatClient::from_settings(settings)),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    fn client(&self) -> MutexGuard<'_, ChatClient> {
        self.client.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn send(&self, message: &str) -> String {
        let _turn = self.in_flight.lock().await;

        let pending = match self.client().begin(message) {
            Ok(pending) => pending,
            Err(notice) => return notice.to_string(),
        };
        let outcome = pending.send().await;
        self.client().finish(outcome)
    }

    pub fn configure(&self, settings: &Settings) {
        self.client()
            .set_config(&settings.api_key, &settings.api_url, &settings.model);
    }

    pub fn clear_history(&self) {
        self.client().clear_history();
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.client().history().len()
    }
}

#[tauri::command]
pub async fn chat_clear_history(chat: tauri::State<'_, ChatService>) -> Result<(), String> {
    chat.clear_history();
    log::info!("Chat history cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chat::{MSG_MISSING_KEY, MSG_MISSING_URL};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one connection and answers `body` after `delay`.
    async fn spawn_slow_stub(delay: Duration, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        base_url
    }

    fn endpoint(base_url: &str) -> Settings {
        Settings {
            api_key: "sk-test".to_string(),
            api_url: base_url.to_string(),
            model: "m".to_string(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn configure_replaces_endpoint_settings() {
        let service = ChatService::new(&Settings::default());
        assert_eq!(service.send("hi").await, MSG_MISSING_KEY);

        let settings = Settings {
            api_key: "sk-test".to_string(),
            ..Settings::default()
        };
        service.configure(&settings);

        // Key is set but the URL is still empty.
        assert_eq!(service.send("hi").await, MSG_MISSING_URL);
        assert_eq!(service.history_len(), 0);
    }

    #[tokio::test]
    async fn configure_does_not_wait_for_pending_reply() {
        let base_url = spawn_slow_stub(Duration::from_secs(3600), String::new()).await;
        let service = Arc::new(ChatService::new(&endpoint(&base_url)));

        let sender = {
            let service = service.clone();
            tokio::spawn(async move { service.send("hello?").await })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(service.history_len(), 1);

        let reconfigured = tokio::time::timeout(Duration::from_secs(2), async {
            service.configure(&endpoint("http://127.0.0.1:9"));
            service.clear_history();
        })
        .await;
        assert!(reconfigured.is_ok());
        assert_eq!(service.history_len(), 0);
        sender.abort();
    }

    #[tokio::test]
    async fn reply_landing_after_clear_is_dropped_from_history() {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "late" } }]
        })
        .to_string();
        let base_url = spawn_slow_stub(Duration::from_millis(300), body).await;
        let service = Arc::new(ChatService::new(&endpoint(&base_url)));

        let sender = {
            let service = service.clone();
            tokio::spawn(async move { service.send("hi").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.clear_history();

        assert_eq!(sender.await.unwrap(), "late");
        assert_eq!(service.history_len(), 0);
    }
}
