use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Seconds the server holds a `getUpdates` request open
pub const LONG_POLL_SECS: u64 = 30;

/// Somewhere a chat reply can be sent
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    async fn send_document(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Telegram(format!(
                "{} failed: {}",
                method,
                self.description
                    .unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Minimal Bot API client over HTTPS
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base(API_BASE, token)
    }

    /// Point the client at another Bot API server
    pub fn with_base(api_base: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Telegram("bot token is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 15))
            .build()?;

        Ok(Self {
            http,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), token.trim()),
        })
    }

    /// Fetch pending updates with an id of at least `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: LONG_POLL_SECS,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &body).await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        response.into_result(method)
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            let body = SendMessage {
                chat_id,
                text: &chunk,
                disable_web_page_preview: true,
            };
            let _: serde_json::Value = self.call("sendMessage", &body).await?;
        }
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime::TEXT_CSV.as_ref())?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response: ApiResponse<serde_json::Value> = self
            .http
            .post(format!("{}/sendDocument", self.base))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        response.into_result("sendDocument").map(|_| ())
    }
}

/// Split `text` into pieces of at most `limit` characters, preferring to break
/// between paragraphs, then lines.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let hard = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..hard];

        let cut = window
            .rfind("\n\n")
            .or_else(|| window.rfind('\n'))
            .filter(|&i| i > 0)
            .unwrap_or(hard);

        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start_matches('\n');
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_not_split() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_prefers_paragraph_breaks() {
        let text = "aaaa vs bbbb: 1'\n\ncccc vs dddd: 2'\n\neeee vs ffff: 3'";
        let chunks = split_message(text, 36);

        assert_eq!(chunks[0], "aaaa vs bbbb: 1'\n\ncccc vs dddd: 2'");
        assert_eq!(chunks[1], "eeee vs ffff: 3'");
    }

    #[test]
    fn test_split_without_breaks_is_hard() {
        let text = "x".repeat(25);
        let chunks = split_message(&text, 10);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "é".repeat(12);
        let chunks = split_message(&text, 5);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "é".repeat(5));
    }

    #[test]
    fn test_update_deserializes_without_text() {
        let json = r#"{"update_id": 7, "message": {"message_id": 1, "chat": {"id": -42}}}"#;
        let update: Update = serde_json::from_str(json).unwrap();

        assert_eq!(update.update_id, 7);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, -42);
        assert!(message.text.is_none());
    }

    #[test]
    fn test_api_error_carries_description() {
        let json = r#"{"ok": false, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();

        let err = response.into_result("getUpdates").unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(TelegramClient::new("  ").is_err());
    }
}
