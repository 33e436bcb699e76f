//! Telegram Bot channel: long polling + message sending via Bot API.
//!
//! Replies are plain text (the pipeline strips all markup) and are split
//! into `(sambungan n)` continuation chunks when they exceed Telegram's
//! message size.

use serde::{Deserialize, Serialize};
use tanya_core::config::TelegramConfig;
use tanya_core::error::{Result, TanyaError};

/// Kept under Telegram's 4096-character cap to leave room for the
/// continuation prefix.
pub const MESSAGE_CHAR_LIMIT: usize = 4000;

/// Telegram Bot channel with long polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    last_update_id: i64,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            last_update_id: 0,
        }
    }

    pub fn poll_interval(&self) -> u64 {
        self.config.poll_interval
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{}",
            self.config.bot_token, method
        )
    }

    /// Get updates using long polling.
    pub async fn get_updates(&mut self) -> Result<Vec<TelegramUpdate>> {
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("offset", (self.last_update_id + 1).to_string()),
                ("timeout", "30".into()),
                ("allowed_updates", "[\"message\"]".into()),
            ])
            .send()
            .await
            .map_err(|e| TanyaError::Channel(format!("Telegram getUpdates failed: {e}")))?;

        let body: TelegramApiResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| TanyaError::Channel(format!("Invalid Telegram response: {e}")))?;

        if !body.ok {
            return Err(TanyaError::Channel(format!(
                "Telegram API error: {}",
                body.description.unwrap_or_default()
            )));
        }

        let updates = body.result.unwrap_or_default();
        if let Some(last) = updates.last() {
            self.last_update_id = last.update_id;
        }
        Ok(updates)
    }

    /// Send a single plain-text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TanyaError::Channel(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| TanyaError::Channel(format!("Invalid send response: {e}")))?;

        if !result.ok {
            return Err(TanyaError::Channel(format!(
                "Send failed: {}",
                result.description.unwrap_or_default()
            )));
        }
        Ok(())
    }

    /// Send a reply, splitting it into continuation chunks when it
    /// exceeds the message size.
    pub async fn send_chunked(&self, chat_id: i64, text: &str) -> Result<()> {
        let chunks = split_message(text, MESSAGE_CHAR_LIMIT);
        if chunks.len() > 1 {
            tracing::debug!("Splitting reply into {} chunks", chunks.len());
        }
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                self.send_message(chat_id, chunk).await?;
            } else {
                self.send_message(chat_id, &format!("(sambungan {})\n\n{chunk}", i + 1))
                    .await?;
            }
        }
        Ok(())
    }

    /// Send typing indicator. Best effort.
    pub async fn send_typing(&self, chat_id: i64) {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": "typing",
        });
        let _ = self
            .client
            .post(self.api_url("sendChatAction"))
            .json(&body)
            .send()
            .await;
    }

    /// Get bot info.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| TanyaError::Channel(format!("getMe failed: {e}")))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| TanyaError::Channel(format!("Invalid getMe response: {e}")))?;
        body.result
            .ok_or_else(|| TanyaError::Channel("No bot info".into()))
    }
}

/// Split text into chunks of at most `limit` characters, preferring
/// paragraph boundaries, then sentence boundaries, then a hard split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        if paragraph.chars().count() <= limit {
            append_piece(&mut current, &mut chunks, paragraph, "\n\n", limit);
            continue;
        }
        // Paragraph itself is too long: fall back to sentence boundaries.
        for sentence in paragraph.split(". ") {
            if sentence.chars().count() <= limit {
                append_piece(&mut current, &mut chunks, sentence, ". ", limit);
            } else {
                // No usable boundary at all: hard split by characters.
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                let mut count = 0;
                for c in sentence.chars() {
                    if count == limit {
                        chunks.push(std::mem::take(&mut current));
                        count = 0;
                    }
                    current.push(c);
                    count += 1;
                }
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn append_piece(
    current: &mut String,
    chunks: &mut Vec<String>,
    piece: &str,
    sep: &str,
    limit: usize,
) {
    let needed = if current.is_empty() {
        piece.chars().count()
    } else {
        current.chars().count() + sep.chars().count() + piece.chars().count()
    };
    if needed <= limit {
        if !current.is_empty() {
            current.push_str(sep);
        }
        current.push_str(piece);
    } else {
        if !current.is_empty() {
            chunks.push(std::mem::take(current));
        }
        *current = piece.to_string();
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

impl TelegramUpdate {
    /// The chat id and text of a user-sent text message; `None` for bot
    /// messages, edits, stickers and other non-text updates.
    pub fn text_message(&self) -> Option<(i64, &str)> {
        let msg = self.message.as_ref()?;
        let text = msg.text.as_deref()?;
        if msg.from.as_ref().is_some_and(|f| f.is_bot) {
            return None;
        }
        Some((msg.chat.id, text))
    }
}
