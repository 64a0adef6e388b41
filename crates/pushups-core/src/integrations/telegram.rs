//! Telegram integration -- receive commands via long polling, send HTML replies.
//!
//! Only the three Bot API methods the bot needs are wrapped: `getMe` (token
//! check at startup), `getUpdates` and `sendMessage`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::NotifyError;
use crate::integrations::keyring_store;
use crate::integrations::traits::Notifier;
use crate::record::UserId;

/// Environment variable consulted before the keyring.
pub const TOKEN_ENV: &str = "PUSHUPS_TELEGRAM_TOKEN";
const TOKEN_KEY: &str = "telegram_bot_token";

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Bot token from `PUSHUPS_TELEGRAM_TOKEN`, falling back to the OS keyring.
pub fn resolve_token() -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return Some(token.trim().to_string());
        }
    }
    keyring_store::get(TOKEN_KEY).ok().flatten()
}

/// Persist the bot token to the OS keyring.
pub fn store_token(token: &str) -> Result<(), keyring::Error> {
    keyring_store::set(TOKEN_KEY, token.trim())
}

/// Remove the bot token from the OS keyring.
pub fn forget_token() -> Result<(), keyring::Error> {
    keyring_store::delete(TOKEN_KEY)
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

/// Minimal Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// # Errors
    /// Returns [`NotifyError::NotConfigured`] for an empty token.
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self, NotifyError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(NotifyError::NotConfigured);
        }
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T, B>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, NotifyError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        // The URL carries the token; keep it out of error messages.
        let resp = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = resp.status();
        let envelope: ApiResponse<T> = resp.json().await.map_err(|e| e.without_url())?;
        if !envelope.ok {
            return Err(NotifyError::Api {
                code: envelope.error_code.or(Some(i64::from(status.as_u16()))),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            });
        }
        envelope.result.ok_or_else(|| NotifyError::Api {
            code: None,
            description: format!("{method} returned no result"),
        })
    }

    /// Identify the bot. Fails when the token is rejected.
    pub async fn get_me(&self) -> Result<User, NotifyError> {
        self.call("getMe", &json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, NotifyError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &body,
                Duration::from_secs(timeout_secs) + POLL_GRACE,
            )
            .await?;
        debug!(count = updates.len(), "received updates");
        Ok(updates)
    }

    /// Send an HTML-formatted message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        let _: serde_json::Value = self.call("sendMessage", &body, REQUEST_TIMEOUT).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, user: UserId, text: &str) -> Result<(), NotifyError> {
        self.send_message(user.0, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn empty_token_is_not_configured() {
        assert!(matches!(
            TelegramClient::new("  ", "https://api.telegram.org"),
            Err(NotifyError::NotConfigured)
        ));
    }

    #[test]
    fn method_url_trims_trailing_slash() {
        let client = TelegramClient::new("123:abc", "https://api.telegram.org/").unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let client = TelegramClient::new("123:secret", "https://api.telegram.org").unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }

    #[tokio::test]
    async fn send_message_uses_html_parse_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bottok/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 42,
                "text": "<b>hi</b>",
                "parse_mode": "HTML",
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{"message_id":1,"chat":{"id":42}}}"#)
            .create_async()
            .await;

        let client = TelegramClient::new("tok", server.url()).unwrap();
        client.notify(UserId(42), "<b>hi</b>").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_failure_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bottok/sendMessage")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#,
            )
            .create_async()
            .await;

        let client = TelegramClient::new("tok", server.url()).unwrap();
        let err = client.send_message(42, "hello").await.unwrap_err();
        match err {
            NotifyError::Api { code, description } => {
                assert_eq!(code, Some(403));
                assert!(description.contains("blocked"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_me_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botbad/getMe")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = TelegramClient::new("bad", server.url()).unwrap();
        assert!(matches!(
            client.get_me().await,
            Err(NotifyError::Api { code: Some(401), .. })
        ));
    }

    #[tokio::test]
    async fn get_updates_parses_messages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bottok/getUpdates")
            .match_body(Matcher::PartialJson(json!({ "offset": 10, "timeout": 0 })))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":true,"result":[
                    {"update_id":10,"message":{"message_id":5,"chat":{"id":7},"from":{"id":7,"is_bot":false,"first_name":"A"},"text":"/add 40"}},
                    {"update_id":11}
                ]}"#,
            )
            .create_async()
            .await;

        let client = TelegramClient::new("tok", server.url()).unwrap();
        let updates = client.get_updates(Some(10), 0).await.unwrap();
        assert_eq!(updates.len(), 2);
        let msg = updates[0].message.as_ref().unwrap();
        assert_eq!(msg.chat.id, 7);
        assert_eq!(msg.text.as_deref(), Some("/add 40"));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn non_json_body_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bottok/sendMessage")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let client = TelegramClient::new("tok", server.url()).unwrap();
        assert!(matches!(
            client.send_message(1, "x").await,
            Err(NotifyError::Http(_))
        ));
    }
}
