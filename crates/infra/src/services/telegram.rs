use super::{ITransport, SendOutcome};
use deadline_notifier_domain::Message;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Delivers messages through the Telegram Bot API
pub struct TelegramTransport {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramTransport {
    pub fn new(base_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            bot_token: bot_token.into(),
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

impl<'a> SendMessageBody<'a> {
    fn new(chat_id: &'a str, message: &'a Message) -> Self {
        let reply_markup = if message.controls.is_empty() {
            None
        } else {
            Some(InlineKeyboardMarkup {
                inline_keyboard: vec![message
                    .controls
                    .iter()
                    .map(|c| InlineKeyboardButton {
                        text: &c.label,
                        callback_data: &c.callback_data,
                    })
                    .collect()],
            })
        };
        Self {
            chat_id,
            text: &message.text,
            reply_markup,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TelegramErrorResponse {
    #[serde(default)]
    description: String,
}

fn classify_failure(status: StatusCode, description: String) -> SendOutcome {
    let lowercase = description.to_lowercase();
    let unreachable = status == StatusCode::FORBIDDEN
        || (status == StatusCode::BAD_REQUEST
            && (lowercase.contains("chat not found") || lowercase.contains("user is deactivated")));

    if unreachable {
        SendOutcome::RecipientUnreachable(description)
    } else {
        SendOutcome::Failed(format!("{}: {}", status, description))
    }
}

#[async_trait::async_trait]
impl ITransport for TelegramTransport {
    async fn send_message(&self, chat_id: &str, message: &Message) -> SendOutcome {
        let res = match self
            .client
            .post(self.send_message_url())
            .json(&SendMessageBody::new(chat_id, message))
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => return SendOutcome::Failed(e.to_string()),
        };

        let status = res.status();
        if status.is_success() {
            return SendOutcome::Delivered;
        }
        let error = res
            .json::<TelegramErrorResponse>()
            .await
            .unwrap_or_default();
        classify_failure(status, error.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadline_notifier_domain::MessageControl;

    #[test]
    fn it_classifies_blocked_and_missing_chats_as_unreachable() {
        assert!(matches!(
            classify_failure(
                StatusCode::FORBIDDEN,
                "Forbidden: bot was blocked by the user".into()
            ),
            SendOutcome::RecipientUnreachable(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "Bad Request: chat not found".into()),
            SendOutcome::RecipientUnreachable(_)
        ));
    }

    #[test]
    fn it_classifies_other_errors_as_failures() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests".into()),
            SendOutcome::Failed(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::BAD_REQUEST,
                "Bad Request: message is too long".into()
            ),
            SendOutcome::Failed(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, String::new()),
            SendOutcome::Failed(_)
        ));
    }

    #[test]
    fn it_serializes_controls_as_inline_keyboard() {
        let message = Message {
            text: "Hello".into(),
            controls: vec![MessageControl {
                label: "Done".into(),
                callback_data: "task:done:1".into(),
            }],
        };
        let body = serde_json::to_value(SendMessageBody::new("42", &message)).unwrap();
        assert_eq!(body["chat_id"], "42");
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "task:done:1"
        );

        let plain = Message::text("Hello");
        let body = serde_json::to_value(SendMessageBody::new("42", &plain)).unwrap();
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn it_builds_send_message_url() {
        let transport = TelegramTransport::new("https://api.telegram.org/", "123:abc");
        assert_eq!(
            transport.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
