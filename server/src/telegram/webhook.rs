use common::{ChatId, LinkCode};
use serde::Deserialize;

/// Subset of a Bot API `Update` the link flow reads.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start <code>` from a deep link or typed by hand.
    Link { chat_id: ChatId, code: LinkCode },
    /// `/start` without a code.
    Help { chat_id: ChatId },
}

impl TelegramUpdate {
    pub fn command(&self) -> Option<BotCommand> {
        let message = self.message.as_ref()?;
        let chat_id = ChatId(message.chat.id);
        let text = message.text.as_deref()?.trim();

        let mut parts = text.split_whitespace();
        let command = parts.next()?;
        let command = command.split('@').next().unwrap_or(command);
        if command != "/start" {
            return None;
        }

        match parts.next() {
            Some(code) => Some(BotCommand::Link {
                chat_id,
                code: LinkCode::new(code.to_ascii_uppercase()),
            }),
            None => Some(BotCommand::Help { chat_id }),
        }
    }
}
