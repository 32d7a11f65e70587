mod link_registry;
mod notifier;
mod webhook;

pub use link_registry::{LinkRegistry, LinkStatus};
pub use notifier::{spawn_delivery, LogNotifier, Notifier};
pub use webhook::{BotCommand, TelegramChat, TelegramMessage, TelegramUpdate};

#[cfg(test)]
pub(crate) use notifier::test_support;
