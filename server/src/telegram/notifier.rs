use std::sync::Arc;
use std::time::Duration;

use common::{log, log_error, ChatId};

/// Outbound side of the bot. Implementations may block; callers run them off the runtime.
pub trait Notifier: Send + Sync {
    fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), String>;
}

/// Writes bot messages to the server log instead of calling the Bot API.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), String> {
        log!("[telegram -> {}] {}", chat_id, text);
        Ok(())
    }
}

pub async fn deliver(
    notifier: Arc<dyn Notifier>,
    chat_id: ChatId,
    text: String,
    timeout: Duration,
) -> Result<(), String> {
    let task = tokio::task::spawn_blocking(move || notifier.send_message(chat_id, &text));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(format!("Notification task failed: {}", e)),
        Err(_) => Err(format!(
            "Notification to chat {} timed out after {} ms",
            chat_id,
            timeout.as_millis()
        )),
    }
}

/// Fire-and-forget delivery; failures only reach the log.
pub fn spawn_delivery(notifier: Arc<dyn Notifier>, chat_id: ChatId, text: String, timeout: Duration) {
    tokio::spawn(async move {
        if let Err(e) = deliver(notifier, chat_id, text, timeout).await {
            log_error!("{}", e);
        }
    });
}
