use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use common::id_generator::generate_code;
use common::{log, ChatId, LinkCode};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    Pending,
    Linked { chat_id: ChatId },
    Expired,
}

#[derive(Debug, Clone)]
struct LinkEntry {
    chat_id: Option<ChatId>,
    created_at: Instant,
    linked_at: Option<Instant>,
}

/// Pending codes age from creation, linked ones from the moment they were linked.
#[derive(Debug, Clone, Copy)]
struct LinkTtl {
    pending: Duration,
    linked: Duration,
}

impl LinkEntry {
    fn is_expired(&self, ttl: LinkTtl) -> bool {
        match self.linked_at {
            Some(linked_at) => linked_at.elapsed() >= ttl.linked,
            None => self.created_at.elapsed() >= ttl.pending,
        }
    }
}

/// Short-lived codes a player sends to the bot to tie a chat to their browser.
#[derive(Clone)]
pub struct LinkRegistry {
    links: Arc<Mutex<HashMap<LinkCode, LinkEntry>>>,
    code_length: usize,
    ttl: LinkTtl,
}

impl LinkRegistry {
    pub fn new(code_length: usize, pending_ttl: Duration, linked_ttl: Duration) -> Self {
        Self {
            links: Arc::new(Mutex::new(HashMap::new())),
            code_length,
            ttl: LinkTtl {
                pending: pending_ttl,
                linked: linked_ttl,
            },
        }
    }

    pub async fn create_link(&self) -> LinkCode {
        let mut links = self.links.lock().await;
        let code = loop {
            let candidate = LinkCode::new(generate_code(self.code_length));
            if !links.contains_key(&candidate) {
                break candidate;
            }
        };

        links.insert(
            code.clone(),
            LinkEntry {
                chat_id: None,
                created_at: Instant::now(),
                linked_at: None,
            },
        );
        log!("Link code {} created", code);
        code
    }

    pub async fn confirm(&self, code: &LinkCode, chat_id: ChatId) -> Result<(), String> {
        let mut links = self.links.lock().await;
        let entry = links
            .get_mut(code)
            .ok_or_else(|| format!("Unknown link code {}", code))?;

        if entry.is_expired(self.ttl) {
            return Err(format!("Link code {} has expired", code));
        }

        match entry.chat_id {
            Some(linked) if linked == chat_id => Ok(()),
            Some(_) => Err(format!("Link code {} is already used by another chat", code)),
            None => {
                entry.chat_id = Some(chat_id);
                entry.linked_at = Some(Instant::now());
                log!("Link code {} linked to chat {}", code, chat_id);
                Ok(())
            }
        }
    }

    pub async fn status(&self, code: &LinkCode) -> Option<LinkStatus> {
        let links = self.links.lock().await;
        let entry = links.get(code)?;

        let status = match entry.chat_id {
            _ if entry.is_expired(self.ttl) => LinkStatus::Expired,
            Some(chat_id) => LinkStatus::Linked { chat_id },
            None => LinkStatus::Pending,
        };
        Some(status)
    }

    pub async fn linked_chat(&self, code: &LinkCode) -> Option<ChatId> {
        match self.status(code).await? {
            LinkStatus::Linked { chat_id } => Some(chat_id),
            _ => None,
        }
    }

    /// Drops codes past their ttl; returns how many went away.
    pub async fn remove_expired(&self) -> usize {
        let mut links = self.links.lock().await;
        let before = links.len();
        links.retain(|_, entry| !entry.is_expired(self.ttl));
        before - links.len()
    }
}
