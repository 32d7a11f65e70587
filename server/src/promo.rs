use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use common::id_generator::generate_code;
use common::{log, GameId, PromoCode};

use crate::server_config::PromoSettings;

#[derive(Default)]
struct IssuedCodes {
    by_game: HashMap<GameId, PromoCode>,
    codes: HashSet<PromoCode>,
}

/// Hands out one promo code per won game. Codes live only in memory.
#[derive(Clone)]
pub struct PromoIssuer {
    settings: PromoSettings,
    issued: Arc<Mutex<IssuedCodes>>,
}

impl PromoIssuer {
    pub fn new(settings: PromoSettings) -> Self {
        Self {
            settings,
            issued: Arc::new(Mutex::new(IssuedCodes::default())),
        }
    }

    pub async fn issue(&self, game_id: &GameId) -> PromoCode {
        let mut issued = self.issued.lock().await;

        if let Some(code) = issued.by_game.get(game_id) {
            return code.clone();
        }

        let code = loop {
            let candidate = self.format_code(&generate_code(self.settings.code_length));
            if !issued.codes.contains(&candidate) {
                break candidate;
            }
        };

        issued.codes.insert(code.clone());
        issued.by_game.insert(game_id.clone(), code.clone());
        log!("Issued promo code {} for game {}", code, game_id);
        code
    }

    /// Drops the code issued for a game, if any. Called when the game is removed.
    pub async fn forget(&self, game_id: &GameId) {
        let mut issued = self.issued.lock().await;
        if let Some(code) = issued.by_game.remove(game_id) {
            issued.codes.remove(&code);
            log!("Forgot promo code {} for game {}", code, game_id);
        }
    }

    #[cfg(test)]
    pub async fn code_for(&self, game_id: &GameId) -> Option<PromoCode> {
        self.issued.lock().await.by_game.get(game_id).cloned()
    }

    #[cfg(test)]
    pub async fn issued_count(&self) -> usize {
        self.issued.lock().await.codes.len()
    }

    fn format_code(&self, suffix: &str) -> PromoCode {
        if self.settings.prefix.is_empty() {
            PromoCode::new(suffix.to_string())
        } else {
            PromoCode::new(format!("{}-{}", self.settings.prefix, suffix))
        }
    }
}
