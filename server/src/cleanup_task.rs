use std::time::Duration;

use common::log;

use crate::game_session_manager::GameSessionManager;
use crate::telegram::LinkRegistry;

pub struct CleanupTask {
    session_manager: GameSessionManager,
    link_registry: LinkRegistry,
    check_interval: Duration,
    inactivity_timeout: Duration,
}

impl CleanupTask {
    pub fn new(
        session_manager: GameSessionManager,
        link_registry: LinkRegistry,
        check_interval: Duration,
        inactivity_timeout: Duration,
    ) -> Self {
        Self {
            session_manager,
            link_registry,
            check_interval,
            inactivity_timeout,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_inactive().await;
        }
    }

    async fn cleanup_inactive(&self) {
        self.cleanup_inactive_games().await;
        self.cleanup_expired_links().await;
    }

    async fn cleanup_inactive_games(&self) {
        let inactive_games = self
            .session_manager
            .get_inactive_games(self.inactivity_timeout)
            .await;

        if inactive_games.is_empty() {
            return;
        }

        for game_id in &inactive_games {
            log!("Cleaning up inactive game: {}", game_id);
            self.session_manager.remove_game(game_id).await;
        }

        log!(
            "Removed {} inactive games, {} still active",
            inactive_games.len(),
            self.session_manager.game_count().await
        );
    }

    async fn cleanup_expired_links(&self) {
        let removed = self.link_registry.remove_expired().await;
        if removed > 0 {
            log!("Removed {} expired link codes", removed);
        }
    }
}
