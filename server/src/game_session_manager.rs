use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use common::engine::SessionRng;
use common::engine::tictactoe::{FirstPlayerMode, GameStatus, Line, Mark, TicTacToeGameState};
use common::id_generator::generate_game_id;
use common::{log, GameId, PromoCode};
use serde::Serialize;

use crate::promo::PromoIssuer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotFound(GameId),
    GameOver(GameId),
    InvalidMove(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotFound(id) => write!(f, "Game {} not found", id),
            SessionError::GameOver(id) => write!(f, "Game {} is already over", id),
            SessionError::InvalidMove(reason) => write!(f, "Invalid move: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub board: Vec<Mark>,
    pub human_mark: Mark,
    pub ai_mark: Mark,
    pub current_mark: Mark,
    pub status: GameStatus,
    pub winning_line: Option<Line>,
    pub move_count: usize,
    pub last_move: Option<usize>,
    pub last_ai_move: Option<usize>,
    pub promo_code: Option<PromoCode>,
}

#[derive(Debug, Clone)]
pub struct MoveResult {
    pub snapshot: GameSnapshot,
    /// Set only on the move that won the round for the human.
    pub promo_issued: bool,
}

struct GameSession {
    state: TicTacToeGameState,
    rng: SessionRng,
    promo_code: Option<PromoCode>,
    last_activity: Instant,
}

impl GameSession {
    fn new(first_player: FirstPlayerMode, mut rng: SessionRng) -> Result<Self, SessionError> {
        let mut state = TicTacToeGameState::new(first_player, &mut rng);
        state
            .apply_ai_move(&mut rng)
            .map_err(SessionError::InvalidMove)?;

        Ok(Self {
            state,
            rng,
            promo_code: None,
            last_activity: Instant::now(),
        })
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn snapshot(&self, game_id: &GameId) -> GameSnapshot {
        let status = self.state.status();
        GameSnapshot {
            game_id: game_id.clone(),
            board: self.state.board.cells().to_vec(),
            human_mark: self.state.human_mark,
            ai_mark: self.state.ai_mark,
            current_mark: self.state.current_mark,
            status,
            winning_line: self.state.outcome.winning_line(),
            move_count: self.state.move_count(),
            last_move: self.state.last_move,
            last_ai_move: self.state.last_ai_move,
            promo_code: match status {
                GameStatus::HumanWon => self.promo_code.clone(),
                _ => None,
            },
        }
    }
}

/// In-memory registry of rounds, one per browser session.
#[derive(Clone)]
pub struct GameSessionManager {
    sessions: Arc<Mutex<HashMap<GameId, GameSession>>>,
    promo_issuer: PromoIssuer,
    default_first_player: FirstPlayerMode,
}

impl GameSessionManager {
    pub fn new(promo_issuer: PromoIssuer, default_first_player: FirstPlayerMode) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            promo_issuer,
            default_first_player,
        }
    }

    pub async fn create_game(
        &self,
        first_player: Option<FirstPlayerMode>,
    ) -> Result<GameSnapshot, SessionError> {
        self.create_game_with_rng(first_player, SessionRng::from_random())
            .await
    }

    pub async fn create_game_with_rng(
        &self,
        first_player: Option<FirstPlayerMode>,
        rng: SessionRng,
    ) -> Result<GameSnapshot, SessionError> {
        let first_player = first_player.unwrap_or(self.default_first_player);
        let seed = rng.seed();
        let session = GameSession::new(first_player, rng)?;

        let mut sessions = self.sessions.lock().await;
        let game_id = loop {
            let candidate = GameId::new(generate_game_id());
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let snapshot = session.snapshot(&game_id);
        sessions.insert(game_id.clone(), session);

        log!(
            "Game {} created (human: {}, seed: {})",
            game_id,
            snapshot.human_mark.as_str(),
            seed
        );
        Ok(snapshot)
    }

    pub async fn get_game(&self, game_id: &GameId) -> Result<GameSnapshot, SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(game_id)
            .ok_or_else(|| SessionError::NotFound(game_id.clone()))?;
        Ok(session.snapshot(game_id))
    }

    /// Places the human mark, then lets the AI answer while the round is still open.
    pub async fn play_move(
        &self,
        game_id: &GameId,
        index: usize,
    ) -> Result<MoveResult, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::NotFound(game_id.clone()))?;

        if session.state.outcome.is_decided() {
            return Err(SessionError::GameOver(game_id.clone()));
        }

        session.touch();
        session
            .state
            .place_human_mark(index)
            .map_err(SessionError::InvalidMove)?;

        session
            .state
            .apply_ai_move(&mut session.rng)
            .map_err(SessionError::InvalidMove)?;

        let mut promo_issued = false;
        match session.state.status() {
            GameStatus::HumanWon => {
                let code = self.promo_issuer.issue(game_id).await;
                session.promo_code = Some(code);
                promo_issued = true;
                log!("Game {} won by the player", game_id);
            }
            GameStatus::AiWon => log!("Game {} won by the AI", game_id),
            GameStatus::Draw => log!("Game {} ended in a draw", game_id),
            GameStatus::InProgress => {}
        }

        Ok(MoveResult {
            snapshot: session.snapshot(game_id),
            promo_issued,
        })
    }

    pub async fn reset_game(
        &self,
        game_id: &GameId,
        first_player: Option<FirstPlayerMode>,
    ) -> Result<GameSnapshot, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::NotFound(game_id.clone()))?;

        let first_player = first_player.unwrap_or(self.default_first_player);
        session.state.reset(first_player, &mut session.rng);
        session
            .state
            .apply_ai_move(&mut session.rng)
            .map_err(SessionError::InvalidMove)?;
        session.promo_code = None;
        session.touch();

        log!("Game {} reset", game_id);
        Ok(session.snapshot(game_id))
    }

    pub async fn remove_game(&self, game_id: &GameId) -> bool {
        let removed = self.sessions.lock().await.remove(game_id).is_some();
        if removed {
            self.promo_issuer.forget(game_id).await;
            log!("Game {} removed", game_id);
        }
        removed
    }

    pub async fn get_inactive_games(&self, timeout: Duration) -> Vec<GameId> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .filter(|(_, session)| session.last_activity.elapsed() >= timeout)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn game_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn set_board(&self, game_id: &GameId, cells: &[Mark]) {
        use common::engine::tictactoe::Board;

        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(game_id).unwrap();
        session.state.board = Board::from_cells(cells).unwrap();
    }
}
