use serde::Serialize;

use crate::engine::SessionRng;
use super::board::Board;
use super::bot_controller::select_move;
use super::types::{FirstPlayerMode, Mark, Outcome};
use super::win_detector::evaluate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    HumanWon,
    AiWon,
    Draw,
}

/// One round of human vs AI. X always opens.
#[derive(Debug, Clone)]
pub struct TicTacToeGameState {
    pub board: Board,
    pub human_mark: Mark,
    pub ai_mark: Mark,
    pub current_mark: Mark,
    pub outcome: Outcome,
    pub last_move: Option<usize>,
    pub last_ai_move: Option<usize>,
}

impl TicTacToeGameState {
    pub fn new(first_player_mode: FirstPlayerMode, rng: &mut SessionRng) -> Self {
        let human_first = match first_player_mode {
            FirstPlayerMode::Human => true,
            FirstPlayerMode::Ai => false,
            FirstPlayerMode::Random => rng.random_bool(),
        };

        let (human_mark, ai_mark) = if human_first {
            (Mark::X, Mark::O)
        } else {
            (Mark::O, Mark::X)
        };

        Self {
            board: Board::new(),
            human_mark,
            ai_mark,
            current_mark: Mark::X,
            outcome: Outcome::InProgress,
            last_move: None,
            last_ai_move: None,
        }
    }

    pub fn reset(&mut self, first_player_mode: FirstPlayerMode, rng: &mut SessionRng) {
        *self = Self::new(first_player_mode, rng);
    }

    pub fn status(&self) -> GameStatus {
        match self.outcome {
            Outcome::InProgress => GameStatus::InProgress,
            Outcome::Draw => GameStatus::Draw,
            Outcome::Win(line) if line.mark == self.human_mark => GameStatus::HumanWon,
            Outcome::Win(_) => GameStatus::AiWon,
        }
    }

    /// Marks placed this round, by either side.
    pub fn move_count(&self) -> usize {
        self.board.occupied_count()
    }

    pub fn is_ai_turn(&self) -> bool {
        !self.outcome.is_decided() && self.current_mark == self.ai_mark
    }

    pub fn place_mark(&mut self, mark: Mark, index: usize) -> Result<Outcome, String> {
        if self.outcome.is_decided() {
            return Err("Game is already over".to_string());
        }

        if mark != self.current_mark {
            return Err("Not your turn".to_string());
        }

        self.board.set(index, mark)?;
        self.last_move = Some(index);
        self.outcome = evaluate(&self.board);

        if let Some(next) = mark.opponent() {
            self.current_mark = next;
        }

        Ok(self.outcome)
    }

    pub fn place_human_mark(&mut self, index: usize) -> Result<Outcome, String> {
        self.place_mark(self.human_mark, index)
    }

    /// Lets the AI answer; `Ok(None)` when it is not the AI's turn to move.
    pub fn apply_ai_move(&mut self, rng: &mut SessionRng) -> Result<Option<usize>, String> {
        if !self.is_ai_turn() {
            return Ok(None);
        }

        let Some(index) = select_move(&self.board, self.ai_mark, self.human_mark, rng)? else {
            return Ok(None);
        };

        self.place_mark(self.ai_mark, index)?;
        self.last_ai_move = Some(index);
        Ok(Some(index))
    }
}
