mod board;
mod bot_controller;
mod game_state;
mod types;
mod win_detector;

pub use board::{Board, BOARD_SIZE, CELL_COUNT};
pub use bot_controller::{score_moves, select_move, ScoredMove};
pub use game_state::{GameStatus, TicTacToeGameState};
pub use types::{FirstPlayerMode, Line, Mark, Outcome, WinningLine};
pub use win_detector::{check_win, check_win_with_line, evaluate, LINES};
