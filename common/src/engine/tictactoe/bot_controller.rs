use crate::engine::SessionRng;
use super::board::Board;
use super::types::{Mark, Outcome};
use super::win_detector::evaluate;

const WIN_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub index: usize,
    pub score: i32,
}

/// Picks the AI move by exhaustive minimax. Equally scored moves are broken
/// uniformly at random through `rng`, so a seeded rng makes the choice reproducible.
pub fn select_move(
    board: &Board,
    ai_mark: Mark,
    human_mark: Mark,
    rng: &mut SessionRng,
) -> Result<Option<usize>, String> {
    let scored = score_moves(board, ai_mark, human_mark)?;

    let Some(best_score) = scored.iter().map(|m| m.score).max() else {
        return Ok(None);
    };

    let best_moves: Vec<usize> = scored
        .iter()
        .filter(|m| m.score == best_score)
        .map(|m| m.index)
        .collect();

    Ok(rng.pick(&best_moves).copied())
}

/// Root minimax score of every empty cell, in index order.
pub fn score_moves(
    board: &Board,
    ai_mark: Mark,
    human_mark: Mark,
) -> Result<Vec<ScoredMove>, String> {
    validate_marks(ai_mark, human_mark)?;

    let scored = board
        .available_moves()
        .into_iter()
        .map(|index| {
            let next = board.with_mark(index, ai_mark);
            let score = minimax(&next, 0, false, ai_mark, human_mark);
            ScoredMove { index, score }
        })
        .collect();

    Ok(scored)
}

fn validate_marks(ai_mark: Mark, human_mark: Mark) -> Result<(), String> {
    if ai_mark == Mark::Empty || human_mark == Mark::Empty {
        return Err("AI and human marks must be X or O".to_string());
    }
    if ai_mark == human_mark {
        return Err(format!(
            "AI and human marks must differ, both are {}",
            ai_mark.as_str()
        ));
    }
    Ok(())
}

fn minimax(
    board: &Board,
    depth: i32,
    is_maximizing: bool,
    ai_mark: Mark,
    human_mark: Mark,
) -> i32 {
    match evaluate(board) {
        Outcome::Win(line) if line.mark == ai_mark => return WIN_SCORE - depth,
        Outcome::Win(_) => return depth - WIN_SCORE,
        Outcome::Draw => return 0,
        Outcome::InProgress => {}
    }

    let moves = board.available_moves();

    if is_maximizing {
        moves
            .into_iter()
            .map(|index| {
                let next = board.with_mark(index, ai_mark);
                minimax(&next, depth + 1, false, ai_mark, human_mark)
            })
            .max()
            .unwrap_or(0)
    } else {
        moves
            .into_iter()
            .map(|index| {
                let next = board.with_mark(index, human_mark);
                minimax(&next, depth + 1, true, ai_mark, human_mark)
            })
            .min()
            .unwrap_or(0)
    }
}
