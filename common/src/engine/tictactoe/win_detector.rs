use super::board::Board;
use super::types::{Line, Mark, Outcome, WinningLine};

pub const LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// First completed line in `LINES` order wins; a full board without one is a draw.
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(line) = check_win_with_line(board) {
        return Outcome::Win(line);
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

pub fn check_win(board: &Board) -> Option<Mark> {
    check_win_with_line(board).map(|line| line.mark)
}

pub fn check_win_with_line(board: &Board) -> Option<WinningLine> {
    let cells = board.cells();

    for line in LINES {
        let [a, b, c] = line;
        let mark = cells[a];
        if mark != Mark::Empty && mark == cells[b] && mark == cells[c] {
            return Some(WinningLine::new(mark, line));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: Mark = Mark::Empty;
    const X: Mark = Mark::X;
    const O: Mark = Mark::O;

    fn board(cells: [Mark; 9]) -> Board {
        Board::from_cells(&cells).unwrap()
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_every_line_is_detected_for_both_marks() {
        for mark in [X, O] {
            for line in LINES {
                let mut cells = [E; 9];
                for index in line {
                    cells[index] = mark;
                }
                let outcome = evaluate(&board(cells));
                assert_eq!(outcome, Outcome::Win(WinningLine::new(mark, line)));
            }
        }
    }

    #[test]
    fn test_winner_reported_with_opponent_marks_present() {
        let outcome = evaluate(&board([
            O, X, E,
            O, X, E,
            E, X, O,
        ]));
        assert_eq!(outcome.winner(), Some(X));
        assert_eq!(outcome.winning_line(), Some([1, 4, 7]));
    }

    #[test]
    fn test_win_on_full_board_is_not_a_draw() {
        let outcome = evaluate(&board([
            X, O, X,
            O, X, O,
            O, X, X,
        ]));
        assert_eq!(outcome.winner(), Some(X));
        assert_eq!(outcome.winning_line(), Some([0, 4, 8]));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let outcome = evaluate(&board([
            X, O, X,
            O, X, O,
            O, X, O,
        ]));
        assert_eq!(outcome, Outcome::Draw);
        assert!(outcome.is_decided());
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn test_one_empty_cell_without_line_in_progress() {
        let outcome = evaluate(&board([
            X, O, X,
            O, X, O,
            O, X, E,
        ]));
        assert_eq!(outcome, Outcome::InProgress);
    }

    #[test]
    fn test_mixed_line_does_not_win() {
        assert_eq!(check_win(&board([X, X, O, E, E, E, E, E, E])), None);
    }
}
