use crate::board::{Board, Cell, Side, CELL_COUNT};

/// Score reported for an occupied cell. Never selected by an argmax over legal moves.
pub const ILLEGAL_SCORE: i32 = -999;
pub const WIN_SCORE: i32 = 10;

/// Exhaustive minimax solver over the 3x3 board.
///
/// The oracle is configured with the side it maximizes for, so the same solver
/// can play as the AI's adversary or evaluate positions from the AI's point of
/// view. Scores are depth-aware: a win found `depth` plies into the search is
/// worth `10 - depth`, a loss `-10 + depth`, and a draw `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Oracle {
    maximizer: Side,
}

impl Oracle {
    pub fn new(maximizer: Side) -> Self {
        Self { maximizer }
    }

    pub fn maximizer(&self) -> Side {
        self.maximizer
    }

    pub fn minimizer(&self) -> Side {
        self.maximizer.opponent()
    }

    /// Scores every cell for the maximizing side to move.
    ///
    /// Occupied cells score [`ILLEGAL_SCORE`]. The caller's board is never
    /// touched; all apply/undo work happens on one scratch copy.
    pub fn scores(&self, board: &Board) -> [i32; CELL_COUNT] {
        let mut scratch = *board;
        let mut scores = [ILLEGAL_SCORE; CELL_COUNT];

        for (index, score) in scores.iter_mut().enumerate() {
            if !scratch.cells()[index].is_empty() {
                continue;
            }

            scratch.set_cell(index, self.maximizer.into());
            *score = self.solve(&mut scratch, 0, false);
            scratch.set_cell(index, Cell::Empty);
        }

        debug_assert_eq!(&scratch, board, "scratch board was not restored");

        scores
    }

    /// Index of the best-scoring cell, ties broken by lowest index.
    ///
    /// Returns `None` if the board has no empty cell.
    pub fn best_move(&self, board: &Board) -> Option<usize> {
        let scores = self.scores(board);
        let mut best: Option<(usize, i32)> = None;

        for (index, &score) in scores.iter().enumerate() {
            if !board.cells()[index].is_empty() {
                continue;
            }

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((index, score)),
            }
        }

        best.map(|(index, _)| index)
    }

    fn solve(&self, board: &mut Board, depth: i32, maximizing: bool) -> i32 {
        if board.has_line(self.maximizer) {
            return WIN_SCORE - depth;
        }

        if board.has_line(self.minimizer()) {
            return -WIN_SCORE + depth;
        }

        if board.is_full() {
            return 0;
        }

        let (mover, mut best) = if maximizing {
            (self.maximizer, i32::MIN)
        } else {
            (self.minimizer(), i32::MAX)
        };

        for index in 0..CELL_COUNT {
            if !board.cells()[index].is_empty() {
                continue;
            }

            board.set_cell(index, mover.into());
            let score = self.solve(board, depth + 1, !maximizing);
            board.set_cell(index, Cell::Empty);

            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(symbols: &str) -> Board {
        let mut board = Board::new();
        for (index, c) in symbols.chars().enumerate() {
            let cell = match c {
                'X' => Cell::Ai,
                'O' => Cell::Player,
                _ => Cell::Empty,
            };
            board.set_cell(index, cell);
        }
        board
    }

    /// Collects every board reachable from the empty board with alternating
    /// play, either side moving first, stopping at wins and full boards.
    fn reachable_boards() -> Vec<Board> {
        fn walk(board: &mut Board, mover: Side, out: &mut Vec<Board>) {
            out.push(*board);

            if board.winner().is_some() || board.is_full() {
                return;
            }

            for index in board.legal_moves() {
                board.set_cell(index, mover.into());
                walk(board, mover.opponent(), out);
                board.set_cell(index, Cell::Empty);
            }
        }

        let mut out = Vec::new();
        walk(&mut Board::new(), Side::Ai, &mut out);
        walk(&mut Board::new(), Side::Player, &mut out);
        out.sort_by_key(|board| board.cells().map(|cell| cell as u8));
        out.dedup();
        out
    }

    #[test]
    fn test_empty_board_is_a_draw_for_either_side() {
        let board = Board::new();

        for side in [Side::Ai, Side::Player] {
            let scores = Oracle::new(side).scores(&board);
            assert_eq!(scores, [0; CELL_COUNT], "maximizer: {}", side.name());
        }
    }

    #[test]
    fn test_immediate_win_scores_highest() {
        let board = board_from("XX..O....");
        let scores = Oracle::new(Side::Ai).scores(&board);

        assert_eq!(scores[2], WIN_SCORE);
        for (index, &score) in scores.iter().enumerate() {
            if index != 2 {
                assert!(score < scores[2], "index {index} scored {score}");
            }
        }
        assert_eq!(scores[0], ILLEGAL_SCORE);
        assert_eq!(scores[1], ILLEGAL_SCORE);
        assert_eq!(scores[4], ILLEGAL_SCORE);
    }

    #[test]
    fn test_immediate_win_outscores_every_other_move() {
        // Player to move wins at 6; any other win is at least two plies away.
        let board = board_from("O.XO.X.X.");
        let scores = Oracle::new(Side::Player).scores(&board);

        assert_eq!(scores[6], WIN_SCORE);
        assert!(scores.iter().enumerate().all(|(i, &s)| i == 6 || s < WIN_SCORE));
    }

    #[test]
    fn test_blocking_is_required() {
        // AI threatens 0-1-2; every player move except 2 loses at depth 1.
        let board = board_from("XX..O....");
        let scores = Oracle::new(Side::Player).scores(&board);

        for (index, &score) in scores.iter().enumerate() {
            if board.cells()[index].is_empty() && index != 2 {
                assert_eq!(score, -WIN_SCORE + 1, "index {index}");
            }
        }
        assert!(scores[2] > -WIN_SCORE + 1);
        assert_eq!(Oracle::new(Side::Player).best_move(&board), Some(2));
    }

    #[test]
    fn test_best_move_breaks_ties_by_lowest_index() {
        assert_eq!(Oracle::new(Side::Player).best_move(&Board::new()), Some(0));
    }

    #[test]
    fn test_best_move_on_full_board() {
        let board = board_from("XOXXOOOXX");
        assert_eq!(Oracle::new(Side::Ai).best_move(&board), None);
        assert_eq!(Oracle::new(Side::Ai).scores(&board), [ILLEGAL_SCORE; CELL_COUNT]);
    }

    #[test]
    fn test_reachable_boards() {
        let boards = reachable_boards();
        let oracle = Oracle::new(Side::Ai);

        for board in boards.iter().filter(|board| board.mark_count() >= 2) {
            assert!(
                !(board.has_line(Side::Ai) && board.has_line(Side::Player)),
                "both sides win on\n{}",
                board
            );

            let before = *board;
            let scores = oracle.scores(board);
            assert_eq!(&before, board);

            for (index, cell) in board.cells().iter().enumerate() {
                if !cell.is_empty() {
                    assert_eq!(scores[index], ILLEGAL_SCORE);
                } else {
                    assert!((-WIN_SCORE..=WIN_SCORE).contains(&scores[index]));
                }
            }
        }
    }
}
