use crate::{
    board::{Board, Side},
    oracle::Oracle,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// How the scripted opponent chooses its moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Uniformly random among empty cells.
    Random,
    /// Best move according to the [`Oracle`], ties broken by lowest index.
    Exact,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Random => "random",
            Difficulty::Exact => "exact",
        }
    }
}

pub trait Player {
    /// Picks a cell to mark, or `None` if the board has no empty cell.
    fn generate_move(&mut self, board: &Board) -> Option<usize>;
}

#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomPlayer {
    fn generate_move(&mut self, board: &Board) -> Option<usize> {
        board.legal_moves().choose(&mut self.rng).copied()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OraclePlayer {
    oracle: Oracle,
}

impl OraclePlayer {
    pub fn new(side: Side) -> Self {
        Self {
            oracle: Oracle::new(side),
        }
    }
}

impl Player for OraclePlayer {
    fn generate_move(&mut self, board: &Board) -> Option<usize> {
        self.oracle.best_move(board)
    }
}

/// The AI's adversary: plays `side` and switches strategy with the difficulty.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    side: Side,
    difficulty: Difficulty,
    random: RandomPlayer,
    exact: OraclePlayer,
}

impl ScriptedOpponent {
    pub fn new(side: Side, difficulty: Difficulty) -> Self {
        Self::with_random_player(side, difficulty, RandomPlayer::new())
    }

    pub fn with_random_player(side: Side, difficulty: Difficulty, random: RandomPlayer) -> Self {
        Self {
            side,
            difficulty,
            random,
            exact: OraclePlayer::new(side),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }
}

impl Player for ScriptedOpponent {
    fn generate_move(&mut self, board: &Board) -> Option<usize> {
        match self.difficulty {
            Difficulty::Random => self.random.generate_move(board),
            Difficulty::Exact => self.exact.generate_move(board),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_random_player_picks_empty_cells() {
        let mut player = RandomPlayer::with_seed(7);
        let mut board = Board::new();
        for index in [0, 2, 4, 6, 8] {
            board.set_cell(index, Cell::Ai);
        }

        for _ in 0..100 {
            let index = player.generate_move(&board).unwrap();
            assert!(board.cells()[index].is_empty());
        }
    }

    #[test]
    fn test_random_player_covers_all_empty_cells() {
        let mut player = RandomPlayer::with_seed(1);
        let board = Board::new();
        let mut seen = [false; 9];

        for _ in 0..500 {
            seen[player.generate_move(&board).unwrap()] = true;
        }

        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_no_move_on_full_board() {
        let board = Board::from_cells([Cell::Ai; 9]);
        let mut opponent = ScriptedOpponent::new(Side::Player, Difficulty::Random);
        assert_eq!(opponent.generate_move(&board), None);

        opponent.set_difficulty(Difficulty::Exact);
        assert_eq!(opponent.generate_move(&board), None);
    }

    #[test]
    fn test_exact_is_deterministic() {
        let mut board = Board::new();
        board.set_cell(4, Cell::Ai);

        let mut opponent = ScriptedOpponent::new(Side::Player, Difficulty::Exact);
        let first = opponent.generate_move(&board);

        // All corners draw; the lowest index wins the tie.
        assert_eq!(first, Some(0));
        for _ in 0..5 {
            assert_eq!(opponent.generate_move(&board), first);
        }
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::Random.name(), "random");
        assert_eq!(Difficulty::Exact.name(), "exact");
    }
}
