use crate::{
    board::{Board, Cell, Side, CELL_COUNT},
    opponent::{Difficulty, Player, RandomPlayer, ScriptedOpponent},
};
use log::debug;
use std::fmt::Display;
use thiserror::Error;

pub const WIN_REWARD: i32 = 10;
pub const LOSS_REWARD: i32 = -10;
pub const ILLEGAL_MOVE_REWARD: i32 = -10;
pub const DRAW_REWARD: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    AiWin,
    PlayerWin,
    Draw,
    /// The AI targeted an occupied cell. The board is left as it was.
    IllegalMove,
}

impl Outcome {
    pub fn name(self) -> &'static str {
        match self {
            Outcome::AiWin => "ai wins",
            Outcome::PlayerWin => "player wins",
            Outcome::Draw => "draw",
            Outcome::IllegalMove => "illegal move",
        }
    }

    /// Terminal reward credited to the AI.
    pub fn reward(self) -> i32 {
        match self {
            Outcome::AiWin => WIN_REWARD,
            Outcome::PlayerWin => LOSS_REWARD,
            Outcome::Draw => DRAW_REWARD,
            Outcome::IllegalMove => ILLEGAL_MOVE_REWARD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepResult {
    /// The board after the AI's move and the opponent's reply.
    pub board: Board,
    pub reward: i32,
    pub done: bool,
    pub outcome: Option<Outcome>,
    /// The cell the opponent marked, if it moved.
    pub opponent_action: Option<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("invalid action {action} (max allowed: {max_allowed_action})")]
    InvalidAction {
        action: usize,
        max_allowed_action: usize,
    },
    #[error("game already finished ({})", outcome.name())]
    GameFinished { outcome: Outcome },
}

/// Turn-based environment: the AI moves through [`Game::step`], the scripted
/// opponent replies within the same call.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    outcome: Option<Outcome>,
    opponent: ScriptedOpponent,
}

impl Game {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_opponent(ScriptedOpponent::new(Side::Player, difficulty))
    }

    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_opponent(ScriptedOpponent::with_random_player(
            Side::Player,
            difficulty,
            RandomPlayer::with_seed(seed),
        ))
    }

    fn with_opponent(opponent: ScriptedOpponent) -> Self {
        Self {
            board: Board::new(),
            outcome: None,
            opponent,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.opponent.difficulty()
    }

    /// Takes effect from the opponent's next turn.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.opponent.set_difficulty(difficulty);
    }

    pub fn reset(&mut self) -> Board {
        self.board = Board::new();
        self.outcome = None;
        self.board
    }

    pub fn step(&mut self, action: usize) -> Result<StepResult, StepError> {
        if CELL_COUNT <= action {
            return Err(StepError::InvalidAction {
                action,
                max_allowed_action: CELL_COUNT - 1,
            });
        }

        if let Some(outcome) = self.outcome {
            return Err(StepError::GameFinished { outcome });
        }

        if !self.board.cells()[action].is_empty() {
            return Ok(self.finish(Outcome::IllegalMove, None));
        }

        self.board.set_cell(action, Side::Ai.into());

        if self.board.has_line(Side::Ai) {
            return Ok(self.finish(Outcome::AiWin, None));
        }

        if self.board.is_full() {
            return Ok(self.finish(Outcome::Draw, None));
        }

        let opponent_action = self.opponent.generate_move(&self.board);

        match opponent_action {
            Some(index) => {
                debug!(
                    "opponent ({}) marks {}",
                    self.opponent.difficulty().name(),
                    index
                );
                self.board.set_cell(index, Cell::from(self.opponent.side()));
            }
            None => debug!("opponent has no empty cell, skipping its turn"),
        }

        if self.board.has_line(self.opponent.side()) {
            return Ok(self.finish(Outcome::PlayerWin, opponent_action));
        }

        if self.board.is_full() {
            return Ok(self.finish(Outcome::Draw, opponent_action));
        }

        Ok(StepResult {
            board: self.board,
            reward: 0,
            done: false,
            outcome: None,
            opponent_action,
        })
    }

    fn finish(&mut self, outcome: Outcome, opponent_action: Option<usize>) -> StepResult {
        self.outcome = Some(outcome);

        StepResult {
            board: self.board,
            reward: outcome.reward(),
            done: true,
            outcome: Some(outcome),
            opponent_action,
        }
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "difficulty: {}", self.difficulty().name())?;
        writeln!(
            f,
            "state: {}",
            match self.outcome {
                Some(outcome) => outcome.name(),
                None if self.board.mark_count() == 0 => "empty",
                None => "in progress",
            }
        )?;
        write!(f, "{}", self.board)
    }
}
