use crate::error::AgentError;
use figment::Figment;
use tictactoe_core::board::{Board, CELL_COUNT};

/// Outcome counts and final state of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub episodes: usize,
    pub ai_wins: usize,
    pub player_wins: usize,
    pub draws: usize,
    pub illegal_moves: usize,
    pub epsilon: f64,
    /// Mean of the most recent replay losses, if any update ran.
    pub mean_loss: Option<f64>,
}

pub trait Agent {
    fn save(&self, path: &str) -> Result<(), AgentError>;
    fn load(&mut self, path: &str) -> Result<(), AgentError>;
    /// Predicted action values for every cell. Never mutates the approximator.
    fn predict(&self, board: &Board) -> [f32; CELL_COUNT];
    fn train(&mut self, episodes: usize, options: Figment) -> Result<TrainReport, AgentError>;

    /// Greedy choice over all cells, ties broken by lowest index.
    fn next_move(&self, board: &Board) -> usize {
        argmax(&self.predict(board))
    }
}

/// Index of the first maximal value.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;

    for (index, &value) in values.iter().enumerate().skip(1) {
        if values[best] < value {
            best = index;
        }
    }

    best
}
