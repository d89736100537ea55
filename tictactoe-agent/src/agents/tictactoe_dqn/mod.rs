mod agent;
mod model;
mod provider;
mod trainer;

pub use agent::{AgentOptions, TicTacToeDqnAgent};
pub use model::{encode_batched_board, Model, ModelConfig};
pub use provider::TicTacToeDqnProvider;
pub use trainer::{difficulty_for_episode, eval, TicTacToeDqnTrainer, TrainOptions};
