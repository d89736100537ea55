use tch::TchError;
use thiserror::Error;
use tictactoe_core::game::StepError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to load model from {path}")]
    ModelLoad {
        path: String,
        #[source]
        source: TchError,
    },
    #[error("failed to save model to {path}")]
    ModelSave {
        path: String,
        #[source]
        source: TchError,
    },
    #[error("failed to build optimizer")]
    Optimizer(#[source] TchError),
    #[error("invalid configuration")]
    Config(#[from] figment::Error),
    #[error("invalid agent options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Step(#[from] StepError),
}
