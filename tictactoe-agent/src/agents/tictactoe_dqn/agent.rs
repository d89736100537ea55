use super::{
    model::{encode_batched_board, Model, ModelConfig},
    trainer::TicTacToeDqnTrainer,
};
use crate::{
    agent::{argmax, Agent, TrainReport},
    error::AgentError,
    replay::{ReplayBuffer, Transition},
};
use figment::Figment;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tch::{
    nn::{Adam, Module, Optimizer, OptimizerConfig, VarStore},
    no_grad,
    utils::{has_cuda, has_mps},
    Device, Reduction,
};
use tictactoe_core::board::{Board, CELL_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOptions {
    pub learning_rate: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    pub replay_buffer_size: usize,
    pub hidden_channels: usize,
    pub seed: Option<u64>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.999,
            epsilon_min: 0.01,
            replay_buffer_size: 2000,
            hidden_channels: ModelConfig::default().hidden_channels,
            seed: None,
        }
    }
}

/// Epsilon-greedy DQN agent over a single online network.
///
/// Targets are bootstrapped from the same network that is being trained.
pub struct TicTacToeDqnAgent {
    var_store: VarStore,
    model: Model,
    optimizer: Optimizer,
    options: AgentOptions,
    epsilon: f64,
    replay_buffer: ReplayBuffer,
    rng: StdRng,
}

impl TicTacToeDqnAgent {
    pub fn new(options: AgentOptions) -> Result<Self, AgentError> {
        Self::with_device(options, default_device())
    }

    pub fn with_device(options: AgentOptions, device: Device) -> Result<Self, AgentError> {
        if options.replay_buffer_size == 0 {
            return Err(AgentError::InvalidOptions(
                "replay_buffer_size must be positive".to_owned(),
            ));
        }

        if let Some(seed) = options.seed {
            tch::manual_seed(seed as i64);
        }

        let var_store = VarStore::new(device);
        let model = Model::new(
            var_store.root().sub("tictactoe-dqn-agent"),
            ModelConfig {
                hidden_channels: options.hidden_channels,
            },
        );
        let optimizer = Adam::default()
            .build(&var_store, options.learning_rate)
            .map_err(AgentError::Optimizer)?;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            var_store,
            model,
            optimizer,
            epsilon: options.epsilon,
            replay_buffer: ReplayBuffer::new(options.replay_buffer_size),
            options,
            rng,
        })
    }

    /// Builds an agent whose approximator is read from `path`.
    pub fn from_pretrained(path: &str, options: AgentOptions) -> Result<Self, AgentError> {
        let mut agent = Self::new(options)?;
        agent.load(path)?;
        Ok(agent)
    }

    pub fn var_store(&self) -> &VarStore {
        &self.var_store
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }

    /// Epsilon-greedy action selection over all nine cells.
    ///
    /// Occupied cells are not masked; illegal choices are punished by the
    /// environment instead.
    pub fn act(&mut self, board: &Board) -> usize {
        if self.rng.gen::<f64>() < self.epsilon {
            return self.rng.gen_range(0..CELL_COUNT);
        }

        argmax(&self.predict(board))
    }

    pub fn remember(&mut self, transition: Transition) {
        self.replay_buffer.push(transition);
    }

    /// Runs one optimization step on a uniformly sampled batch and decays epsilon.
    ///
    /// Does nothing and returns `None` while the buffer holds fewer than
    /// `batch_size` transitions. Otherwise returns the batch loss.
    pub fn replay(&mut self, batch_size: usize) -> Option<f64> {
        let batch = self.replay_buffer.sample(&mut self.rng, batch_size)?;

        let targets = loss::compute_targets(&self.model, &batch, self.options.gamma);
        let states = encode_batched_board(&Vec::from_iter(batch.iter().map(|t| &t.state)));

        self.optimizer.zero_grad();

        let q = self.model.forward(&states);
        let loss = q.mse_loss(&targets, Reduction::Mean);
        loss.backward();

        self.optimizer.step();

        self.epsilon = (self.epsilon * self.options.epsilon_decay).max(self.options.epsilon_min);

        Some(loss.double_value(&[]))
    }
}

impl Agent for TicTacToeDqnAgent {
    fn save(&self, path: &str) -> Result<(), AgentError> {
        self.var_store
            .save(path)
            .map_err(|source| AgentError::ModelSave {
                path: path.to_owned(),
                source,
            })
    }

    fn load(&mut self, path: &str) -> Result<(), AgentError> {
        self.var_store
            .load(path)
            .map_err(|source| AgentError::ModelLoad {
                path: path.to_owned(),
                source,
            })
    }

    fn predict(&self, board: &Board) -> [f32; CELL_COUNT] {
        let q = no_grad(|| self.model.forward(&encode_batched_board(&[board])));
        let mut values = [0f32; CELL_COUNT];

        for (index, value) in values.iter_mut().enumerate() {
            *value = q.double_value(&[0, index as i64]) as f32;
        }

        values
    }

    fn train(&mut self, episodes: usize, options: Figment) -> Result<TrainReport, AgentError> {
        let mut trainer = TicTacToeDqnTrainer;
        trainer.train(self, episodes, options)
    }
}

pub mod loss {
    use crate::{
        agents::tictactoe_dqn::model::{encode_batched_board, Model},
        replay::Transition,
    };
    use tch::{nn::Module, no_grad, Tensor};

    /// Regression targets for a batch: the current prediction for every slot,
    /// except the taken action which gets `r` on terminal transitions and
    /// `r + gamma * max Q(s')` otherwise.
    pub fn compute_targets(model: &Model, batch: &[&Transition], gamma: f64) -> Tensor {
        let states = encode_batched_board(&Vec::from_iter(batch.iter().map(|t| &t.state)));
        let next_states =
            encode_batched_board(&Vec::from_iter(batch.iter().map(|t| &t.next_state)));
        let actions = Tensor::from_slice(&Vec::from_iter(batch.iter().map(|t| t.action as i64)))
            .view([-1, 1])
            .to_device(model.device());
        let r = Tensor::from_slice(&Vec::from_iter(batch.iter().map(|t| t.reward as f32)))
            .to_device(model.device());
        let is_done = Tensor::from_slice(&Vec::from_iter(
            batch.iter().map(|t| if t.done { 1f32 } else { 0f32 }),
        ))
        .to_device(model.device());

        no_grad(|| {
            let q = model.forward(&states);
            let (next_q, _) = model.forward(&next_states).max_dim(1, false);
            let td_target = r + (1.0 - is_done) * gamma * next_q;
            q.scatter(1, &actions, &td_target.view([-1, 1]))
        })
    }
}

fn default_device() -> Device {
    if has_cuda() {
        Device::Cuda(0)
    } else if has_mps() {
        Device::Mps
    } else {
        Device::Cpu
    }
}
