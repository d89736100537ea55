use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tch::{
    nn::{linear, Linear, Module, Path},
    Device, Tensor,
};
use tictactoe_core::board::{Board, CELL_COUNT, ENCODED_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_channels: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_channels: 64,
        }
    }
}

/// Action-value approximator: 27 one-hot inputs to 9 action values.
#[derive(Debug)]
pub struct Model {
    device: Device,
    config: ModelConfig,
    fc0: Linear,
    fc1: Linear,
    fc2: Linear,
}

impl Model {
    pub fn new<'a>(vs: impl Borrow<Path<'a>>, config: ModelConfig) -> Self {
        let vs = vs.borrow();
        let hidden = config.hidden_channels as i64;
        let fc0 = linear(vs / "fc0", ENCODED_LEN as i64, hidden, Default::default());
        let fc1 = linear(vs / "fc1", hidden, hidden, Default::default());
        let fc2 = linear(vs / "fc2", hidden, CELL_COUNT as i64, Default::default());

        Self {
            device: vs.device(),
            config,
            fc0,
            fc1,
            fc2,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl Module for Model {
    fn forward(&self, xs: &Tensor) -> Tensor {
        xs.to_device(self.device)
            .view([-1, ENCODED_LEN as i64])
            .apply(&self.fc0)
            .relu()
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
    }
}

/// Stacks the one-hot encodings of `boards` into a `[n, 27]` float tensor.
pub fn encode_batched_board(boards: &[&Board]) -> Tensor {
    let mut data = Vec::with_capacity(boards.len() * ENCODED_LEN);

    for board in boards {
        data.extend_from_slice(&board.encode());
    }

    Tensor::from_slice(&data).view([boards.len() as i64, ENCODED_LEN as i64])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::nn::VarStore;
    use tictactoe_core::board::Cell;

    #[test]
    fn test_encode_batched_board() {
        let mut board = Board::new();
        board.set_cell(0, Cell::Ai);
        board.set_cell(4, Cell::Player);
        let empty = Board::new();

        let encoded = encode_batched_board(&[&board, &empty]);

        assert_eq!(encoded.size(), &[2, 27]);
        assert_eq!(encoded.double_value(&[0, 2]), 1.0);
        assert_eq!(encoded.double_value(&[0, 0]), 0.0);
        assert_eq!(encoded.double_value(&[0, 13]), 1.0);
        assert_eq!(encoded.double_value(&[1, 0]), 1.0);
        assert_eq!(encoded.sum(tch::Kind::Float).double_value(&[]), 18.0);
    }

    #[test]
    fn test_model_cpu() {
        let vs = VarStore::new(Device::Cpu);
        let model = Model::new(vs.root(), ModelConfig { hidden_channels: 16 });

        let batch = 8;
        let xs = Tensor::randn([batch, 27], tch::kind::FLOAT_CPU);
        let q = model.forward(&xs);

        assert_eq!(q.size(), &[batch, 9]);
    }
}
