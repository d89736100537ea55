use rand::{seq::index, Rng};
use tictactoe_core::board::Board;

/// One agent decision, recorded after the environment step resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: Board,
    pub action: usize,
    pub reward: i32,
    pub next_state: Board,
    pub done: bool,
}

/// Fixed-capacity ring buffer of transitions.
///
/// Once full, each push overwrites the oldest entry in place.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
}

impl ReplayBuffer {
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(0 < capacity, "replay buffer capacity must be positive");

        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }

        self.position = (self.position + 1) % self.capacity;
    }

    /// Iterates from the oldest to the newest transition.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        let (newer, older) = if self.buffer.len() < self.capacity {
            (&self.buffer[..], &self.buffer[..0])
        } else {
            self.buffer.split_at(self.position)
        };

        older.iter().chain(newer.iter())
    }

    /// Samples `batch_size` distinct transitions uniformly.
    ///
    /// Returns `None` if fewer than `batch_size` transitions are stored.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Option<Vec<&Transition>> {
        if self.buffer.len() < batch_size {
            return None;
        }

        let indices = index::sample(rng, self.buffer.len(), batch_size);
        Some(indices.iter().map(|i| &self.buffer[i]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn transition(action: usize) -> Transition {
        Transition {
            state: Board::new(),
            action,
            reward: 0,
            next_state: Board::new(),
            done: false,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = ReplayBuffer::new(10);
        assert!(buffer.is_empty());

        buffer.push(transition(0));
        assert_eq!(buffer.len(), 1);

        for i in 0..20 {
            buffer.push(transition(i));
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn test_evicts_only_the_oldest() {
        let capacity = 2000;
        let mut buffer = ReplayBuffer::new(capacity);

        for i in 0..=capacity {
            buffer.push(transition(i));
        }

        assert_eq!(buffer.len(), capacity);
        let actions: Vec<usize> = buffer.iter().map(|t| t.action).collect();
        assert_eq!(actions, (1..=capacity).collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_before_full() {
        let mut buffer = ReplayBuffer::new(5);
        for i in 0..3 {
            buffer.push(transition(i));
        }

        let actions: Vec<usize> = buffer.iter().map(|t| t.action).collect();
        assert_eq!(actions, vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..50 {
            buffer.push(transition(i));
        }

        let batch = buffer.sample(&mut rng, 32).unwrap();
        assert_eq!(batch.len(), 32);

        let distinct: HashSet<usize> = batch.iter().map(|t| t.action).collect();
        assert_eq!(distinct.len(), 32);
    }

    #[test]
    fn test_sample_too_many() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut buffer = ReplayBuffer::new(10);
        buffer.push(transition(0));

        assert!(buffer.sample(&mut rng, 2).is_none());
    }
}
