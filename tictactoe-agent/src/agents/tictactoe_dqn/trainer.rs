use super::agent::TicTacToeDqnAgent;
use crate::{
    agent::{Agent, TrainReport},
    error::AgentError,
    replay::Transition,
};
use figment::Figment;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tictactoe_core::{
    game::{Game, Outcome},
    opponent::Difficulty,
};

pub struct TicTacToeDqnTrainer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    pub save_path: Option<String>,
    pub batch_size: usize,
    /// Episodes per curriculum block; blocks alternate random and exact opponents.
    pub difficulty_block: usize,
    pub max_plies: usize,
    pub log_interval: usize,
    /// Greedy games played after training.
    pub eval_games: usize,
    /// Opponent for those games. The exact opponent is deterministic, so
    /// against it every greedy game is the same game.
    pub eval_difficulty: Difficulty,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            save_path: None,
            batch_size: 32,
            difficulty_block: 20,
            max_plies: 9,
            log_interval: 10,
            eval_games: 0,
            eval_difficulty: Difficulty::Random,
        }
    }
}

/// Curriculum: even blocks play the random opponent, odd blocks the exact one.
pub fn difficulty_for_episode(episode: usize, block: usize) -> Difficulty {
    if (episode / block.max(1)) % 2 == 0 {
        Difficulty::Random
    } else {
        Difficulty::Exact
    }
}

impl TicTacToeDqnTrainer {
    pub fn train(
        &mut self,
        agent: &mut TicTacToeDqnAgent,
        episodes: usize,
        options: Figment,
    ) -> Result<TrainReport, AgentError> {
        let train_options: TrainOptions = options.extract()?;

        let mut game = match agent.options().seed {
            Some(seed) => Game::with_seed(Difficulty::Random, seed),
            None => Game::new(Difficulty::Random),
        };
        let mut report = TrainReport::default();
        let mut loss_visualizer = loss_visualizer::LossVisualizer::new();

        for episode in 0..episodes {
            let difficulty = difficulty_for_episode(episode, train_options.difficulty_block);

            if episode % train_options.difficulty_block.max(1) == 0 {
                info!("switching opponent difficulty to {}", difficulty.name());

                if 0 < episode {
                    save_checkpoint(agent, train_options.save_path.as_deref());
                }
            }

            game.set_difficulty(difficulty);

            let (total_reward, outcome) = play_episode(agent, &mut game, train_options.max_plies)?;

            match outcome {
                Some(Outcome::AiWin) => report.ai_wins += 1,
                Some(Outcome::PlayerWin) => report.player_wins += 1,
                Some(Outcome::Draw) => report.draws += 1,
                Some(Outcome::IllegalMove) => report.illegal_moves += 1,
                None => {}
            }

            if train_options.batch_size < agent.replay_buffer().len() {
                if let Some(loss) = agent.replay(train_options.batch_size) {
                    loss_visualizer.add(loss);
                }
            }

            if (episode + 1) % train_options.log_interval.max(1) == 0 {
                info!(
                    "episode: {}/{} ({}), reward: {}, epsilon: {:.2}, loss: {:.4}",
                    episode + 1,
                    episodes,
                    difficulty.name(),
                    total_reward,
                    agent.epsilon(),
                    loss_visualizer.mean()
                );
            }

            report.episodes += 1;
        }

        save_checkpoint(agent, train_options.save_path.as_deref());

        report.epsilon = agent.epsilon();
        report.mean_loss = if loss_visualizer.is_empty() {
            None
        } else {
            Some(loss_visualizer.mean())
        };

        info!(
            "training finished: ai wins: {}, player wins: {}, draws: {}, illegal moves: {}",
            report.ai_wins, report.player_wins, report.draws, report.illegal_moves
        );

        if 0 < train_options.eval_games {
            let (ai_wins, player_wins, draws, illegal_moves) = eval::evaluate_many(
                agent,
                train_options.eval_games,
                train_options.eval_difficulty,
            )?;
            info!(
                "evaluation vs {}: ai wins: {}, player wins: {}, draws: {}, illegal moves: {}",
                train_options.eval_difficulty.name(),
                ai_wins,
                player_wins,
                draws,
                illegal_moves
            );
        }

        eval::demonstrate(agent, Difficulty::Exact)?;

        Ok(report)
    }
}

/// Plays one exploring episode, recording every transition.
///
/// Returns the cumulative reward and the outcome, or `None` if the ply budget
/// ran out first.
fn play_episode(
    agent: &mut TicTacToeDqnAgent,
    game: &mut Game,
    max_plies: usize,
) -> Result<(i32, Option<Outcome>), AgentError> {
    let mut state = game.reset();
    let mut total_reward = 0;

    for _ in 0..max_plies {
        let action = agent.act(&state);
        let result = game.step(action)?;

        debug!("agent marks {}, reward: {}", action, result.reward);

        agent.remember(Transition {
            state,
            action,
            reward: result.reward,
            next_state: result.board,
            done: result.done,
        });

        state = result.board;
        total_reward += result.reward;

        if result.done {
            return Ok((total_reward, result.outcome));
        }
    }

    Ok((total_reward, None))
}

fn save_checkpoint(agent: &TicTacToeDqnAgent, save_path: Option<&str>) {
    if let Some(save_path) = save_path {
        if let Err(err) = agent.save(save_path) {
            warn!("failed to save agent: {}", err);
        }
    }
}

mod loss_visualizer {
    use std::collections::VecDeque;

    const WINDOW: usize = 100;

    /// Running mean over the most recent replay losses.
    pub struct LossVisualizer {
        window: VecDeque<f64>,
        sum: f64,
    }

    impl LossVisualizer {
        pub fn new() -> Self {
            Self {
                window: VecDeque::with_capacity(WINDOW),
                sum: 0.0,
            }
        }

        pub fn is_empty(&self) -> bool {
            self.window.is_empty()
        }

        pub fn add(&mut self, loss: f64) {
            if self.window.len() == WINDOW {
                if let Some(oldest) = self.window.pop_front() {
                    self.sum -= oldest;
                }
            }

            self.window.push_back(loss);
            self.sum += loss;
        }

        pub fn mean(&self) -> f64 {
            if self.window.is_empty() {
                0.0
            } else {
                self.sum / self.window.len() as f64
            }
        }
    }

}

pub mod eval {
    use crate::{agent::Agent, error::AgentError};
    use log::info;
    use tictactoe_core::{
        board::{Board, CELL_COUNT},
        game::{Game, Outcome},
        opponent::Difficulty,
    };

    /// One greedy move and the opponent's reply, if any.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Ply {
        pub action: usize,
        pub opponent_action: Option<usize>,
        pub board: Board,
    }

    #[derive(Debug, Clone)]
    pub struct GameRecord {
        pub game: Game,
        pub outcome: Option<Outcome>,
        pub plies: Vec<Ply>,
    }

    /// Plays `n` greedy games and counts (ai wins, player wins, draws, illegal moves).
    pub fn evaluate_many(
        agent: &dyn Agent,
        n: usize,
        difficulty: Difficulty,
    ) -> Result<(usize, usize, usize, usize), AgentError> {
        let mut ai_wins = 0;
        let mut player_wins = 0;
        let mut draws = 0;
        let mut illegal_moves = 0;

        for _ in 0..n {
            match evaluate(agent, difficulty)?.outcome {
                Some(Outcome::AiWin) => ai_wins += 1,
                Some(Outcome::PlayerWin) => player_wins += 1,
                Some(Outcome::Draw) => draws += 1,
                Some(Outcome::IllegalMove) => illegal_moves += 1,
                None => {}
            }
        }

        Ok((ai_wins, player_wins, draws, illegal_moves))
    }

    /// Plays one game with exploration disabled.
    pub fn evaluate(agent: &dyn Agent, difficulty: Difficulty) -> Result<GameRecord, AgentError> {
        let mut game = Game::new(difficulty);
        let mut board = game.reset();
        let mut plies = Vec::with_capacity(CELL_COUNT);

        for _ in 0..CELL_COUNT {
            let action = agent.next_move(&board);
            let result = game.step(action)?;
            board = result.board;

            plies.push(Ply {
                action,
                opponent_action: result.opponent_action,
                board,
            });

            if result.done {
                return Ok(GameRecord {
                    game,
                    outcome: result.outcome,
                    plies,
                });
            }
        }

        Ok(GameRecord {
            game,
            outcome: None,
            plies,
        })
    }

    /// Plays one greedy game and logs every ply.
    pub fn demonstrate(agent: &dyn Agent, difficulty: Difficulty) -> Result<GameRecord, AgentError> {
        let record = evaluate(agent, difficulty)?;

        info!("demonstration game vs {}", difficulty.name());

        for (index, ply) in record.plies.iter().enumerate() {
            match ply.opponent_action {
                Some(reply) => info!(
                    "ply {}: agent marks {}, opponent replies {}\n{}",
                    index + 1,
                    ply.action,
                    reply,
                    ply.board
                ),
                None => info!(
                    "ply {}: agent marks {}\n{}",
                    index + 1,
                    ply.action,
                    ply.board
                ),
            }
        }

        info!(
            "demonstration result: {}",
            record.outcome.map(Outcome::name).unwrap_or("unfinished")
        );

        Ok(record)
    }
}
