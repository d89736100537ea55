use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use log::info;
use std::{error::Error, path::Path};
use tictactoe_agent::{agent_provider::AgentProvider, agents::tictactoe_dqn::TicTacToeDqnProvider};

const AGENT_PATH: &str = "agents/tictactoe";
const EPISODES: usize = 5000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Figment::new()
        .merge(Toml::file(format!("{AGENT_PATH}/config.toml")))
        .merge(Env::prefixed("TICTACTOE_"));
    let model_path = format!("{AGENT_PATH}/agent.safetensors");

    let provider = TicTacToeDqnProvider;
    let mut agent = provider.create_agent(&config)?;

    if Path::new(&model_path).exists() {
        agent.load(&model_path)?;
        info!("resumed {} from {}", provider.name(), model_path);
    }

    let report = agent.train(EPISODES, config)?;
    info!(
        "trained {} episodes, final epsilon: {:.3}",
        report.episodes, report.epsilon
    );

    std::fs::create_dir_all(AGENT_PATH)?;
    agent.save(&model_path)?;
    info!("model saved to {}", model_path);

    Ok(())
}
