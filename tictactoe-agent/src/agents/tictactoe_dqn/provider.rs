use super::agent::{AgentOptions, TicTacToeDqnAgent};
use crate::{agent::Agent, agent_provider::AgentProvider, error::AgentError};
use figment::Figment;

pub struct TicTacToeDqnProvider;

impl AgentProvider for TicTacToeDqnProvider {
    fn name(&self) -> String {
        "tictactoe-dqn".to_owned()
    }

    fn create_agent(&self, options: &Figment) -> Result<Box<dyn Agent>, AgentError> {
        let options: AgentOptions = options.extract()?;
        Ok(Box::new(TicTacToeDqnAgent::new(options)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        providers::{Format, Toml},
        Jail,
    };

    #[test]
    fn test_create_agent_from_config() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "hidden_channels = 8\nseed = 3\n")?;
            let options = Figment::new().merge(Toml::file("config.toml"));

            let agent = TicTacToeDqnProvider
                .create_agent(&options)
                .map_err(|err| err.to_string())?;
            let values = agent.predict(&Default::default());
            assert!(values.iter().all(|v| v.is_finite()));

            Ok(())
        });
    }

    #[test]
    fn test_zero_replay_buffer_size_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "replay_buffer_size = 0\n")?;
            let options = Figment::new().merge(Toml::file("config.toml"));

            let result = TicTacToeDqnProvider.create_agent(&options);
            assert!(matches!(result, Err(AgentError::InvalidOptions(_))));

            Ok(())
        });
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "gamma = \"high\"\n")?;
            let options = Figment::new().merge(Toml::file("config.toml"));

            let result = TicTacToeDqnProvider.create_agent(&options);
            assert!(matches!(result, Err(AgentError::Config(_))));

            Ok(())
        });
    }
}
