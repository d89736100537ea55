use crate::{agent::Agent, error::AgentError};
use figment::Figment;

pub trait AgentProvider {
    fn name(&self) -> String;
    fn create_agent(&self, options: &Figment) -> Result<Box<dyn Agent>, AgentError>;
}
