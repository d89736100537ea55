pub mod agent;
pub mod agent_provider;
pub mod agents;
pub mod error;
pub mod replay;
