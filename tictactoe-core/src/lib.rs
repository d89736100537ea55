pub mod board;
pub mod game;
pub mod opponent;
pub mod oracle;
