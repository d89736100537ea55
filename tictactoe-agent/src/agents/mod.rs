pub mod tictactoe_dqn;
