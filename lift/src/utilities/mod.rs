pub mod debug;
pub mod error;
pub mod lift_state;
pub mod snapshot;
pub mod user_command;
