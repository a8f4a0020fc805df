pub mod config;
pub mod direction;
pub mod lift_message;
