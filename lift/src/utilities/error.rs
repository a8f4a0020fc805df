use thiserror::Error;

use shared_resources::config::ConfigError;

#[derive(Debug, Error)]
pub enum LiftError {
    #[error("unknown command \"{0}\", try \"new\" or \"exit\"")]
    InvalidCommand(String),
    #[error("cannot create more persons, the maximum is {max}")]
    CapacityExceeded { max: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("the {0} channel was closed")]
    Disconnected(&'static str),
}
