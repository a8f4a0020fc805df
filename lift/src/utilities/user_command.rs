use super::error::LiftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// create one more person
    New,
    /// stop the whole program
    Exit,
}

impl UserCommand {
    pub fn parse(message: &str) -> Result<Self, LiftError> {
        match message.trim() {
            "new" => Ok(UserCommand::New),
            "exit" => Ok(UserCommand::Exit),
            other => Err(LiftError::InvalidCommand(other.to_string())),
        }
    }
}
