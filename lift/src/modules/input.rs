/// ----- INPUT MODULE -----
/// Reads user commands from standard input, one per line, and hands them
/// to the main thread. Closing the input counts as "exit".

use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::utilities::error::LiftError;
use crate::utilities::user_command::UserCommand;

pub fn init() -> io::Result<Receiver<Result<UserCommand, LiftError>>> {
    let (user_command_tx, user_command_rx) = unbounded();
    thread::Builder::new().name("user_commands".to_string()).spawn(move || {
        let stdin = io::stdin();
        read_commands(stdin.lock(), &user_command_tx);
    })?;
    Ok(user_command_rx)
}

pub fn read_commands<R: BufRead>(input: R, user_command_tx: &Sender<Result<UserCommand, LiftError>>) {
    for line in input.lines() {
        let command = match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => UserCommand::parse(&line),
            Err(e) => Err(LiftError::Io(e)),
        };
        if user_command_tx.send(command).is_err() {
            return
        }
    }
    user_command_tx.send(Ok(UserCommand::Exit)).ok();
}
