use std::io::{stdout, Stdout, Write, Result};

use crossterm::{cursor, terminal, ExecutableCommand};
use log::LevelFilter;

use super::error::LiftError;
use super::snapshot::LiftSnapshot;

/// Log lines share the terminal with the status table, which redraws a
/// fixed number of rows, so only warnings and errors are shown unless
/// `RUST_LOG` asks for more.
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

/// rows drawn besides the floor rows
const FIXED_ROWS: u16 = 19;

pub struct Debug {
    stdout: Stdout,
    num_floors: u8,
    drawn: bool,
    last_snapshot: Option<LiftSnapshot>,
    last_error: Option<String>,
}

impl Debug {
    pub fn new(num_floors: u8) -> Self {
        Debug {
            stdout: stdout(),
            num_floors: num_floors,
            drawn: false,
            last_snapshot: None,
            last_error: None,
        }
    }

    fn status_size(&self) -> u16 {
        FIXED_ROWS + 2 * self.num_floors as u16
    }

    pub fn printstatus(&mut self, snapshot: &LiftSnapshot) -> Result<()> {
        if self.drawn {
            self.stdout.execute(cursor::MoveUp(self.status_size()))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        self.drawn = true;

        writeln!(self.stdout, "+-------------------------------------------------------+")?;
        writeln!(self.stdout, "| LIFT                                                  |")?;
        writeln!(self.stdout, "+------------+--------------------+---------------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<18} | {2:<19} |", "FLOOR", "CABIN", "WAITING")?;
        for floor in (0..snapshot.num_floors()).rev() {
            writeln!(self.stdout, "+------------+--------------------+---------------------+")?;
            let cabin = if floor == snapshot.floor as usize {
                format!("[{}]", list_persons(&snapshot.occupants))
            } else {
                String::new()
            };
            let waiting = list_persons(&snapshot.floor_queues[floor]);
            writeln!(self.stdout, "| {0:<10} | {1:<18} | {2:<19} |", floor, cabin, waiting)?;
        }
        writeln!(self.stdout, "+------------+--------------------+---------------------+\n\n")?;

        writeln!(self.stdout, "+-------------------------+")?;
        writeln!(self.stdout, "| STATE MACHINE           |")?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "STATE", snapshot.phase.as_string())?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "FLOOR", snapshot.floor)?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "DIRECTION", snapshot.direction.as_string())?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "| {0:<10} | {1:<10} |", "PASSENGERS", snapshot.occupants.len())?;
        writeln!(self.stdout, "+------------+------------+")?;
        writeln!(self.stdout, "{}", self.last_error.as_deref().unwrap_or(""))?;
        self.last_snapshot = Some(snapshot.clone());
        self.stdout.flush()
    }

    /// Shows `error` below the status table until the next error replaces it.
    pub fn show_error(&mut self, error: &LiftError) -> Result<()> {
        self.last_error = Some(format!("ERROR: {}", error));
        match self.last_snapshot.take() {
            Some(snapshot) => self.printstatus(&snapshot),
            None => {
                writeln!(self.stdout, "ERROR: {}", error)?;
                self.stdout.flush()
            },
        }
    }
}

/// "id->destination" for each person, comma separated
fn list_persons(persons: &[(usize, u8)]) -> String {
    persons.iter()
        .map(|(id, to_floor)| format!("{}->{}", id, to_floor))
        .collect::<Vec<String>>()
        .join(",")
}
