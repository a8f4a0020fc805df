// ----- LIFT MESSAGES -----
// Messages exchanged between the lift thread, the mover thread and the
// passenger threads when running without shared memory.

pub type PersonId = usize;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftMessage {
    /// Sent to the lift when a person wants to travel.
    Travel { person_id: PersonId, from_floor: u8, to_floor: u8 },
    /// Sent to a person when it has left the lift at `floor`.
    TravelDone { person_id: PersonId, floor: u8 },
    /// Sent to the lift when it shall move to the next floor.
    Move,
}

impl LiftMessage {
    pub fn person_id(&self) -> Option<PersonId> {
        match self {
            LiftMessage::Travel { person_id, .. } => Some(*person_id),
            LiftMessage::TravelDone { person_id, .. } => Some(*person_id),
            LiftMessage::Move => None,
        }
    }
}
