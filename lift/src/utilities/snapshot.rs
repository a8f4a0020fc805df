use shared_resources::direction::Direction;
use shared_resources::lift_message::PersonId;

use super::lift_state::{Floor, Phase};

/// Copy of the lift state handed to the renderer, taken while the lift is
/// locked and used after the lock is released.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct LiftSnapshot {
    pub floor: Floor,
    pub direction: Direction,
    pub phase: Phase,
    /// (person, destination) for everyone in the lift
    pub occupants: Vec<(PersonId, Floor)>,
    /// (person, destination) for everyone waiting, indexed by floor
    pub floor_queues: Vec<Vec<(PersonId, Floor)>>,
}

impl LiftSnapshot {
    pub fn num_floors(&self) -> usize {
        self.floor_queues.len()
    }

    pub fn carries(&self, id: PersonId) -> bool {
        self.occupants.iter().any(|(person, _)| *person == id)
    }

    pub fn waiting_at(&self, id: PersonId) -> Option<Floor> {
        self.floor_queues.iter()
            .position(|queue| queue.iter().any(|(person, _)| *person == id))
            .map(|floor| floor as Floor)
    }
}
