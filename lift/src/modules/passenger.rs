/// ----- PASSENGER MODULE -----
/// A person travels between random floors forever, resting a while after
/// each journey. The registry hands out person ids and refuses to create
/// more persons than the lift system is built for.

use std::thread;
use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shared_resources::lift_message::PersonId;

use crate::utilities::error::LiftError;
use crate::utilities::lift_state::Floor;

/// Something that can carry a person between two floors.
pub trait Transport {
    /// Blocks until the person `id` has travelled from `from_floor` to
    /// `to_floor`, returning the floor where it got off.
    fn travel(&self, id: PersonId, from_floor: Floor, to_floor: Floor) -> Result<Floor, LiftError>;
}

/// Picks two different floors, where to start and where to go.
pub fn random_journey<R: Rng>(rng: &mut R, num_floors: u8) -> (Floor, Floor) {
    let from_floor = rng.gen_range(0..num_floors);
    let mut to_floor = rng.gen_range(0..num_floors);
    while to_floor == from_floor {
        to_floor = rng.gen_range(0..num_floors);
    }
    (from_floor, to_floor)
}

pub fn person_rng(id: PersonId, seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
        None => StdRng::from_entropy(),
    }
}

pub fn main<T: Transport + ?Sized>(
    id: PersonId,
    transport: &T,
    num_floors: u8,
    think: Duration,
    mut rng: StdRng,
) -> Result<(), LiftError> {
    loop {
        let (from_floor, to_floor) = random_journey(&mut rng, num_floors);
        debug!("person {} travels from floor {} to floor {}", id, from_floor, to_floor);
        let arrived_at = transport.travel(id, from_floor, to_floor)?;
        debug!("person {} arrived at floor {}", id, arrived_at);
        thread::sleep(think);
    }
}

/// Keeps count of the persons created so far.
#[derive(Debug)]
pub struct Passengers {
    spawned: usize,
    max_n_persons: usize,
}

impl Passengers {
    pub fn new(max_n_persons: usize) -> Self {
        Passengers {
            spawned: 0,
            max_n_persons: max_n_persons,
        }
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Creates the next person through `spawn`, which gets the new id.
    pub fn spawn<F>(&mut self, spawn: F) -> Result<PersonId, LiftError>
    where
        F: FnOnce(PersonId) -> Result<(), LiftError>,
    {
        if self.spawned >= self.max_n_persons {
            return Err(LiftError::CapacityExceeded { max: self.max_n_persons })
        }
        let id = self.spawned;
        spawn(id)?;
        self.spawned += 1;
        Ok(id)
    }
}
