/// ----- LIFT STATE -----
/// The cabin, the persons waiting on each floor and the four primitives
/// that are the only way to change them. Every primitive treats a broken
/// invariant as fatal: the lift panics and, with `panic = "abort"`, the
/// whole program stops.

use std::collections::{BTreeMap, HashMap};

use log::{debug, error};

use shared_resources::config::LiftConfig;
use shared_resources::direction::Direction;
use shared_resources::lift_message::PersonId;

use super::snapshot::LiftSnapshot;

pub type Floor = u8;

macro_rules! lift_panic {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        error!("LIFT_PANIC!!! {}", message);
        panic!("LIFT_PANIC!!! {}", message)
    }};
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    IdleAt(Floor),
    Exchanging(Floor),
    Moving { from: Floor, to: Floor },
}

impl Phase {
    pub fn as_string(&self) -> String {
        match self {
            Phase::IdleAt(_) => String::from("idle"),
            Phase::Exchanging(_) => String::from("exchanging"),
            Phase::Moving { .. } => String::from("moving"),
        }
    }
}

/// Computes where the lift goes after `floor` when travelling in
/// `direction`. The lift bounces between the bottom and the top floor
/// regardless of where anyone wants to go.
pub fn next_floor(floor: Floor, direction: Direction, top_floor: Floor) -> (Floor, Direction) {
    match floor {
        0 => (1, Direction::Up),
        f if f >= top_floor => (top_floor - 1, Direction::Down),
        f => match direction {
            Direction::Up => (f + 1, Direction::Up),
            Direction::Down => (f - 1, Direction::Down),
        },
    }
}

#[derive(Debug, Clone)]
pub struct LiftState {
    settings: LiftConfig,
    floor: Floor,
    direction: Direction,
    phase: Phase,
    /// persons on each floor waiting to enter, with their destination
    floor_queues: Vec<BTreeMap<PersonId, Floor>>,
    /// passengers in the lift, with their destination
    occupants: BTreeMap<PersonId, Floor>,
    /// where each passenger that has left the lift got off
    arrivals: HashMap<PersonId, Floor>,
}

impl LiftState {
    pub fn new(settings: LiftConfig) -> Self {
        LiftState {
            settings: settings,
            floor: 0,
            direction: Direction::Up,
            phase: Phase::IdleAt(0),
            floor_queues: vec![BTreeMap::new(); settings.num_floors as usize],
            occupants: BTreeMap::new(),
            arrivals: HashMap::new(),
        }
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn n_passengers(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.settings.max_n_passengers
    }

    pub fn n_persons_to_enter(&self, floor: Floor) -> usize {
        self.floor_queue(floor).len()
    }

    pub fn is_waiting(&self, id: PersonId, floor: Floor) -> bool {
        self.floor_queue(floor).contains_key(&id)
    }

    pub fn is_riding(&self, id: PersonId) -> bool {
        self.occupants.contains_key(&id)
    }

    /// enter_floor: makes the person `id` with destination `to_floor` stand at `floor`
    pub fn enter_floor(&mut self, id: PersonId, floor: Floor, to_floor: Floor) {
        let max_n_persons = self.settings.max_n_persons;
        if self.is_riding(id) || self.floor_queues.iter().any(|queue| queue.contains_key(&id)) {
            lift_panic!("person {} is already in the lift system", id);
        }
        if to_floor > self.settings.top_floor() {
            lift_panic!("person {} cannot go to floor {}, the top floor is {}", id, to_floor, self.settings.top_floor());
        }
        if to_floor == floor {
            lift_panic!("person {} cannot go from floor {} to the same floor", id, floor);
        }
        let queue = self.floor_queue_mut(floor);
        if queue.len() >= max_n_persons {
            lift_panic!("cannot enter floor {}", floor);
        }
        queue.insert(id, to_floor);
    }

    /// leave_floor: makes the person `id` standing at `floor` leave it,
    /// returning its destination
    pub fn leave_floor(&mut self, id: PersonId, floor: Floor) -> Floor {
        match self.floor_queue_mut(floor).remove(&id) {
            Some(to_floor) => to_floor,
            None => lift_panic!("cannot leave floor {}, person {} is not there", floor, id),
        }
    }

    /// enter_lift: makes the person `id` with destination `to_floor` enter the lift
    pub fn enter_lift(&mut self, id: PersonId, to_floor: Floor) {
        if self.is_full() {
            lift_panic!("cannot enter lift, it already carries {} passengers", self.occupants.len());
        }
        if self.occupants.insert(id, to_floor).is_some() {
            lift_panic!("person {} is already in the lift", id);
        }
        debug!("person {} entered the lift at floor {}, going to {}", id, self.floor, to_floor);
    }

    /// leave_lift: makes the passenger `id`, whose destination is the
    /// current floor, leave the lift
    pub fn leave_lift(&mut self, id: PersonId) {
        match self.occupants.get(&id).copied() {
            Some(to_floor) if to_floor == self.floor => {
                self.occupants.remove(&id);
                self.arrivals.insert(id, self.floor);
                debug!("person {} left the lift at floor {}", id, self.floor);
            },
            _ => lift_panic!("cannot leave lift, person {} is not going to floor {}", id, self.floor),
        }
    }

    /// Returns a passenger that wants to get off here.
    pub fn next_leaving(&self) -> Option<PersonId> {
        self.occupants.iter()
            .find(|(_, to_floor)| **to_floor == self.floor)
            .map(|(id, _)| *id)
    }

    /// Returns a person on this floor that may get on, if there is room.
    pub fn next_entering(&self) -> Option<PersonId> {
        if self.is_full() {
            return None
        }
        self.floor_queue(self.floor).keys().next().copied()
    }

    /// Hands out the floor at which `id` left the lift, once.
    pub fn take_arrival(&mut self, id: PersonId) -> Option<Floor> {
        self.arrivals.remove(&id)
    }

    pub fn begin_exchange(&mut self) {
        self.phase = Phase::Exchanging(self.floor);
    }

    /// Leaves the current floor. A reversal takes effect here, while the
    /// lift is still standing at the end floor.
    pub fn depart(&mut self, next_floor: Floor, direction: Direction) {
        self.direction = direction;
        self.phase = Phase::Moving { from: self.floor, to: next_floor };
    }

    pub fn arrive(&mut self, next_floor: Floor) {
        if next_floor > self.settings.top_floor() {
            lift_panic!("cannot arrive at floor {}, the top floor is {}", next_floor, self.settings.top_floor());
        }
        self.floor = next_floor;
        self.phase = Phase::IdleAt(next_floor);
        debug!("lift arrived at floor {}", next_floor);
    }

    pub fn next_floor(&self) -> (Floor, Direction) {
        next_floor(self.floor, self.direction, self.settings.top_floor())
    }

    /// Lets every passenger with this floor as destination off, then lets
    /// waiting persons on while there is room. `on_change` runs after every
    /// single move of a person.
    pub fn exchange<F: FnMut(&mut LiftState, Exchanged)>(&mut self, mut on_change: F) {
        self.begin_exchange();
        while let Some(id) = self.next_leaving() {
            self.leave_lift(id);
            on_change(self, Exchanged::Left(id));
        }
        while let Some(id) = self.next_entering() {
            let to_floor = self.leave_floor(id, self.floor);
            self.enter_lift(id, to_floor);
            on_change(self, Exchanged::Entered(id));
        }
    }

    /// Checks every structural invariant, returning a description of the
    /// first one that is broken.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.floor > self.settings.top_floor() {
            return Err(format!("floor {} is above the top floor", self.floor))
        }
        if self.occupants.len() > self.settings.max_n_passengers {
            return Err(format!("{} passengers in the lift", self.occupants.len()))
        }
        for (floor, queue) in self.floor_queues.iter().enumerate() {
            if queue.len() > self.settings.max_n_persons {
                return Err(format!("{} persons waiting at floor {}", queue.len(), floor))
            }
            if let Some(id) = queue.keys().find(|id| self.occupants.contains_key(*id)) {
                return Err(format!("person {} is both at floor {} and in the lift", id, floor))
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> LiftSnapshot {
        LiftSnapshot {
            floor: self.floor,
            direction: self.direction,
            phase: self.phase,
            occupants: self.occupants.iter().map(|(id, to)| (*id, *to)).collect(),
            floor_queues: self.floor_queues.iter()
                .map(|queue| queue.iter().map(|(id, to)| (*id, *to)).collect())
                .collect(),
        }
    }

    fn floor_queue(&self, floor: Floor) -> &BTreeMap<PersonId, Floor> {
        match self.floor_queues.get(floor as usize) {
            Some(queue) => queue,
            None => lift_panic!("there is no floor {}", floor),
        }
    }

    fn floor_queue_mut(&mut self, floor: Floor) -> &mut BTreeMap<PersonId, Floor> {
        match self.floor_queues.get_mut(floor as usize) {
            Some(queue) => queue,
            None => lift_panic!("there is no floor {}", floor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchanged {
    Left(PersonId),
    Entered(PersonId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(num_floors: u8, max_n_persons: usize, max_n_passengers: usize) -> LiftConfig {
        LiftConfig { num_floors, max_n_persons, max_n_passengers }
    }

    #[test]
    fn sweeps_bottom_to_top_and_back() {
        let mut floor = 0;
        let mut direction = Direction::Up;
        let mut visited = vec![floor];
        for _ in 0..8 {
            let (next, next_direction) = next_floor(floor, direction, 4);
            if next_direction != direction {
                assert!(floor == 0 || floor == 4, "reversed at floor {}", floor);
            }
            floor = next;
            direction = next_direction;
            visited.push(floor);
        }
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn end_floors_force_direction() {
        assert_eq!(next_floor(0, Direction::Down, 4), (1, Direction::Up));
        assert_eq!(next_floor(4, Direction::Up, 4), (3, Direction::Down));
        assert_eq!(next_floor(2, Direction::Down, 4), (1, Direction::Down));
    }

    #[test]
    fn two_floor_building_shuttles() {
        assert_eq!(next_floor(0, Direction::Up, 1), (1, Direction::Up));
        assert_eq!(next_floor(1, Direction::Up, 1), (0, Direction::Down));
    }

    #[test]
    fn starts_idle_at_ground_floor_going_up() {
        let state = LiftState::new(settings(5, 10, 5));
        assert_eq!(state.floor(), 0);
        assert_eq!(state.direction(), Direction::Up);
        assert_eq!(state.snapshot().phase, Phase::IdleAt(0));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn exchange_lets_passengers_off_before_letting_persons_on() {
        let mut state = LiftState::new(settings(5, 10, 1));
        state.enter_floor(0, 0, 2);
        state.enter_floor(1, 2, 4);
        let mut events = Vec::new();
        state.exchange(|_, event| events.push(event));
        assert_eq!(events, vec![Exchanged::Entered(0)]);

        state.depart(1, Direction::Up);
        state.arrive(1);
        state.depart(2, Direction::Up);
        state.arrive(2);
        events.clear();
        state.exchange(|state, event| {
            assert!(state.check_invariants().is_ok());
            events.push(event);
        });
        assert_eq!(events, vec![Exchanged::Left(0), Exchanged::Entered(1)]);
        assert_eq!(state.take_arrival(0), Some(2));
        assert_eq!(state.take_arrival(0), None);
        assert!(state.is_riding(1));
    }

    #[test]
    fn full_lift_leaves_persons_waiting() {
        let mut state = LiftState::new(settings(5, 10, 2));
        for id in 0..3 {
            state.enter_floor(id, 0, 3);
        }
        state.exchange(|_, _| {});
        assert_eq!(state.n_passengers(), 2);
        assert_eq!(state.n_persons_to_enter(0), 1);
        assert!(state.is_waiting(2, 0));
        assert_eq!(state.next_entering(), None);
    }

    #[test]
    #[should_panic(expected = "cannot enter floor")]
    fn crowded_floor_is_fatal() {
        let mut state = LiftState::new(settings(3, 2, 1));
        state.enter_floor(0, 1, 2);
        state.enter_floor(1, 1, 2);
        state.enter_floor(2, 1, 0);
    }

    #[test]
    #[should_panic(expected = "cannot leave floor")]
    fn leaving_a_floor_one_is_not_on_is_fatal() {
        let mut state = LiftState::new(settings(3, 2, 1));
        state.enter_floor(0, 1, 2);
        state.leave_floor(0, 2);
    }

    #[test]
    #[should_panic(expected = "cannot enter lift")]
    fn overfull_lift_is_fatal() {
        let mut state = LiftState::new(settings(3, 2, 1));
        state.enter_lift(0, 2);
        state.enter_lift(1, 2);
    }

    #[test]
    #[should_panic(expected = "cannot leave lift")]
    fn leaving_at_the_wrong_floor_is_fatal() {
        let mut state = LiftState::new(settings(3, 2, 1));
        state.enter_lift(0, 2);
        state.leave_lift(0);
    }

    #[test]
    #[should_panic(expected = "already in the lift system")]
    fn registering_twice_is_fatal() {
        let mut state = LiftState::new(settings(3, 2, 2));
        state.enter_floor(0, 1, 2);
        state.enter_floor(0, 2, 1);
    }

    #[test]
    #[should_panic(expected = "cannot go to floor 9")]
    fn destination_above_the_top_floor_is_fatal() {
        let mut state = LiftState::new(settings(5, 10, 1));
        state.enter_floor(0, 0, 9);
    }

    #[test]
    #[should_panic(expected = "to the same floor")]
    fn journey_to_the_same_floor_is_fatal() {
        let mut state = LiftState::new(settings(5, 10, 1));
        state.enter_floor(1, 2, 2);
    }

    #[test]
    fn broken_invariants_are_reported() {
        let mut state = LiftState::new(settings(3, 2, 1));
        state.enter_floor(0, 0, 2);
        state.occupants.insert(0, 2);
        assert!(state.check_invariants().unwrap_err().contains("both at floor 0 and in the lift"));

        let mut state = LiftState::new(settings(3, 2, 1));
        state.occupants.insert(0, 2);
        state.occupants.insert(1, 2);
        assert_eq!(state.check_invariants(), Err(String::from("2 passengers in the lift")));
    }

    #[test]
    fn reversal_happens_at_the_end_floor() {
        let mut state = LiftState::new(settings(3, 2, 2));
        state.depart(1, Direction::Up);
        state.arrive(1);
        state.depart(2, Direction::Up);
        state.arrive(2);
        let (next, direction) = state.next_floor();
        state.depart(next, direction);
        assert_eq!(state.floor(), 2);
        assert_eq!(state.direction(), Direction::Down);
        assert_eq!(state.snapshot().phase, Phase::Moving { from: 2, to: 1 });
        state.arrive(next);
        assert_eq!(state.floor(), 1);
    }
}
