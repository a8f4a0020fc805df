/// ----- DISPATCH MODULE -----
/// The lift without shared memory. One thread owns the lift state and
/// reacts to messages: persons announce journeys with `Travel`, the mover
/// thread sends `Move` once per transit time, and every person leaving the
/// lift gets a `TravelDone` on its own channel.

use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver, Sender};
use log::{debug, warn};

use shared_resources::config::LiftConfig;
use shared_resources::lift_message::{LiftMessage, PersonId};

use crate::utilities::error::LiftError;
use crate::utilities::lift_state::{Exchanged, Floor, LiftState};
use crate::utilities::snapshot::LiftSnapshot;

use super::passenger::Transport;

pub fn lift_main(
    settings: LiftConfig,
    lift_rx: Receiver<LiftMessage>,
    person_txs: Vec<Sender<LiftMessage>>,
    snapshot_tx: Sender<LiftSnapshot>,
) -> Result<(), LiftError> {
    let mut state = LiftState::new(settings);

    loop {
        let message = lift_rx.recv().map_err(|_| LiftError::Disconnected("lift"))?;
        handle_message(&mut state, message, &person_txs);
        debug_assert_eq!(state.check_invariants(), Ok(()));
        if snapshot_tx.send(state.snapshot()).is_err() {
            debug!("nobody is drawing the lift");
        }
    }
}

pub fn handle_message(state: &mut LiftState, message: LiftMessage, person_txs: &[Sender<LiftMessage>]) {
    match message {
        LiftMessage::Travel { person_id, from_floor, to_floor } => {
            state.enter_floor(person_id, from_floor, to_floor);
        },
        LiftMessage::Move => {
            state.exchange(|state, exchanged| {
                if let Exchanged::Left(person_id) = exchanged {
                    let floor = match state.take_arrival(person_id) {
                        Some(floor) => floor,
                        None => unreachable!("person {} left the lift without arriving anywhere", person_id),
                    };
                    let done = LiftMessage::TravelDone { person_id: person_id, floor: floor };
                    match person_txs.get(person_id) {
                        Some(person_tx) if person_tx.send(done).is_ok() => (),
                        _ => warn!("person {} left the lift but cannot be told", person_id),
                    }
                }
            });
            let (next_floor, direction) = state.next_floor();
            state.depart(next_floor, direction);
            state.arrive(next_floor);
        },
        LiftMessage::TravelDone { person_id, .. } => {
            warn!("lift received a message meant for person {}, ignoring", person_id);
        },
    }
}

/// Tells the lift to move on once every `transit`.
pub fn mover_main(transit: Duration, lift_tx: Sender<LiftMessage>) -> Result<(), LiftError> {
    let timer = tick(transit);
    loop {
        select! {
            recv(timer) -> _ => {
                lift_tx.send(LiftMessage::Move).map_err(|_| LiftError::Disconnected("lift"))?;
            },
        }
    }
}

/// A person's end of the message channels.
pub struct MessageLift {
    lift_tx: Sender<LiftMessage>,
    inbox: Receiver<LiftMessage>,
}

impl MessageLift {
    pub fn new(lift_tx: Sender<LiftMessage>, inbox: Receiver<LiftMessage>) -> Self {
        MessageLift {
            lift_tx: lift_tx,
            inbox: inbox,
        }
    }
}

impl Transport for MessageLift {
    fn travel(&self, id: PersonId, from_floor: Floor, to_floor: Floor) -> Result<Floor, LiftError> {
        let travel = LiftMessage::Travel { person_id: id, from_floor: from_floor, to_floor: to_floor };
        self.lift_tx.send(travel).map_err(|_| LiftError::Disconnected("lift"))?;
        loop {
            let message = self.inbox.recv().map_err(|_| LiftError::Disconnected("person"))?;
            match message {
                LiftMessage::TravelDone { floor, .. } if message.person_id() == Some(id) => return Ok(floor),
                other => debug!("person {} ignores {:?}", id, other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crossbeam_channel::unbounded;

    use super::*;

    fn settings(max_n_passengers: usize) -> LiftConfig {
        LiftConfig { num_floors: 5, max_n_persons: 4, max_n_passengers }
    }

    #[test]
    fn move_lets_passengers_off_and_tells_them() {
        let (person_tx, person_rx) = unbounded();
        let person_txs = vec![person_tx];
        let mut state = LiftState::new(settings(5));

        handle_message(&mut state, LiftMessage::Travel { person_id: 0, from_floor: 0, to_floor: 2 }, &person_txs);
        handle_message(&mut state, LiftMessage::Move, &person_txs);
        assert!(state.is_riding(0));
        assert_eq!(state.floor(), 1);
        handle_message(&mut state, LiftMessage::Move, &person_txs);
        assert!(person_rx.try_recv().is_err());
        handle_message(&mut state, LiftMessage::Move, &person_txs);
        assert!(!state.is_riding(0));
        assert_eq!(person_rx.try_recv().unwrap(), LiftMessage::TravelDone { person_id: 0, floor: 2 });
        assert_eq!(state.take_arrival(0), None);
    }

    #[test]
    fn person_waits_for_its_own_travel_done() {
        let (lift_tx, lift_rx) = unbounded();
        let (person_txs, mut person_rxs): (Vec<_>, Vec<_>) = (0..2).map(|_| unbounded()).unzip();
        let (snapshot_tx, snapshot_rx) = unbounded();
        thread::spawn(move || lift_main(settings(1), lift_rx, person_txs, snapshot_tx));

        let persons: Vec<_> = [(0, 1, 3), (1, 1, 0)].into_iter().zip(person_rxs.drain(..)).map(|((id, from, to), inbox)| {
            let lift = MessageLift::new(lift_tx.clone(), inbox);
            thread::spawn(move || (to, lift.travel(id, from, to).unwrap()))
        }).collect();

        // every Travel produces one snapshot, wait for both before moving
        let mut registered = 0;
        while registered < 2 {
            snapshot_rx.recv().unwrap();
            registered += 1;
        }

        let mut moves = 0;
        while !persons.iter().all(|person| person.is_finished()) {
            lift_tx.send(LiftMessage::Move).unwrap();
            let snapshot = snapshot_rx.recv().unwrap();
            assert!(snapshot.occupants.len() <= 1);
            moves += 1;
            assert!(moves < 1000, "persons never arrived");
            thread::sleep(Duration::from_millis(1));
        }
        for person in persons {
            let (to_floor, arrived_at) = person.join().unwrap();
            assert_eq!(arrived_at, to_floor);
        }
    }
}
