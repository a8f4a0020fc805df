/// ----- LIFT MONITOR -----
/// The lift state behind one mutex and one condition variable. Every
/// change to the state is followed by a broadcast on the condition, and
/// every wait re-checks its own condition after waking up, so a waiter
/// never relies on why it was woken.

use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};

use shared_resources::config::LiftConfig;
use shared_resources::direction::Direction;
use shared_resources::lift_message::PersonId;

use crate::utilities::error::LiftError;
use crate::utilities::lift_state::{Floor, LiftState, Exchanged};
use crate::utilities::snapshot::LiftSnapshot;

use super::passenger::Transport;

pub struct LiftMonitor {
    state: Mutex<LiftState>,
    change: Condvar,
    transit: Duration,
    snapshot_tx: Sender<LiftSnapshot>,
}

impl LiftMonitor {
    pub fn new(settings: LiftConfig, transit: Duration, snapshot_tx: Sender<LiftSnapshot>) -> Self {
        LiftMonitor {
            state: Mutex::new(LiftState::new(settings)),
            change: Condvar::new(),
            transit: transit,
            snapshot_tx: snapshot_tx,
        }
    }

    pub fn snapshot(&self) -> LiftSnapshot {
        self.state.lock().snapshot()
    }

    /// Computes the floor to which the lift shall travel next, and the
    /// direction it travels in when leaving.
    pub fn next_floor(&self) -> (Floor, Direction) {
        self.state.lock().next_floor()
    }

    /// Moves the lift to `next_floor`. The lock is released while the lift
    /// is between floors, so persons can keep arriving at the floors.
    pub fn move_to(&self, next_floor: Floor, direction: Direction) {
        let mut state = self.state.lock();
        state.depart(next_floor, direction);
        self.change.notify_all();
        debug_assert_eq!(state.check_invariants(), Ok(()));
        let snapshot = state.snapshot();
        MutexGuard::unlocked(&mut state, || {
            self.send(snapshot);
            thread::sleep(self.transit);
        });

        state.arrive(next_floor);
        self.change.notify_all();
        self.publish(state);
    }

    /// Lets passengers off and waiting persons on at the current floor,
    /// waking everyone up after each person that moves.
    pub fn exchange(&self) {
        let mut state = self.state.lock();
        let change = &self.change;
        state.exchange(|state, exchanged| {
            match exchanged {
                Exchanged::Left(id) => debug!("person {} got off at floor {}", id, state.floor()),
                Exchanged::Entered(id) => debug!("person {} got on at floor {}", id, state.floor()),
            }
            change.notify_all();
        });
        self.publish(state);
    }

    /// Makes the person `id` travel from `from_floor` to `to_floor`,
    /// blocking until it has got off the lift. Returns the floor where it
    /// got off.
    pub fn travel(&self, id: PersonId, from_floor: Floor, to_floor: Floor) -> Floor {
        let mut state = self.state.lock();
        state.enter_floor(id, from_floor, to_floor);
        self.change.notify_all();
        debug!("person {} waits at floor {} to go to floor {}", id, from_floor, to_floor);

        // still standing at the floor -> the lift has not taken us yet
        while state.is_waiting(id, from_floor) {
            self.change.wait(&mut state);
        }
        // in the lift -> not there yet
        while state.is_riding(id) {
            self.change.wait(&mut state);
        }
        let arrived_at = match state.take_arrival(id) {
            Some(floor) => floor,
            None => unreachable!("person {} left the lift without arriving anywhere", id),
        };
        self.publish(state);
        arrived_at
    }

    /// Copies the state, releases the lock and only then hands the copy to
    /// the renderer.
    fn publish(&self, state: MutexGuard<LiftState>) {
        debug_assert_eq!(state.check_invariants(), Ok(()));
        let snapshot = state.snapshot();
        drop(state);
        self.send(snapshot);
    }

    fn send(&self, snapshot: LiftSnapshot) {
        if self.snapshot_tx.send(snapshot).is_err() {
            debug!("nobody is drawing the lift");
        }
    }
}

impl Transport for LiftMonitor {
    fn travel(&self, id: PersonId, from_floor: Floor, to_floor: Floor) -> Result<Floor, LiftError> {
        Ok(LiftMonitor::travel(self, id, from_floor, to_floor))
    }
}
