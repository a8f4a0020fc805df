use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};

use lift::modules::lift as lift_task;
use lift::modules::monitor::LiftMonitor;
use lift::modules::passenger::{self, Passengers};
use lift::modules::Lift;
use lift::utilities::error::LiftError;
use lift::utilities::lift_state::Phase;
use lift::utilities::snapshot::LiftSnapshot;
use shared_resources::config::{Config, LiftConfig, Mode, TimingConfig};
use shared_resources::direction::Direction;

fn check_snapshot(snapshot: &LiftSnapshot, settings: &LiftConfig) {
    assert!(snapshot.floor < settings.num_floors);
    assert!(snapshot.occupants.len() <= settings.max_n_passengers);
    for (floor, queue) in snapshot.floor_queues.iter().enumerate() {
        assert!(queue.len() <= settings.max_n_persons);
        for (id, _) in queue {
            assert!(!snapshot.carries(*id), "person {} at floor {} is also in the lift", id, floor);
        }
    }
    if let Phase::Moving { from, to } = snapshot.phase {
        let expected = if to > from { Direction::Up } else { Direction::Down };
        assert_eq!(snapshot.direction, expected, "moving from {} to {}", from, to);
        assert_eq!(from.abs_diff(to), 1);
    }
}

fn config(mode: Mode) -> Config {
    Config {
        lift: LiftConfig { num_floors: 4, max_n_persons: 3, max_n_passengers: 2 },
        timing: TimingConfig { transit: Duration::from_millis(1), think: Duration::from_millis(1) },
        mode: mode,
        seed: Some(5),
    }
}

fn wait_for_passenger(snapshot_rx: &Receiver<LiftSnapshot>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while let Ok(snapshot) = snapshot_rx.recv_deadline(deadline) {
        if !snapshot.occupants.is_empty() {
            return true
        }
    }
    false
}

#[test]
fn random_journeys_end_where_requested() {
    let settings = LiftConfig { num_floors: 5, max_n_persons: 8, max_n_passengers: 3 };
    let (snapshot_tx, snapshot_rx) = unbounded();
    let monitor = Arc::new(LiftMonitor::new(settings, Duration::from_millis(1), snapshot_tx));
    {
        let monitor = monitor.clone();
        thread::spawn(move || lift_task::main(&monitor));
    }

    let persons: Vec<_> = (0..8).map(|id| {
        let monitor = monitor.clone();
        thread::spawn(move || {
            let mut rng = passenger::person_rng(id, Some(11));
            for _ in 0..3 {
                let (from_floor, to_floor) = passenger::random_journey(&mut rng, settings.num_floors);
                assert_eq!(monitor.travel(id, from_floor, to_floor), to_floor);
            }
        })
    }).collect();
    for person in persons {
        person.join().unwrap();
    }

    let snapshots: Vec<LiftSnapshot> = snapshot_rx.try_iter().collect();
    assert!(!snapshots.is_empty());
    for snapshot in &snapshots {
        check_snapshot(snapshot, &settings);
    }
}

#[test]
fn monitor_lift_refuses_one_person_too_many() {
    let config = config(Mode::Monitor);
    let (snapshot_tx, snapshot_rx) = unbounded();
    let mut lift = Lift::start(&config, snapshot_tx).unwrap();
    let mut passengers = Passengers::new(config.lift.max_n_persons);

    for expected in 0..config.lift.max_n_persons {
        assert_eq!(passengers.spawn(|id| lift.spawn_person(id, &config)).unwrap(), expected);
    }
    match passengers.spawn(|id| lift.spawn_person(id, &config)) {
        Err(LiftError::CapacityExceeded { max }) => assert_eq!(max, 3),
        other => panic!("expected capacity to be exceeded, got {:?}", other),
    }
    assert_eq!(passengers.spawned(), 3);
    assert!(wait_for_passenger(&snapshot_rx, Duration::from_secs(10)));
}

#[test]
fn message_lift_carries_persons() {
    let config = config(Mode::Message);
    let (snapshot_tx, snapshot_rx) = unbounded();
    let mut lift = Lift::start(&config, snapshot_tx).unwrap();
    let mut passengers = Passengers::new(config.lift.max_n_persons);

    for _ in 0..config.lift.max_n_persons {
        passengers.spawn(|id| lift.spawn_person(id, &config)).unwrap();
    }
    assert!(passengers.spawn(|id| lift.spawn_person(id, &config)).is_err());
    assert!(wait_for_passenger(&snapshot_rx, Duration::from_secs(10)));

    let deadline = Instant::now() + Duration::from_millis(200);
    while let Ok(snapshot) = snapshot_rx.recv_deadline(deadline) {
        check_snapshot(&snapshot, &config.lift);
    }
}
