use std::process;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use log::{debug, error, info};

use shared_resources::config::{Config, Mode};
use shared_resources::lift_message::{LiftMessage, PersonId};

use crate::utilities::debug::Debug;
use crate::utilities::error::LiftError;
use crate::utilities::snapshot::LiftSnapshot;
use crate::utilities::user_command::UserCommand;

use self::dispatch::MessageLift;
use self::monitor::LiftMonitor;
use self::passenger::Passengers;

pub mod dispatch;
pub mod input;
pub mod lift;
pub mod monitor;
pub mod passenger;

/// The running lift, in whichever design was configured.
pub enum Lift {
    Monitor(Arc<LiftMonitor>),
    Message {
        lift_tx: Sender<LiftMessage>,
        inboxes: Vec<Option<Receiver<LiftMessage>>>,
    },
}

impl Lift {
    /// Starts the threads that run the lift itself.
    pub fn start(config: &Config, snapshot_tx: Sender<LiftSnapshot>) -> Result<Self, LiftError> {
        match config.mode {
            Mode::Monitor => {
                let monitor = Arc::new(LiftMonitor::new(config.lift, config.timing.transit, snapshot_tx));
                {
                    let monitor = monitor.clone();
                    thread::Builder::new().name("lift".to_string()).spawn(move || lift::main(&monitor))?;
                }
                Ok(Lift::Monitor(monitor))
            },
            Mode::Message => {
                let (lift_tx, lift_rx) = unbounded();
                let (person_txs, person_rxs): (Vec<_>, Vec<_>) = (0..config.lift.max_n_persons)
                    .map(|_| unbounded())
                    .unzip();
                {
                    let settings = config.lift;
                    thread::Builder::new().name("lift".to_string()).spawn(move || {
                        if let Err(e) = dispatch::lift_main(settings, lift_rx, person_txs, snapshot_tx) {
                            error!("lift stopped: {}", e);
                        }
                    })?;
                }
                {
                    let transit = config.timing.transit;
                    let lift_tx = lift_tx.clone();
                    thread::Builder::new().name("lift_move".to_string()).spawn(move || {
                        if let Err(e) = dispatch::mover_main(transit, lift_tx) {
                            error!("lift mover stopped: {}", e);
                        }
                    })?;
                }
                Ok(Lift::Message {
                    lift_tx: lift_tx,
                    inboxes: person_rxs.into_iter().map(Some).collect(),
                })
            },
        }
    }

    /// Starts the thread for the person `id`.
    pub fn spawn_person(&mut self, id: PersonId, config: &Config) -> Result<(), LiftError> {
        let num_floors = config.lift.num_floors;
        let think = config.timing.think;
        let rng = passenger::person_rng(id, config.seed);
        let builder = thread::Builder::new().name(format!("person_{}", id));

        match self {
            Lift::Monitor(monitor) => {
                let monitor = monitor.clone();
                builder.spawn(move || {
                    if let Err(e) = passenger::main(id, &*monitor, num_floors, think, rng) {
                        error!("person {} stopped: {}", id, e);
                    }
                })?;
            },
            Lift::Message { lift_tx, inboxes } => {
                let inbox = inboxes.get_mut(id)
                    .and_then(Option::take)
                    .ok_or(LiftError::CapacityExceeded { max: config.lift.max_n_persons })?;
                let lift = MessageLift::new(lift_tx.clone(), inbox);
                builder.spawn(move || {
                    if let Err(e) = passenger::main(id, &lift, num_floors, think, rng) {
                        error!("person {} stopped: {}", id, e);
                    }
                })?;
            },
        }
        Ok(())
    }
}

pub fn run(config: Config) -> Result<(), LiftError> {
    info!("Starting lift in {} mode with {} floors", config.mode.as_string(), config.lift.num_floors);

    // INITIALIZE CHANNELS
    let (snapshot_tx, snapshot_rx) = unbounded::<LiftSnapshot>();

    // INITIALIZE INPUT MODULE
    let user_command_rx = input::init()?;

    // INITIALIZE LIFT THREADS
    let mut lift = Lift::start(&config, snapshot_tx)?;
    let mut passengers = Passengers::new(config.lift.max_n_persons);

    let mut debug = Debug::new(config.lift.num_floors);

    loop {
        select! {
            recv(snapshot_rx) -> msg => {
                let snapshot = msg.map_err(|_| LiftError::Disconnected("snapshot"))?;
                debug.printstatus(&snapshot)?;
            },
            recv(user_command_rx) -> msg => {
                let command = msg.map_err(|_| LiftError::Disconnected("user command"))?;
                match command {
                    Ok(UserCommand::New) => {
                        match passengers.spawn(|id| lift.spawn_person(id, &config)) {
                            Ok(id) => info!("Created person {} ({} of {})", id, passengers.spawned(), config.lift.max_n_persons),
                            Err(e) => {
                                debug!("{}", e);
                                debug.show_error(&e)?;
                            },
                        }
                    },
                    Ok(UserCommand::Exit) => {
                        info!("STOPPING PROGRAM...");
                        process::exit(0);
                    },
                    Err(e) => {
                        debug!("{}", e);
                        debug.show_error(&e)?;
                    },
                }
            },
        }
    }
}
