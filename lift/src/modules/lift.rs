/// ----- LIFT MODULE -----
/// The thread driving the lift around: exchange persons at the floor it
/// stands at, pick the next floor, travel there, and again.

use crate::modules::monitor::LiftMonitor;

pub fn step(monitor: &LiftMonitor) {
    monitor.exchange();
    let (next_floor, direction) = monitor.next_floor();
    monitor.move_to(next_floor, direction);
}

pub fn main(monitor: &LiftMonitor) {
    loop {
        step(monitor);
    }
}
