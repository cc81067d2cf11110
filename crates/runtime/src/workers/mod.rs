//! Background workers driven by the runtime.

mod simulation;

pub use simulation::{Command, Simulation, SimulationWorker};
