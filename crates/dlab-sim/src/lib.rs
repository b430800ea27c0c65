//! The discrete-time process/resource simulator: a single-
//! threaded, logically clocked step loop over a toy process/resource world,
//! built on the same wait-for detector the scenario runners use.

pub mod lock_manager;
pub mod plan;
pub mod simulator;

pub use lock_manager::LockManager;
pub use plan::{demo_scenario, random_scenario};
pub use simulator::{SimMode, SimOutcome, Simulator};
