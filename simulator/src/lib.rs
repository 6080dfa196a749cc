pub mod modules;
pub mod scheduler;
pub mod utilities;

pub use modules::simulation::Simulation;
pub use scheduler::{create_scheduler, Scheduler};
pub use utilities::building::Building;
pub use utilities::car::{Car, CarState};
pub use utilities::status::{CarStatus, Notification, SimulationStatus, StateTransition};
