use std::fmt;

use crate::call::CarId;
use crate::direction::Direction;

/// A message routed from the tick loop (or a command) to the scheduler.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    HallCall { floor: u8, direction: Direction },
    CarCall { car: CarId, floor: u8 },
    ElevatorArrived { car: CarId, floor: u8 },
    DoorsOpened { car: CarId, floor: u8 },
    DoorsClosed { car: CarId },
    Shutdown,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::HallCall { floor, direction } => write!(f, "HallCall floor={} dir={}", floor, direction),
            Event::CarCall { car, floor } => write!(f, "CarCall elevator={} floor={}", car, floor),
            Event::ElevatorArrived { car, floor } => write!(f, "ElevatorArrived elevator={} floor={}", car, floor),
            Event::DoorsOpened { car, floor } => write!(f, "DoorsOpened elevator={} floor={}", car, floor),
            Event::DoorsClosed { car } => write!(f, "DoorsClosed elevator={}", car),
            Event::Shutdown => f.write_str("Shutdown"),
        }
    }
}
