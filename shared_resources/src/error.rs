use thiserror::Error;

use crate::call::CarId;

/// A command named a floor, car or direction the building cannot serve.
/// Nothing is mutated when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("floor {floor} is outside 1..={num_floors}")]
    FloorOutOfRange { floor: u8, num_floors: u8 },

    #[error("car {car} does not exist ({num_cars} cars)")]
    CarOutOfRange { car: CarId, num_cars: usize },

    #[error("hall calls must be up or down")]
    IdleDirection,

    #[error("floor {floor} has no floor below it")]
    NoFloorBelow { floor: u8 },

    #[error("floor {floor} has no floor above it")]
    NoFloorAbove { floor: u8 },

    #[error("doors of car {car} are not open")]
    DoorsClosed { car: CarId },
}

/// Boarding or alighting would push a car's passenger count out of bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("car {car} is full ({capacity} passengers)")]
    CarFull { car: CarId, capacity: u8 },

    #[error("car {car} has no passengers")]
    CarEmpty { car: CarId },
}

/// Any rejection of a command issued against a running simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}
