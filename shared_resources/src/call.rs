use std::fmt;

use crate::direction::Direction;
use crate::error::ValidationError;

/// Index of a car, `0..num_elevators`.
pub type CarId = usize;

/// A directional request waiting at a floor. Floors are numbered from 1.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HallCall {
    pub floor: u8,
    pub direction: Direction,
}

impl HallCall {
    /// Checks a requested hall call against a building with `num_floors` floors.
    ///
    /// Rejects floors outside `1..=num_floors`, the `Idle` direction, a down
    /// call from the ground floor and an up call from the top floor.
    pub fn new(floor: u8, direction: Direction, num_floors: u8) -> Result<Self, ValidationError> {
        if floor < 1 || floor > num_floors {
            return Err(ValidationError::FloorOutOfRange { floor, num_floors });
        }
        match direction {
            Direction::Idle => Err(ValidationError::IdleDirection),
            Direction::Down if floor == 1 => Err(ValidationError::NoFloorBelow { floor }),
            Direction::Up if floor == num_floors => Err(ValidationError::NoFloorAbove { floor }),
            _ => Ok(HallCall { floor, direction }),
        }
    }

    pub fn iter_floor(floor: u8) -> impl Iterator<Item = HallCall> {
        Direction::iter_hall().map(move |direction| HallCall { floor, direction })
    }
}

impl fmt::Display for HallCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.floor, self.direction)
    }
}
