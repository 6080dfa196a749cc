use std::fmt;

/// Travel direction of a car, or the requested direction of a hall call.
///
/// The declaration order doubles as the ordering of hall calls on the same
/// floor: `Up` sorts before `Down`.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'u' | 'U' => Some(Direction::Up),
            'd' | 'D' => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// Direction of travel needed to get from `from` to `to`.
    pub fn between(from: u8, to: u8) -> Self {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::Idle
        }
    }

    /// Whether `floor` lies strictly beyond `from` when travelling in this direction.
    pub fn is_ahead(self, from: u8, floor: u8) -> bool {
        match self {
            Direction::Up => floor > from,
            Direction::Down => floor < from,
            Direction::Idle => false,
        }
    }

    /// The floor reached after travelling one floor from `floor`.
    pub fn step(self, floor: u8) -> u8 {
        match self {
            Direction::Up => floor.saturating_add(1),
            Direction::Down => floor.saturating_sub(1),
            Direction::Idle => floor,
        }
    }

    pub fn iter_hall() -> impl Iterator<Item = Direction> {
        [Direction::Up, Direction::Down].iter().copied()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Idle => "Idle",
        };
        f.pad(name)
    }
}
