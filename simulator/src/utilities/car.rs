/// ----- CAR -----
/// One elevator car: position, direction, door cycle, pending car calls and
/// passengers. Every field lives behind a single per-car lock so the tick loop
/// and the scheduler can mutate it while status queries read it.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Bound::{Excluded, Unbounded};

use parking_lot::Mutex;
use shared_resources::call::CarId;
use shared_resources::direction::Direction;
use shared_resources::error::{CapacityError, CommandError, ValidationError};

/// Ticks needed to open, and later to close, the doors.
pub const DOOR_OPERATION_TICKS: u32 = 1;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarState {
    Idle,
    Moving,
    DoorsOpening,
    DoorsOpen,
    DoorsClosing,
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarState::Idle => "Idle",
            CarState::Moving => "Moving",
            CarState::DoorsOpening => "DoorsOpening",
            CarState::DoorsOpen => "DoorsOpen",
            CarState::DoorsClosing => "DoorsClosing",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub floor_travel_ticks: u32,
    pub door_open_ticks: u32,
}

/// What a single countdown step did to the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Nothing,
    PassedFloor(u8),
    Arrived(u8),
    DoorsOpened(u8),
    ClosingDoors,
    /// The doors finished closing; the car waits for a dispatch decision.
    DoorsClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CarState,
    pub to: CarState,
    pub floor: u8,
}

#[derive(Debug)]
struct CarInner {
    floor: u8,
    direction: Direction,
    state: CarState,
    car_calls: BTreeSet<u8>,
    passengers: u8,
    ticks_remaining: u32,
    target: Option<u8>,
    transitions: Vec<Transition>,
}

impl CarInner {
    fn set_state(&mut self, to: CarState) {
        if self.state != to {
            self.transitions.push(Transition { from: self.state, to, floor: self.floor });
            self.state = to;
        }
    }

    fn settle(&mut self) {
        self.set_state(CarState::Idle);
        self.direction = Direction::Idle;
        self.ticks_remaining = 0;
        self.target = None;
    }

    fn awaiting_dispatch(&self) -> bool {
        self.state == CarState::DoorsClosing && self.ticks_remaining == 0
    }
}

#[derive(Debug)]
pub struct Car {
    id: CarId,
    capacity: u8,
    timing: Timing,
    inner: Mutex<CarInner>,
}

impl Car {
    pub fn new(id: CarId, capacity: u8, start_floor: u8, timing: Timing) -> Self {
        Car {
            id,
            capacity,
            timing,
            inner: Mutex::new(CarInner {
                floor: start_floor,
                direction: Direction::Idle,
                state: CarState::Idle,
                car_calls: BTreeSet::new(),
                passengers: 0,
                ticks_remaining: 0,
                target: None,
                transitions: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn floor(&self) -> u8 {
        self.inner.lock().floor
    }

    pub fn direction(&self) -> Direction {
        self.inner.lock().direction
    }

    pub fn state(&self) -> CarState {
        self.inner.lock().state
    }

    pub fn passengers(&self) -> u8 {
        self.inner.lock().passengers
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.inner.lock().ticks_remaining
    }

    pub fn target(&self) -> Option<u8> {
        self.inner.lock().target
    }

    pub fn car_calls(&self) -> BTreeSet<u8> {
        self.inner.lock().car_calls.clone()
    }

    // CAR CALLS

    /// Returns `false` when the floor was already pending.
    pub(crate) fn add_car_call(&self, floor: u8) -> bool {
        self.inner.lock().car_calls.insert(floor)
    }

    pub(crate) fn remove_car_call(&self, floor: u8) -> bool {
        self.inner.lock().car_calls.remove(&floor)
    }

    pub fn has_car_call_at(&self, floor: u8) -> bool {
        self.inner.lock().car_calls.contains(&floor)
    }

    pub fn has_car_calls(&self) -> bool {
        !self.inner.lock().car_calls.is_empty()
    }

    pub fn has_calls_above(&self) -> bool {
        let inner = self.inner.lock();
        inner.car_calls.range((Excluded(inner.floor), Unbounded)).next().is_some()
    }

    pub fn has_calls_below(&self) -> bool {
        let inner = self.inner.lock();
        inner.car_calls.range(..inner.floor).next().is_some()
    }

    /// Whether a car call lies strictly ahead in the current direction of travel.
    pub fn has_calls_ahead(&self) -> bool {
        match self.direction() {
            Direction::Up => self.has_calls_above(),
            Direction::Down => self.has_calls_below(),
            Direction::Idle => false,
        }
    }

    /// The next car call in the direction of travel, falling back to the
    /// nearest call overall when nothing is pending ahead.
    pub fn next_car_call(&self) -> Option<u8> {
        let inner = self.inner.lock();
        let current = inner.floor;
        let ahead = match inner.direction {
            Direction::Up => inner.car_calls.range((Excluded(current), Unbounded)).next().copied(),
            Direction::Down => inner.car_calls.range(..current).next_back().copied(),
            Direction::Idle => None,
        };
        ahead.or_else(|| inner.car_calls.iter().copied().min_by_key(|floor| floor.abs_diff(current)))
    }

    // SCHEDULING

    /// Cost of sending this car to a hall call at `floor` going `direction`.
    /// Idle cars and cars already heading that way past `floor` pay only the
    /// distance; everything else pays a penalty of twice the building height.
    pub fn cost_to_serve(&self, floor: u8, direction: Direction, num_floors: u8) -> u32 {
        let inner = self.inner.lock();
        let distance = inner.floor.abs_diff(floor) as u32;
        if inner.state == CarState::Idle {
            return distance;
        }
        let on_the_way = inner.direction == direction && inner.direction.is_ahead(inner.floor, floor);
        if on_the_way {
            distance
        } else {
            distance + 2 * num_floors as u32
        }
    }

    /// Idle, or done closing its doors and waiting to be told where to go next.
    pub fn is_dispatchable(&self) -> bool {
        let inner = self.inner.lock();
        inner.state == CarState::Idle || inner.awaiting_dispatch()
    }

    /// Starts travelling toward `target`. Returns `false` if the car is busy
    /// or already there.
    pub(crate) fn start_moving(&self, target: u8) -> bool {
        let mut inner = self.inner.lock();
        if !(inner.state == CarState::Idle || inner.awaiting_dispatch()) || target == inner.floor {
            return false;
        }
        inner.direction = Direction::between(inner.floor, target);
        inner.target = Some(target);
        inner.ticks_remaining = self.timing.floor_travel_ticks;
        inner.set_state(CarState::Moving);
        true
    }

    /// Opens the doors where the car stands, to serve passengers going `direction`.
    pub(crate) fn open_doors(&self, direction: Direction) -> bool {
        let mut inner = self.inner.lock();
        if !(inner.state == CarState::Idle || inner.awaiting_dispatch()) {
            return false;
        }
        inner.direction = match direction {
            Direction::Idle => Direction::Up,
            direction => direction,
        };
        inner.target = None;
        inner.ticks_remaining = DOOR_OPERATION_TICKS;
        inner.set_state(CarState::DoorsOpening);
        true
    }

    /// Moves the stop of a moving car forward to `floor` when `floor` is
    /// strictly ahead and nearer than the current target.
    pub(crate) fn retarget(&self, floor: u8) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != CarState::Moving || !inner.direction.is_ahead(inner.floor, floor) {
            return false;
        }
        let current = inner.floor;
        let nearer = inner.target.map_or(true, |target| floor.abs_diff(current) < target.abs_diff(current));
        if nearer {
            inner.target = Some(floor);
        }
        nearer
    }

    /// Flips the direction of a car standing at a floor.
    pub(crate) fn reverse(&self) {
        let mut inner = self.inner.lock();
        if inner.state != CarState::Moving {
            inner.direction = inner.direction.opposite();
        }
    }

    /// Puts a car that is waiting for dispatch back to `Idle`.
    pub(crate) fn settle(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.awaiting_dispatch() {
            inner.settle();
            return true;
        }
        false
    }

    /// Counts one tick off the current timed phase and performs the
    /// transition it triggers.
    pub(crate) fn advance(&self) -> Advance {
        let mut inner = self.inner.lock();
        match inner.state {
            CarState::Idle => Advance::Nothing,
            CarState::Moving => {
                inner.ticks_remaining = inner.ticks_remaining.saturating_sub(1);
                if inner.ticks_remaining > 0 {
                    return Advance::Nothing;
                }
                inner.floor = inner.direction.step(inner.floor);
                let floor = inner.floor;
                if inner.target.map_or(true, |target| target == floor) || inner.car_calls.contains(&floor) {
                    inner.target = None;
                    inner.ticks_remaining = DOOR_OPERATION_TICKS;
                    inner.set_state(CarState::DoorsOpening);
                    Advance::Arrived(floor)
                } else {
                    inner.ticks_remaining = self.timing.floor_travel_ticks;
                    Advance::PassedFloor(floor)
                }
            }
            CarState::DoorsOpening => {
                inner.ticks_remaining = inner.ticks_remaining.saturating_sub(1);
                if inner.ticks_remaining > 0 {
                    return Advance::Nothing;
                }
                inner.ticks_remaining = self.timing.door_open_ticks;
                inner.set_state(CarState::DoorsOpen);
                Advance::DoorsOpened(inner.floor)
            }
            CarState::DoorsOpen => {
                inner.ticks_remaining = inner.ticks_remaining.saturating_sub(1);
                if inner.ticks_remaining > 0 {
                    return Advance::Nothing;
                }
                inner.ticks_remaining = DOOR_OPERATION_TICKS;
                inner.set_state(CarState::DoorsClosing);
                Advance::ClosingDoors
            }
            CarState::DoorsClosing => {
                if inner.ticks_remaining == 0 {
                    return Advance::Nothing;
                }
                inner.ticks_remaining -= 1;
                if inner.ticks_remaining > 0 {
                    return Advance::Nothing;
                }
                Advance::DoorsClosed
            }
        }
    }

    /// Every state change since the last call, oldest first.
    pub(crate) fn take_transitions(&self) -> Vec<Transition> {
        std::mem::take(&mut self.inner.lock().transitions)
    }

    // PASSENGERS

    /// Returns the new passenger count.
    pub fn board(&self) -> Result<u8, CommandError> {
        let mut inner = self.inner.lock();
        if inner.state != CarState::DoorsOpen {
            return Err(CommandError::from(ValidationError::DoorsClosed { car: self.id }));
        }
        if inner.passengers >= self.capacity {
            return Err(CommandError::from(CapacityError::CarFull { car: self.id, capacity: self.capacity }));
        }
        inner.passengers += 1;
        Ok(inner.passengers)
    }

    /// Returns the new passenger count.
    pub fn alight(&self) -> Result<u8, CommandError> {
        let mut inner = self.inner.lock();
        if inner.state != CarState::DoorsOpen {
            return Err(CommandError::from(ValidationError::DoorsClosed { car: self.id }));
        }
        if inner.passengers == 0 {
            return Err(CommandError::from(CapacityError::CarEmpty { car: self.id }));
        }
        inner.passengers -= 1;
        Ok(inner.passengers)
    }
}
