use parking_lot::Mutex;
use shared_resources::call::{CarId, HallCall};
use shared_resources::config::SimulationConfig;
use shared_resources::direction::Direction;
use shared_resources::error::ValidationError;

use crate::utilities::car::{Car, Timing};

/// Hall-call buttons of a single floor.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Floor {
    pub number: u8,
    pub up_pressed: bool,
    pub down_pressed: bool,
}

impl Floor {
    pub fn new(number: u8) -> Self {
        Floor { number, up_pressed: false, down_pressed: false }
    }

    pub fn press(&mut self, direction: Direction) {
        self.set(direction, true);
    }

    pub fn clear(&mut self, direction: Direction) {
        self.set(direction, false);
    }

    pub fn is_pressed(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up_pressed,
            Direction::Down => self.down_pressed,
            Direction::Idle => false,
        }
    }

    fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up_pressed = pressed,
            Direction::Down => self.down_pressed = pressed,
            Direction::Idle => {}
        }
    }
}

/// Owns the floors (numbered `1..=num_floors`) and the cars (`0..num_cars`).
/// Floor buttons share one lock; every car carries its own.
#[derive(Debug)]
pub struct Building {
    num_floors: u8,
    floors: Mutex<Vec<Floor>>,
    cars: Vec<Car>,
}

impl Building {
    pub fn new(config: &SimulationConfig) -> Self {
        let timing = Timing {
            floor_travel_ticks: config.floor_travel_ticks,
            door_open_ticks: config.door_open_ticks,
        };
        Building {
            num_floors: config.num_floors,
            floors: Mutex::new((1..=config.num_floors).map(Floor::new).collect()),
            cars: (0..config.num_elevators as CarId)
                .map(|id| Car::new(id, config.car_capacity, 1, timing))
                .collect(),
        }
    }

    pub fn num_floors(&self) -> u8 {
        self.num_floors
    }

    pub fn num_cars(&self) -> usize {
        self.cars.len()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id)
    }

    pub fn floor(&self, number: u8) -> Option<Floor> {
        if !self.is_valid_floor(number) {
            return None;
        }
        Some(self.floors.lock()[number as usize - 1])
    }

    pub fn is_valid_floor(&self, floor: u8) -> bool {
        floor >= 1 && floor <= self.num_floors
    }

    pub fn is_valid_car(&self, id: CarId) -> bool {
        id < self.cars.len()
    }

    // VALIDATION

    pub fn validate_floor(&self, floor: u8) -> Result<u8, ValidationError> {
        if !self.is_valid_floor(floor) {
            return Err(ValidationError::FloorOutOfRange { floor, num_floors: self.num_floors });
        }
        Ok(floor)
    }

    pub fn validate_car(&self, id: CarId) -> Result<&Car, ValidationError> {
        if !self.is_valid_car(id) {
            return Err(ValidationError::CarOutOfRange { car: id, num_cars: self.cars.len() });
        }
        Ok(&self.cars[id])
    }

    pub fn validate_hall_call(&self, floor: u8, direction: Direction) -> Result<HallCall, ValidationError> {
        HallCall::new(floor, direction, self.num_floors)
    }

    pub fn validate_car_call(&self, car: CarId, floor: u8) -> Result<&Car, ValidationError> {
        let car = self.validate_car(car)?;
        self.validate_floor(floor)?;
        Ok(car)
    }

    // HALL CALLS

    /// Returns `false` when the button was already lit.
    pub(crate) fn register_hall_call(&self, call: HallCall) -> bool {
        let mut floors = self.floors.lock();
        match floors.get_mut((call.floor as usize).wrapping_sub(1)) {
            Some(floor) if !floor.is_pressed(call.direction) => {
                floor.press(call.direction);
                true
            }
            _ => false,
        }
    }

    /// Returns `false` when the button was not lit.
    pub(crate) fn clear_hall_call(&self, call: HallCall) -> bool {
        let mut floors = self.floors.lock();
        match floors.get_mut((call.floor as usize).wrapping_sub(1)) {
            Some(floor) if floor.is_pressed(call.direction) => {
                floor.clear(call.direction);
                true
            }
            _ => false,
        }
    }

    pub fn has_hall_call(&self, call: HallCall) -> bool {
        self.floor(call.floor).map_or(false, |floor| floor.is_pressed(call.direction))
    }

    pub fn has_any_hall_call(&self) -> bool {
        self.floors.lock().iter().any(|floor| floor.up_pressed || floor.down_pressed)
    }

    /// Every lit hall-call button, lowest floor first.
    pub fn hall_calls(&self) -> Vec<HallCall> {
        self.floors
            .lock()
            .iter()
            .flat_map(|floor| HallCall::iter_floor(floor.number).filter(move |call| floor.is_pressed(call.direction)))
            .collect()
    }
}
