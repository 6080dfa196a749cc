use shared_resources::call::{CarId, HallCall};
use shared_resources::direction::Direction;
use shared_resources::event::Event;

use crate::utilities::building::Building;
use crate::utilities::car::{Car, CarState, Transition};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CarStatus {
    pub id: CarId,
    pub floor: u8,
    pub state: CarState,
    pub direction: Direction,
    pub car_calls: Vec<u8>,
    pub next_stop: Option<u8>,
    pub passengers: u8,
    pub capacity: u8,
}

impl CarStatus {
    pub fn new(car: &Car) -> Self {
        CarStatus {
            id: car.id(),
            floor: car.floor(),
            state: car.state(),
            direction: car.direction(),
            car_calls: car.car_calls().into_iter().collect(),
            next_stop: car.next_car_call(),
            passengers: car.passengers(),
            capacity: car.capacity(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationStatus {
    pub tick: u64,
    pub controller: String,
    pub cars: Vec<CarStatus>,
    pub hall_calls: Vec<HallCall>,
}

impl SimulationStatus {
    pub fn new(tick: u64, controller: &str, building: &Building) -> Self {
        SimulationStatus {
            tick,
            controller: controller.to_string(),
            cars: building.cars().iter().map(CarStatus::new).collect(),
            hall_calls: building.hall_calls(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub tick: u64,
    pub car: CarId,
    pub from: CarState,
    pub to: CarState,
    pub floor: u8,
}

impl StateTransition {
    pub fn new(tick: u64, car: CarId, transition: Transition) -> Self {
        StateTransition {
            tick,
            car,
            from: transition.from,
            to: transition.to,
            floor: transition.floor,
        }
    }
}

/// Everything a subscriber is told about: routed events and car state changes.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    Event { tick: u64, event: Event },
    Transition(StateTransition),
}
