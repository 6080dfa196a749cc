/// ----- SCHEDULER -----
/// Decides which car serves which hall call and tells cars where to go.
/// Two strategies share one interface and one set of dispatch helpers; they
/// differ only in how a hall call comes to be held by a car.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use shared_resources::call::{CarId, HallCall};
use shared_resources::config::ControllerType;
use shared_resources::direction::Direction;
use shared_resources::event::Event;
use shared_resources::event_channel::EventChannel;

use crate::utilities::building::Building;
use crate::utilities::car::Car;

pub mod centralized;
pub mod decentralized;
pub mod ledger;

pub use centralized::CentralizedScheduler;
pub use decentralized::DecentralizedScheduler;
pub use ledger::{HallCallLedger, LedgerEntry};

pub trait Scheduler: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle_hall_call(&self, floor: u8, direction: Direction);

    fn handle_car_call(&self, car: CarId, floor: u8);

    fn on_arrived(&self, car: CarId, floor: u8);

    fn on_doors_opened(&self, car: CarId, floor: u8);

    fn on_doors_closed(&self, car: CarId);

    /// Per-tick housekeeping, run after the tick's events are routed.
    fn tick(&self);

    /// Assignment table or claim board, depending on the strategy.
    fn ledger(&self) -> &HallCallLedger;
}

pub fn create_scheduler(
    controller: ControllerType,
    building: Arc<Building>,
    events: Arc<EventChannel<Event>>,
) -> Box<dyn Scheduler> {
    match controller {
        ControllerType::Centralized => Box::new(CentralizedScheduler::new(building, events)),
        ControllerType::Decentralized => Box::new(DecentralizedScheduler::new(building, events)),
    }
}

/// State and helpers both strategies dispatch with.
pub(crate) struct Dispatcher {
    pub building: Arc<Building>,
    pub events: Arc<EventChannel<Event>>,
    pub ledger: HallCallLedger,
}

impl Dispatcher {
    pub fn new(building: Arc<Building>, events: Arc<EventChannel<Event>>) -> Self {
        Dispatcher { building, events, ledger: HallCallLedger::new() }
    }

    pub fn hall_call(&self, floor: u8, direction: Direction) -> Option<HallCall> {
        match self.building.validate_hall_call(floor, direction) {
            Ok(call) => Some(call),
            Err(e) => {
                debug!("ignoring hall call ({}, {}): {}", floor, direction, e);
                None
            }
        }
    }

    /// Adds the car call and looks for something for the car to do.
    pub fn car_call(&self, car: CarId, floor: u8) {
        let car = match self.building.validate_car_call(car, floor) {
            Ok(car) => car,
            Err(e) => {
                debug!("ignoring car call: {}", e);
                return;
            }
        };
        if !car.add_car_call(floor) {
            debug!("car {} already stops at floor {}", car.id(), floor);
        }
        self.dispatch(car);
    }

    /// Sends a car that is free to take orders to its nearest destination:
    /// a pending car call or a hall call it holds. Cars with nothing to do
    /// settle to `Idle`.
    pub fn dispatch(&self, car: &Car) {
        if !car.is_dispatchable() {
            return;
        }
        let here = car.floor();
        let mut destinations: BTreeSet<u8> = car.car_calls();
        destinations.extend(self.ledger.held_by(car.id()).iter().map(|call| call.floor));

        let Some(destination) = destinations.iter().copied().min_by_key(|floor| floor.abs_diff(here)) else {
            if car.settle() {
                debug!("car {} has no work left at floor {}", car.id(), here);
            }
            return;
        };

        if destination == here {
            let direction = self.service_direction(car, here);
            if car.open_doors(direction) {
                debug!("car {} opens its doors at floor {} going {}", car.id(), here, direction);
                self.events.push(Event::ElevatorArrived { car: car.id(), floor: here });
            }
        } else if car.start_moving(destination) {
            debug!("car {} heads from floor {} to floor {}", car.id(), here, destination);
        }
    }

    /// Direction a car standing at `floor` should announce when it opens its
    /// doors: that of a hall call it holds there, otherwise its own.
    fn service_direction(&self, car: &Car, floor: u8) -> Direction {
        let held: Vec<HallCall> = self.ledger.held_by(car.id()).into_iter().filter(|call| call.floor == floor).collect();
        let current = car.direction();
        if held.iter().any(|call| call.direction == current) {
            return current;
        }
        if let Some(call) = held.first() {
            return call.direction;
        }
        match current {
            Direction::Idle if floor == self.building.num_floors() => Direction::Down,
            Direction::Idle => Direction::Up,
            direction => direction,
        }
    }

    /// Clears what the car served by stopping at `floor`.
    pub fn serve_arrival(&self, id: CarId, floor: u8) {
        let Some(car) = self.building.car(id) else {
            debug!("arrival of unknown car {}", id);
            return;
        };
        car.remove_car_call(floor);

        let direction = car.direction();
        let call = HallCall { floor, direction };
        if self.ledger.release(call, id) {
            self.building.clear_hall_call(call);
            debug!("car {} served hall call {}", id, call);
        }

        // LOOK: turn around here if the opposite call is ours and nothing lies ahead.
        let opposite = HallCall { floor, direction: direction.opposite() };
        if self.ledger.holder(opposite) == Some(id) && !self.has_work_ahead(car) {
            self.ledger.release(opposite, id);
            self.building.clear_hall_call(opposite);
            car.reverse();
            debug!("car {} reverses at floor {} to serve hall call {}", id, floor, opposite);
        }
    }

    fn has_work_ahead(&self, car: &Car) -> bool {
        if car.has_calls_ahead() {
            return true;
        }
        let (direction, floor) = (car.direction(), car.floor());
        self.ledger.held_by(car.id()).iter().any(|call| direction.is_ahead(floor, call.floor))
    }

    /// Makes a moving car stop at `call` when it is already heading that way.
    pub fn pick_up_on_the_way(&self, car: &Car, call: HallCall) {
        if car.direction() == call.direction && car.retarget(call.floor) {
            debug!("car {} will stop at floor {} on its way", car.id(), call.floor);
        }
    }
}
