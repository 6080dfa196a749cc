/// ----- DECENTRALIZED SCHEDULER -----
/// No car is told what to do. Hall calls are posted on a shared claim board
/// and every car picks up the nearest unclaimed one on its own, once per tick.

use std::sync::Arc;

use log::debug;
use shared_resources::call::CarId;
use shared_resources::direction::Direction;
use shared_resources::event::Event;
use shared_resources::event_channel::EventChannel;

use super::{Dispatcher, HallCallLedger, Scheduler};
use crate::utilities::building::Building;
use crate::utilities::car::{Car, CarState};

pub struct DecentralizedScheduler {
    dispatcher: Dispatcher,
}

impl DecentralizedScheduler {
    pub fn new(building: Arc<Building>, events: Arc<EventChannel<Event>>) -> Self {
        DecentralizedScheduler { dispatcher: Dispatcher::new(building, events) }
    }

    /// A car looks for new work when idle or when no passenger is waiting
    /// to be dropped off.
    fn claim_for(&self, car: &Car) {
        if car.state() != CarState::Idle && car.has_car_calls() {
            return;
        }
        if let Some(call) = self.dispatcher.ledger.claim_nearest(car.id(), car.floor()) {
            debug!("car {} claimed hall call {}", car.id(), call);
            self.dispatcher.pick_up_on_the_way(car, call);
        }
    }
}

impl Scheduler for DecentralizedScheduler {
    fn name(&self) -> &'static str {
        "decentralized"
    }

    fn handle_hall_call(&self, floor: u8, direction: Direction) {
        let Some(call) = self.dispatcher.hall_call(floor, direction) else {
            return;
        };
        self.dispatcher.building.register_hall_call(call);
        if self.dispatcher.ledger.open(call) {
            debug!("posted hall call {} on the claim board", call);
        } else {
            debug!("hall call {} is already on the claim board", call);
        }
    }

    fn handle_car_call(&self, car: CarId, floor: u8) {
        self.dispatcher.car_call(car, floor);
    }

    fn on_arrived(&self, car: CarId, floor: u8) {
        self.dispatcher.serve_arrival(car, floor);
    }

    fn on_doors_opened(&self, car: CarId, floor: u8) {
        debug!("car {} doors open at floor {}", car, floor);
    }

    fn on_doors_closed(&self, car: CarId) {
        if let Some(car) = self.dispatcher.building.car(car) {
            self.dispatcher.dispatch(car);
        }
    }

    fn tick(&self) {
        for car in self.dispatcher.building.cars() {
            self.claim_for(car);
            self.dispatcher.dispatch(car);
        }
    }

    fn ledger(&self) -> &HallCallLedger {
        &self.dispatcher.ledger
    }
}

#[cfg(test)]
mod tests {
    use shared_resources::call::HallCall;
    use shared_resources::config::SimulationConfig;

    use super::*;
    use crate::utilities::car::Advance;

    fn scheduler(num_elevators: u8) -> (DecentralizedScheduler, Arc<Building>) {
        let config = SimulationConfig { num_floors: 10, num_elevators, ..SimulationConfig::default() };
        let building = Arc::new(Building::new(&config));
        let events = Arc::new(EventChannel::new());
        (DecentralizedScheduler::new(building.clone(), events), building)
    }

    #[test]
    fn hall_calls_wait_unclaimed_until_the_next_tick() {
        let (scheduler, building) = scheduler(1);
        scheduler.handle_hall_call(4, Direction::Up);
        scheduler.handle_hall_call(4, Direction::Up);

        let call = HallCall { floor: 4, direction: Direction::Up };
        assert_eq!(scheduler.ledger().len(), 1);
        assert!(scheduler.ledger().contains(call));
        assert_eq!(scheduler.ledger().holder(call), None);
        assert_eq!(building.cars()[0].state(), CarState::Idle);

        scheduler.tick();
        assert_eq!(scheduler.ledger().holder(call), Some(0));
        assert_eq!(building.cars()[0].state(), CarState::Moving);
    }

    #[test]
    fn opposite_ends_are_claimed_by_different_cars() {
        let (scheduler, building) = scheduler(2);
        scheduler.handle_hall_call(2, Direction::Up);
        scheduler.handle_hall_call(9, Direction::Down);
        scheduler.tick();

        let low = scheduler.ledger().holder(HallCall { floor: 2, direction: Direction::Up });
        let high = scheduler.ledger().holder(HallCall { floor: 9, direction: Direction::Down });
        assert!(low.is_some() && high.is_some());
        assert_ne!(low, high);
        assert_eq!(building.cars()[0].target(), Some(2));
        assert_eq!(building.cars()[1].target(), Some(9));
    }

    #[test]
    fn busy_cars_with_passengers_do_not_claim() {
        let (scheduler, building) = scheduler(1);
        scheduler.handle_car_call(0, 8);
        scheduler.handle_hall_call(3, Direction::Down);
        scheduler.tick();
        assert_eq!(scheduler.ledger().holder(HallCall { floor: 3, direction: Direction::Down }), None);
        assert_eq!(building.cars()[0].target(), Some(8));
    }

    #[test]
    fn moving_car_without_car_calls_stops_for_a_claim_ahead() {
        let (scheduler, building) = scheduler(1);
        scheduler.handle_hall_call(9, Direction::Down);
        scheduler.tick();
        scheduler.handle_hall_call(5, Direction::Up);
        scheduler.tick();

        let car = &building.cars()[0];
        assert_eq!(scheduler.ledger().held_by(0).len(), 2);
        assert_eq!(car.target(), Some(5));
        while car.advance() != Advance::Arrived(5) {}
        scheduler.on_arrived(0, 5);
        assert!(!building.has_hall_call(HallCall { floor: 5, direction: Direction::Up }));
        assert_eq!(scheduler.ledger().held_by(0), vec![HallCall { floor: 9, direction: Direction::Down }]);
    }

    #[test]
    fn car_call_dispatches_immediately() {
        let (scheduler, building) = scheduler(1);
        scheduler.handle_car_call(0, 6);
        assert_eq!(building.cars()[0].state(), CarState::Moving);
        assert_eq!(building.cars()[0].direction(), Direction::Up);
    }
}
