/// ----- CENTRALIZED SCHEDULER -----
/// One decision maker sees every car. A new hall call goes to the car that
/// would serve it cheapest, and stays with that car until it is served.

use std::sync::Arc;

use log::debug;
use shared_resources::call::CarId;
use shared_resources::direction::Direction;
use shared_resources::event::Event;
use shared_resources::event_channel::EventChannel;

use super::{Dispatcher, HallCallLedger, Scheduler};
use crate::utilities::building::Building;

pub struct CentralizedScheduler {
    dispatcher: Dispatcher,
}

impl CentralizedScheduler {
    pub fn new(building: Arc<Building>, events: Arc<EventChannel<Event>>) -> Self {
        CentralizedScheduler { dispatcher: Dispatcher::new(building, events) }
    }
}

impl Scheduler for CentralizedScheduler {
    fn name(&self) -> &'static str {
        "centralized"
    }

    fn handle_hall_call(&self, floor: u8, direction: Direction) {
        let Some(call) = self.dispatcher.hall_call(floor, direction) else {
            return;
        };
        let building = &self.dispatcher.building;
        if let Some(holder) = self.dispatcher.ledger.holder(call) {
            debug!("hall call {} is already assigned to car {}", call, holder);
            return;
        }
        building.register_hall_call(call);

        // Costs are read car by car before the table is touched.
        let num_floors = building.num_floors();
        let Some(best) = building.cars().iter().min_by_key(|car| car.cost_to_serve(floor, direction, num_floors)) else {
            return;
        };
        if !self.dispatcher.ledger.assign(call, best.id()) {
            debug!("hall call {} was assigned concurrently", call);
            return;
        }
        debug!("assigned hall call {} to car {}", call, best.id());

        self.dispatcher.pick_up_on_the_way(best, call);
        self.dispatcher.dispatch(best);
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
            self.dispatcher.dispatch(car);
        }
    }

    fn ledger(&self) -> &HallCallLedger {
        &self.dispatcher.ledger
    }
}
