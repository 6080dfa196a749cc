/// ----- SIMULATION MODULE -----
/// The tick driver. A dedicated thread wakes up once per tick, advances every
/// car's timer, turns the resulting state changes into events and routes every
/// queued event to the scheduler before sleeping again. Commands from other
/// threads are validated here and only ever enqueue events.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;
use shared_resources::call::CarId;
use shared_resources::config::SimulationConfig;
use shared_resources::direction::Direction;
use shared_resources::error::{CommandError, ConfigError, ValidationError};
use shared_resources::event::Event;
use shared_resources::event_channel::EventChannel;

use crate::scheduler::{create_scheduler, LedgerEntry, Scheduler};
use crate::utilities::building::Building;
use crate::utilities::car::Advance;
use crate::utilities::status::{Notification, SimulationStatus, StateTransition};

pub struct Simulation {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    config: SimulationConfig,
    building: Arc<Building>,
    events: Arc<EventChannel<Event>>,
    scheduler: Box<dyn Scheduler>,
    tick: Arc<AtomicU64>,
    step_lock: Mutex<()>,
    running: AtomicBool,
    // Dropping the sender wakes the tick thread and makes it exit.
    stop_tx: Mutex<Option<Sender<()>>>,
    stop_rx: Receiver<()>,
    subscribers: Mutex<Vec<Sender<Notification>>>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let building = Arc::new(Building::new(&config));
        let events = Arc::new(EventChannel::new());
        let scheduler = create_scheduler(config.controller, building.clone(), events.clone());
        let (stop_tx, stop_rx) = bounded(0);
        info!(
            "{} floors, {} cars, {} scheduler",
            config.num_floors,
            config.num_elevators,
            scheduler.name()
        );

        Ok(Simulation {
            shared: Arc::new(Shared {
                config,
                building,
                events,
                scheduler,
                tick: Arc::new(AtomicU64::new(0)),
                step_lock: Mutex::new(()),
                running: AtomicBool::new(false),
                stop_tx: Mutex::new(Some(stop_tx)),
                stop_rx,
                subscribers: Mutex::new(Vec::new()),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Spawns the tick thread. Does nothing if it is already running. A
    /// stopped simulation stays stopped.
    pub fn start(&self) -> std::io::Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }
        if self.shared.events.is_shutdown() {
            warn!("simulation was stopped and cannot be restarted");
            return Ok(());
        }

        self.shared.running.store(true, Ordering::SeqCst);
        let shared = self.shared.clone();
        let handle = thread::Builder::new().name("tick".to_string()).spawn(move || shared.run())?;
        *worker = Some(handle);
        info!("simulation started, one tick every {} ms", self.shared.config.tick_duration_ms);
        Ok(())
    }

    /// Stops the tick thread and waits for it. Idempotent.
    pub fn stop(&self) {
        self.shared.request_shutdown();
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("tick thread panicked");
            }
            info!("simulation stopped at tick {}", self.current_tick());
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn current_tick(&self) -> u64 {
        self.shared.tick.load(Ordering::SeqCst)
    }

    pub fn tick_counter(&self) -> Arc<AtomicU64> {
        self.shared.tick.clone()
    }

    /// Runs one tick on the calling thread.
    pub fn advance_tick(&self) {
        self.shared.step();
    }

    pub fn building(&self) -> &Building {
        &self.shared.building
    }

    pub fn scheduler_name(&self) -> &'static str {
        self.shared.scheduler.name()
    }

    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.shared.scheduler.ledger().entries()
    }

    pub fn status(&self) -> SimulationStatus {
        SimulationStatus::new(self.current_tick(), self.scheduler_name(), &self.shared.building)
    }

    /// Every routed event and car state change from now on.
    pub fn subscribe(&self) -> Receiver<Notification> {
        let (tx, rx) = unbounded();
        self.shared.subscribers.lock().push(tx);
        rx
    }

    // COMMANDS

    pub fn submit_hall_call(&self, floor: u8, direction: Direction) -> Result<(), ValidationError> {
        let call = self.shared.building.validate_hall_call(floor, direction).map_err(|e| {
            warn!("rejected hall call: {}", e);
            e
        })?;
        self.shared.events.push(Event::HallCall { floor: call.floor, direction: call.direction });
        Ok(())
    }

    pub fn submit_car_call(&self, car: CarId, floor: u8) -> Result<(), ValidationError> {
        self.shared.building.validate_car_call(car, floor).map_err(|e| {
            warn!("rejected car call: {}", e);
            e
        })?;
        self.shared.events.push(Event::CarCall { car, floor });
        Ok(())
    }

    pub fn board_passenger(&self, car: CarId) -> Result<u8, CommandError> {
        let passengers = self.shared.building.validate_car(car)?.board()?;
        debug!("car {} now carries {} passengers", car, passengers);
        Ok(passengers)
    }

    pub fn alight_passenger(&self, car: CarId) -> Result<u8, CommandError> {
        let passengers = self.shared.building.validate_car(car)?.alight()?;
        debug!("car {} now carries {} passengers", car, passengers);
        Ok(passengers)
    }

    /// Queues a `Shutdown` event; the engine stops once it is routed.
    pub fn request_shutdown(&self) {
        self.shared.events.push(Event::Shutdown);
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn run(&self) {
        let ticker = tick(self.config.tick_duration());
        loop {
            select! {
                recv(ticker) -> _ => {
                    self.step();
                    if self.events.is_shutdown() {
                        break;
                    }
                },
                recv(self.stop_rx) -> _ => break,
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    fn step(&self) {
        let _step = self.step_lock.lock();
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;

        for car in self.building.cars() {
            let id = car.id();
            match car.advance() {
                Advance::Arrived(floor) => self.events.push(Event::ElevatorArrived { car: id, floor }),
                Advance::DoorsOpened(floor) => self.events.push(Event::DoorsOpened { car: id, floor }),
                Advance::DoorsClosed => {
                    if car.has_car_calls() || self.building.has_any_hall_call() {
                        self.events.push(Event::DoorsClosed { car: id });
                    } else {
                        car.settle();
                    }
                }
                Advance::PassedFloor(floor) => trace!("car {} passed floor {}", id, floor),
                Advance::ClosingDoors | Advance::Nothing => {}
            }
        }
        self.publish_transitions(tick);

        self.drain(tick);
        self.scheduler.tick();
        self.publish_transitions(tick);
        self.drain(tick);
    }

    fn drain(&self, tick: u64) {
        while let Some(event) = self.events.try_pop() {
            trace!("routing {}", event);
            self.notify(Notification::Event { tick, event });
            self.route(event);
            self.publish_transitions(tick);
        }
    }

    fn route(&self, event: Event) {
        match event {
            Event::HallCall { floor, direction } => self.scheduler.handle_hall_call(floor, direction),
            Event::CarCall { car, floor } => self.scheduler.handle_car_call(car, floor),
            Event::ElevatorArrived { car, floor } => self.scheduler.on_arrived(car, floor),
            Event::DoorsOpened { car, floor } => self.scheduler.on_doors_opened(car, floor),
            Event::DoorsClosed { car } => self.scheduler.on_doors_closed(car),
            Event::Shutdown => {
                info!("shutdown requested");
                self.request_shutdown();
            }
        }
    }

    fn publish_transitions(&self, tick: u64) {
        for car in self.building.cars() {
            for transition in car.take_transitions() {
                debug!("car {} {} -> {} at floor {}", car.id(), transition.from, transition.to, transition.floor);
                self.notify(Notification::Transition(StateTransition::new(tick, car.id(), transition)));
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.subscribers.lock().retain(|tx| tx.send(notification).is_ok());
    }

    fn request_shutdown(&self) {
        self.events.shutdown();
        self.stop_tx.lock().take();
    }
}
