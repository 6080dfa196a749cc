use std::collections::BTreeSet;

use shared_resources::call::HallCall;
use shared_resources::config::{ControllerType, SimulationConfig};
use shared_resources::direction::Direction;
use shared_resources::error::ValidationError;
use simulator::{CarState, Notification, Simulation, StateTransition};

fn simulation(num_elevators: u8, controller: ControllerType) -> Simulation {
    Simulation::new(SimulationConfig {
        num_floors: 10,
        num_elevators,
        car_capacity: 6,
        controller,
        ..SimulationConfig::default()
    })
    .unwrap()
}

fn is_quiet(sim: &Simulation) -> bool {
    let status = sim.status();
    status.hall_calls.is_empty()
        && status.cars.iter().all(|car| car.state == CarState::Idle && car.car_calls.is_empty())
}

fn single_trip(controller: ControllerType) {
    let sim = simulation(1, controller);
    let notifications = sim.subscribe();
    sim.submit_hall_call(3, Direction::Up).unwrap();
    for _ in 0..30 {
        sim.advance_tick();
    }

    let states: Vec<CarState> = notifications
        .try_iter()
        .filter_map(|n| match n {
            Notification::Transition(StateTransition { car: 0, to, .. }) => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            CarState::Moving,
            CarState::DoorsOpening,
            CarState::DoorsOpen,
            CarState::DoorsClosing,
            CarState::Idle,
        ]
    );

    let car = &sim.status().cars[0];
    assert_eq!(car.floor, 3);
    assert_eq!(car.direction, Direction::Idle);
    assert!(!sim.building().has_hall_call(HallCall { floor: 3, direction: Direction::Up }));
    assert!(sim.ledger_entries().is_empty());
}

#[test]
fn single_car_serves_a_hall_call_centralized() {
    single_trip(ControllerType::Centralized);
}

#[test]
fn single_car_serves_a_hall_call_decentralized() {
    single_trip(ControllerType::Decentralized);
}

#[test]
fn trip_takes_travel_and_door_time() {
    let sim = simulation(1, ControllerType::Centralized);
    sim.submit_hall_call(3, Direction::Up).unwrap();

    let mut arrived_at = None;
    let mut idle_at = None;
    for _ in 0..30 {
        sim.advance_tick();
        let state = sim.building().cars()[0].state();
        if state == CarState::DoorsOpening && arrived_at.is_none() {
            arrived_at = Some(sim.current_tick());
        }
        if state == CarState::Idle && arrived_at.is_some() && idle_at.is_none() {
            idle_at = Some(sim.current_tick());
        }
    }
    // Dispatched on tick 1, two floors at two ticks each.
    assert_eq!(arrived_at, Some(5));
    // Opening 1, dwell 3, closing 1.
    assert_eq!(idle_at, Some(10));
}

#[test]
fn duplicate_hall_calls_produce_one_entry() {
    for controller in [ControllerType::Centralized, ControllerType::Decentralized] {
        let sim = simulation(3, controller);
        sim.submit_hall_call(6, Direction::Down).unwrap();
        sim.submit_hall_call(6, Direction::Down).unwrap();
        sim.advance_tick();
        sim.submit_hall_call(6, Direction::Down).unwrap();
        sim.advance_tick();

        let entries = sim.ledger_entries();
        assert_eq!(entries.len(), 1, "{:?}", controller);
        assert!(entries[0].holder.is_some());
        assert_eq!(sim.status().hall_calls, vec![HallCall { floor: 6, direction: Direction::Down }]);
    }
}

#[test]
fn opposite_ends_go_to_distinct_cars() {
    let sim = simulation(2, ControllerType::Decentralized);
    sim.submit_hall_call(2, Direction::Up).unwrap();
    sim.submit_hall_call(9, Direction::Down).unwrap();
    sim.advance_tick();

    let holders: Vec<_> = sim.ledger_entries().iter().map(|entry| entry.holder).collect();
    assert_eq!(holders.len(), 2);
    assert!(holders.iter().all(Option::is_some));
    assert_ne!(holders[0], holders[1]);
}

#[test]
fn centralized_prefers_the_idle_car() {
    let sim = simulation(2, ControllerType::Centralized);
    sim.submit_car_call(0, 10).unwrap();
    sim.advance_tick();
    // Car 0 heads up; a down call lower in the building goes to car 1.
    sim.submit_hall_call(4, Direction::Down).unwrap();
    sim.advance_tick();

    let entries = sim.ledger_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].holder, Some(1));
}

#[test]
fn car_reverses_to_serve_a_down_call_at_the_top() {
    let sim = simulation(1, ControllerType::Centralized);
    sim.submit_hall_call(10, Direction::Down).unwrap();
    sim.submit_car_call(0, 4).unwrap();

    let mut visited = Vec::new();
    let notifications = sim.subscribe();
    for _ in 0..200 {
        sim.advance_tick();
        if is_quiet(&sim) {
            break;
        }
    }
    for notification in notifications.try_iter() {
        if let Notification::Transition(StateTransition { to: CarState::DoorsOpening, floor, .. }) = notification {
            visited.push(floor);
        }
    }
    assert_eq!(visited, vec![4, 10]);
    assert!(is_quiet(&sim));
    assert_eq!(sim.status().cars[0].floor, 10);
}

#[test]
fn closing_doors_never_strand_a_car() {
    for controller in [ControllerType::Centralized, ControllerType::Decentralized] {
        let sim = simulation(1, controller);
        sim.submit_car_call(0, 5).unwrap();
        let mut saw_closing = false;
        for _ in 0..60 {
            sim.advance_tick();
            let car = &sim.building().cars()[0];
            if car.state() == CarState::DoorsClosing && car.ticks_remaining() == 0 {
                panic!("car left waiting in DoorsClosing at tick {}", sim.current_tick());
            }
            if car.state() == CarState::DoorsClosing && !saw_closing {
                saw_closing = true;
                // New work arrives while the doors close.
                sim.submit_hall_call(2, Direction::Up).unwrap();
            }
        }
        assert!(saw_closing);
        assert!(is_quiet(&sim), "{:?}: {:?}", controller, sim.status());
        assert_eq!(sim.status().cars[0].floor, 2);
    }
}

#[test]
fn all_work_is_eventually_served() {
    for controller in [ControllerType::Centralized, ControllerType::Decentralized] {
        let sim = simulation(3, controller);
        let mut seed: u32 = 0x2545_f491;
        let mut next = move |bound: u32| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed % bound
        };

        for _ in 0..200 {
            match next(4) {
                0 => {
                    let floor = next(10) as u8 + 1;
                    let direction = if next(2) == 0 { Direction::Up } else { Direction::Down };
                    let _ = sim.submit_hall_call(floor, direction);
                }
                1 => {
                    let _ = sim.submit_car_call(next(3) as usize, next(10) as u8 + 1);
                }
                2 => {
                    let _ = sim.board_passenger(next(3) as usize);
                }
                _ => {
                    let _ = sim.alight_passenger(next(3) as usize);
                }
            }
            sim.advance_tick();
            check_invariants(&sim);
        }

        for _ in 0..3000 {
            if is_quiet(&sim) {
                break;
            }
            sim.advance_tick();
            check_invariants(&sim);
        }
        assert!(is_quiet(&sim), "{:?}: {:?}", controller, sim.status());
        assert!(sim.ledger_entries().is_empty());
    }
}

#[test]
fn out_of_range_floors_never_reach_a_car() {
    for controller in [ControllerType::Centralized, ControllerType::Decentralized] {
        let sim = simulation(1, controller);
        assert_eq!(sim.submit_car_call(0, 42), Err(ValidationError::FloorOutOfRange { floor: 42, num_floors: 10 }));
        assert_eq!(sim.submit_car_call(0, 0), Err(ValidationError::FloorOutOfRange { floor: 0, num_floors: 10 }));
        assert!(sim.submit_hall_call(11, Direction::Up).is_err());
        assert!(sim.submit_hall_call(10, Direction::Up).is_err());

        // Car state is only reachable through getters from outside the crate.
        let car = &sim.building().cars()[0];
        for _ in 0..200 {
            sim.advance_tick();
            assert!((1..=10).contains(&car.floor()));
            assert!(!car.has_car_calls());
        }
        assert_eq!(car.state(), CarState::Idle);
        assert!(sim.ledger_entries().is_empty());
        assert!(sim.status().hall_calls.is_empty());
    }
}

fn check_invariants(sim: &Simulation) {
    let status = sim.status();
    for car in &status.cars {
        assert!(car.passengers <= car.capacity);
        assert!(car.car_calls.iter().all(|floor| (1..=10).contains(floor)));
        if car.direction == Direction::Idle {
            assert_eq!(car.state, CarState::Idle);
        }
    }
    // Every lit button has exactly one ledger entry and vice versa.
    let lit: BTreeSet<HallCall> = status.hall_calls.into_iter().collect();
    let ledger: BTreeSet<HallCall> = sim.ledger_entries().into_iter().map(|entry| entry.call).collect();
    assert_eq!(lit, ledger);
}
