use std::io::stdout;

use crossbeam_channel::select;
use log::{info, LevelFilter, SetLoggerError};
use shared_resources::config::SimulationConfig;
use shared_resources::error::ConfigError;
use shared_resources::event::Event;
use thiserror::Error;

use crate::utilities::debug::Debug;
use crate::utilities::logger;
use crate::utilities::status::Notification;

pub mod console;
pub mod simulation;

use console::Command;
use simulation::Simulation;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not install the logger: {0}")]
    Logger(#[from] SetLoggerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not encode status: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn run() -> Result<(), RunError> {
    logger::init(LevelFilter::Info)?;

    // READ CONFIGURATION
    let config = SimulationConfig::get()?;
    log::set_max_level(config.log_level());

    // INITIALIZE SIMULATION
    let simulation = Simulation::new(config)?;
    logger::attach_tick_counter(simulation.tick_counter());
    let notifications = simulation.subscribe();

    println!("ELEVATOR SIMULATION\n-------------------");
    println!("{}", console::HELP);

    // INITIALIZE CONSOLE
    let lines = console::spawn_reader()?;
    simulation.start()?;

    let mut debug = Debug::new(stdout());
    let mut watching = false;

    loop {
        select! {
            recv(lines) -> line => {
                let Ok(line) = line else {
                    info!("stdin closed");
                    break;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Watch)) => {
                        watching = !watching;
                        debug.forget();
                        if watching {
                            debug.refresh(&simulation.status())?;
                        }
                    }
                    Ok(Some(command)) => {
                        debug.forget();
                        execute(&simulation, &mut debug, command)?;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug.forget();
                        println!("{}", e);
                    }
                }
            },
            recv(notifications) -> notification => match notification {
                Ok(Notification::Event { event: Event::Shutdown, .. }) | Err(_) => break,
                Ok(Notification::Event { event: Event::DoorsOpened { car, floor }, .. }) => {
                    info!("car {} opened its doors at floor {}", car, floor);
                    if watching {
                        debug.refresh(&simulation.status())?;
                    }
                }
                Ok(_) => {
                    if watching {
                        debug.refresh(&simulation.status())?;
                    }
                }
            },
        }
    }

    println!("STOPPING PROGRAM...");
    simulation.stop();
    Ok(())
}

fn execute<W: std::io::Write>(simulation: &Simulation, debug: &mut Debug<W>, command: Command) -> Result<(), RunError> {
    match command {
        Command::HallCall { floor, direction } => {
            if let Err(e) = simulation.submit_hall_call(floor, direction) {
                println!("rejected: {}", e);
            }
        }
        Command::CarCall { car, floor } => {
            if let Err(e) = simulation.submit_car_call(car, floor) {
                println!("rejected: {}", e);
            }
        }
        Command::Board(car) => match simulation.board_passenger(car) {
            Ok(passengers) => println!("car {} now carries {} passengers", car, passengers),
            Err(e) => println!("rejected: {}", e),
        },
        Command::Alight(car) => match simulation.alight_passenger(car) {
            Ok(passengers) => println!("car {} now carries {} passengers", car, passengers),
            Err(e) => println!("rejected: {}", e),
        },
        Command::Step => simulation.advance_tick(),
        Command::Status => debug.printstatus(&simulation.status())?,
        Command::Json => println!("{}", serde_json::to_string_pretty(&simulation.status())?),
        Command::Help => println!("{}", console::HELP),
        Command::Watch | Command::Quit => {}
    }
    Ok(())
}
