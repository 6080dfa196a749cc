use std::io::Write;

use crossterm::{cursor, terminal, ExecutableCommand, Result};
use shared_resources::direction::Direction;

use super::status::SimulationStatus;

pub struct Debug<W: Write> {
    out: W,
    // Lines printed last time, erased before the next table is drawn.
    printed: u16,
}

impl<W: Write> Debug<W> {
    pub fn new(out: W) -> Self {
        Debug { out, printed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Something else was printed below the table; leave it on screen.
    pub fn forget(&mut self) {
        self.printed = 0;
    }

    /// Redraws the table in place of the previous one.
    pub fn refresh(&mut self, status: &SimulationStatus) -> Result<()> {
        if self.printed > 0 {
            self.out.execute(cursor::MoveUp(self.printed))?;
            self.out.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.printstatus(status)
    }

    pub fn printstatus(&mut self, status: &SimulationStatus) -> Result<()> {
        let mut lines = 0;
        let mut line = |out: &mut W, text: String| -> Result<()> {
            lines += 1;
            writeln!(out, "{}", text)
        };

        line(&mut self.out, format!("TICK {}  ({} scheduler)", status.tick, status.controller))?;
        line(&mut self.out, "+------+-------+--------------+-----------+------------------+-------+".to_string())?;
        line(
            &mut self.out,
            format!("| {:<4} | {:<5} | {:<12} | {:<9} | {:<16} | {:<5} |", "CAR", "FLOOR", "STATE", "DIRECTION", "CAR CALLS", "LOAD"),
        )?;
        line(&mut self.out, "+------+-------+--------------+-----------+------------------+-------+".to_string())?;
        for car in &status.cars {
            let calls: Vec<String> = car.car_calls.iter().map(|floor| floor.to_string()).collect();
            line(
                &mut self.out,
                format!(
                    "| {:<4} | {:<5} | {:<12} | {:<9} | {:<16} | {:<5} |",
                    car.id,
                    car.floor,
                    car.state,
                    car.direction,
                    calls.join(","),
                    format!("{}/{}", car.passengers, car.capacity),
                ),
            )?;
        }
        line(&mut self.out, "+------+-------+--------------+-----------+------------------+-------+".to_string())?;

        let hall_calls: Vec<String> = status
            .hall_calls
            .iter()
            .map(|call| match call.direction {
                Direction::Up => format!("{}u", call.floor),
                _ => format!("{}d", call.floor),
            })
            .collect();
        line(
            &mut self.out,
            format!("HALL CALLS: {}", if hall_calls.is_empty() { "none".to_string() } else { hall_calls.join(" ") }),
        )?;

        self.printed = lines;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shared_resources::call::HallCall;

    use super::*;
    use crate::utilities::car::CarState;
    use crate::utilities::status::CarStatus;

    #[test]
    fn prints_one_row_per_car() {
        let status = SimulationStatus {
            tick: 7,
            controller: "centralized".to_string(),
            cars: vec![CarStatus {
                id: 0,
                floor: 4,
                state: CarState::Moving,
                direction: Direction::Up,
                car_calls: vec![6, 9],
                next_stop: Some(6),
                passengers: 2,
                capacity: 6,
            }],
            hall_calls: vec![HallCall { floor: 3, direction: Direction::Down }],
        };
        let mut debug = Debug::new(Vec::new());
        debug.printstatus(&status).unwrap();
        let text = String::from_utf8(debug.into_inner()).unwrap();

        assert!(text.starts_with("TICK 7  (centralized scheduler)"));
        assert!(text.contains("| 0    | 4     | Moving       | Up        | 6,9              | 2/6   |"));
        assert!(text.ends_with("HALL CALLS: 3d\n"));
    }

    #[test]
    fn refresh_erases_the_previous_table() {
        let status = SimulationStatus { tick: 1, controller: "decentralized".to_string(), cars: vec![], hall_calls: vec![] };
        let mut debug = Debug::new(Vec::new());
        debug.refresh(&status).unwrap();
        let first = debug.out.len();
        debug.refresh(&status).unwrap();
        let text = String::from_utf8(debug.into_inner()).unwrap();

        assert!(!text[..first].contains('\u{1b}'), "nothing to erase the first time");
        assert!(text[first..].starts_with('\u{1b}'));
        assert!(text.ends_with("HALL CALLS: none\n"));
    }
}
