use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn, LevelFilter};

use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerType {
    #[default]
    #[serde(alias = "master")]
    Centralized,
    #[serde(alias = "distributed")]
    Decentralized,
}

impl ControllerType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "centralized" | "master" => Some(ControllerType::Centralized),
            "decentralized" | "distributed" => Some(ControllerType::Decentralized),
            _ => None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_floors: u8,
    pub num_elevators: u8,
    pub car_capacity: u8,
    pub tick_duration_ms: u64,
    pub door_open_ticks: u32,
    pub floor_travel_ticks: u32,
    pub controller: ControllerType,
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_floors: 10,
            num_elevators: 3,
            car_capacity: 6,
            tick_duration_ms: 500,
            door_open_ticks: 3,
            floor_travel_ticks: 2,
            controller: ControllerType::Centralized,
            log_level: String::from("info"),
        }
    }
}

impl SimulationConfig {
    /// Reads `config.json` (or the file named by `--config`) when present,
    /// applies command-line overrides and validates the result.
    pub fn get() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().skip(1).collect();
        let file_path = config_path(&args);
        let mut config = if Path::new(&file_path).exists() {
            Self::load(&file_path)?
        } else {
            info!("No configuration file provided, using default settings...");
            Self::default()
        };
        config.apply_args(&args);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `--flag value` pairs. Unknown flags and unparsable values are
    /// skipped with a warning.
    pub fn apply_args(&mut self, args: &[String]) {
        for arg_pair in args.chunks_exact(2) {
            let value = arg_pair[1].as_str();
            match arg_pair[0].as_str() {
                "--floors" | "-f" => parse_into(&mut self.num_floors, "floors", value),
                "--elevators" | "-e" => parse_into(&mut self.num_elevators, "elevators", value),
                "--capacity" | "-c" => parse_into(&mut self.car_capacity, "capacity", value),
                "--tick" | "-t" => parse_into(&mut self.tick_duration_ms, "tick", value),
                "--mode" | "-m" => match ControllerType::parse(value) {
                    Some(controller) => self.controller = controller,
                    None => warn!("mode {} is not master or distributed, skipping...", value),
                },
                "--log-level" => self.log_level = value.to_string(),
                "--config" => {}
                other => warn!("illegal argument {}, skipping...", other),
            }
        }
        if args.len() % 2 == 1 {
            warn!("argument {} has no value, skipping...", args[args.len() - 1]);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("num_floors", self.num_floors as u64, 1, 12)?;
        check_range("num_elevators", self.num_elevators as u64, 1, 3)?;
        check_range("car_capacity", self.car_capacity as u64, 1, 10)?;
        check_range("tick_duration_ms", self.tick_duration_ms, 100, 2000)?;
        check_range("door_open_ticks", self.door_open_ticks as u64, 1, u32::MAX as u64)?;
        check_range("floor_travel_ticks", self.floor_travel_ticks as u64, 1, u32::MAX as u64)?;
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_duration_ms)
    }

    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

fn config_path(args: &[String]) -> String {
    args.chunks_exact(2)
        .find(|pair| pair[0] == "--config")
        .map(|pair| pair[1].clone())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn parse_into<T: FromStr>(field: &mut T, name: &str, value: &str) {
    match value.parse::<T>() {
        Ok(parsed) => *field = parsed,
        Err(_) => warn!("{} {} is not a number, skipping...", name, value),
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_duration(), Duration::from_millis(500));
        assert_eq!(config.log_level(), LevelFilter::Info);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = SimulationConfig::from_json(r#"{ "num_floors": 12, "controller": "distributed" }"#).unwrap();
        assert_eq!(config.num_floors, 12);
        assert_eq!(config.num_elevators, 3);
        assert_eq!(config.controller, ControllerType::Decentralized);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = SimulationConfig::from_json(r#"{ "num_elevators": 4 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: "num_elevators", value: 4, min: 1, max: 3 }
        ));
        assert!(matches!(
            SimulationConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn command_line_overrides_file_settings() {
        let mut config = SimulationConfig::default();
        config.apply_args(&args(&["--floors", "6", "-e", "2", "--mode", "master", "--tick", "abc"]));
        assert_eq!(config.num_floors, 6);
        assert_eq!(config.num_elevators, 2);
        assert_eq!(config.controller, ControllerType::Centralized);
        assert_eq!(config.tick_duration_ms, 500);

        config.apply_args(&args(&["-m", "distributed", "--log-level", "debug"]));
        assert_eq!(config.controller, ControllerType::Decentralized);
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn finds_an_explicit_config_path() {
        assert_eq!(config_path(&args(&["--floors", "4"])), DEFAULT_CONFIG_PATH);
        assert_eq!(config_path(&args(&["--config", "sim.json", "-e", "1"])), "sim.json");
    }
}
