use std::fs;
use std::io;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Read(#[from] io::Error),
    #[error("could not parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct ConfigFile {
    pub lift: HashMap<String, usize>,
    pub timing: HashMap<String, u64>,
    pub mode: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Shared state behind one lock and one condition variable.
    Monitor,
    /// One lift thread owning the state, passengers talk to it over channels.
    Message,
}

impl Mode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "monitor" => Some(Mode::Monitor),
            "message" => Some(Mode::Message),
            _ => None,
        }
    }

    pub fn as_string(self) -> String {
        match self {
            Mode::Monitor => String::from("monitor"),
            Mode::Message => String::from("message"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftConfig {
    pub num_floors: u8,
    pub max_n_persons: usize,
    pub max_n_passengers: usize,
}

impl LiftConfig {
    pub fn top_floor(&self) -> u8 {
        self.num_floors - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub transit: Duration,
    pub think: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub lift: LiftConfig,
    pub timing: TimingConfig,
    pub mode: Mode,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lift: LiftConfig {
                num_floors: 5,
                max_n_persons: 10,
                max_n_passengers: 5,
            },
            timing: TimingConfig {
                transit: Duration::from_millis(2000),
                think: Duration::from_millis(5000),
            },
            mode: Mode::Monitor,
            seed: None,
        }
    }
}

impl Config {
    /// Reads `config.json`, falling back to `_config.json` and then to the
    /// built-in defaults, and applies the command line overrides on top.
    pub fn get() -> Result<Self, ConfigError> {
        let file_path = "config.json";
        let fallback_file_path = "_config.json";
        let config = match read_config_file(file_path) {
            Ok(config_file) => Config::from_file(config_file)?,
            Err(ConfigError::Read(_)) => {
                warn!("No configuration file provided, using default settings...");
                match read_config_file(fallback_file_path) {
                    Ok(config_file) => Config::from_file(config_file)?,
                    Err(ConfigError::Read(_)) => {
                        warn!("No default settings file found, using built-in settings...");
                        Config::default()
                    },
                    Err(e) => return Err(e),
                }
            },
            Err(e) => return Err(e),
        };
        let args: Vec<String> = env::args().skip(1).collect();
        let config = parse_env_args(config, &args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(config_file: ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let num_floors = lookup(&config_file.lift, "num_floors", defaults.lift.num_floors as usize);
        let num_floors = u8::try_from(num_floors)
            .map_err(|_| ConfigError::Invalid(format!("num_floors {} does not fit in a floor number", num_floors)))?;
        let mode = Mode::parse(&config_file.mode)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown mode \"{}\"", config_file.mode)))?;

        let config = Config {
            lift: LiftConfig {
                num_floors: num_floors,
                max_n_persons: lookup(&config_file.lift, "max_n_persons", defaults.lift.max_n_persons),
                max_n_passengers: lookup(&config_file.lift, "max_n_passengers", defaults.lift.max_n_passengers),
            },
            timing: TimingConfig {
                transit: Duration::from_millis(lookup(&config_file.timing, "transit_ms", defaults.timing.transit.as_millis() as u64)),
                think: Duration::from_millis(lookup(&config_file.timing, "think_ms", defaults.timing.think.as_millis() as u64)),
            },
            mode: mode,
            seed: config_file.seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config_file: ConfigFile = serde_json::from_str(contents)?;
        Config::from_file(config_file)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lift.num_floors < 2 {
            return Err(ConfigError::Invalid(format!("a lift needs at least 2 floors, got {}", self.lift.num_floors)))
        }
        if self.lift.max_n_persons == 0 {
            return Err(ConfigError::Invalid(String::from("max_n_persons must be at least 1")))
        }
        if self.lift.max_n_passengers == 0 {
            return Err(ConfigError::Invalid(String::from("max_n_passengers must be at least 1")))
        }
        Ok(())
    }
}

fn lookup<T: Copy + std::fmt::Debug>(section: &HashMap<String, T>, key: &str, default: T) -> T {
    match section.get(key) {
        Some(value) => *value,
        None => {
            warn!("{} missing from configuration file, using {:?}", key, default);
            default
        },
    }
}

fn read_config_file(file_path: &str) -> Result<ConfigFile, ConfigError> {
    let config_contents = fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&config_contents)?)
}

/// Applies `--flag value` pairs on top of `config`. Bad values and unknown
/// flags are reported and skipped.
pub fn parse_env_args(mut config: Config, args: &[String]) -> Config {
    for arg_pair in args.chunks(2) {
        let flag = arg_pair[0].as_str();
        let value = match arg_pair.get(1) {
            Some(value) => value.as_str(),
            None => {
                warn!("{} is missing a value, skipping...", flag);
                continue
            },
        };
        match flag {
            "--floors" => {
                if let Some(num) = parse_number(flag, value) {
                    config.lift.num_floors = num;
                }
            },
            "--persons" => {
                if let Some(num) = parse_number(flag, value) {
                    config.lift.max_n_persons = num;
                }
            },
            "--passengers" => {
                if let Some(num) = parse_number(flag, value) {
                    config.lift.max_n_passengers = num;
                }
            },
            "--transit-ms" => {
                if let Some(ms) = parse_number(flag, value) {
                    config.timing.transit = Duration::from_millis(ms);
                }
            },
            "--think-ms" => {
                if let Some(ms) = parse_number(flag, value) {
                    config.timing.think = Duration::from_millis(ms);
                }
            },
            "--seed" => {
                if let Some(seed) = parse_number(flag, value) {
                    config.seed = Some(seed);
                }
            },
            "--mode" => {
                match Mode::parse(value) {
                    Some(mode) => config.mode = mode,
                    None => warn!("mode {} is not monitor or message, skipping...", value),
                }
            },
            _ => warn!("illegal argument {}, skipping...", flag),
        }
    }
    config
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Option<T> {
    match value.parse::<T>() {
        Ok(num) => Some(num),
        Err(_) => {
            warn!("{} {} is not a number, skipping...", flag, value);
            None
        },
    }
}
