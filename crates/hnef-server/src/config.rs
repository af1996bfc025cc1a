//! Configuration for the Hnefatafl TCP server.
//!
//! Defaults can be overridden via environment variables (and then by
//! command-line flags in `main`):
//!
//! - `HNEF_BIND_ADDR`      (default: "127.0.0.1")
//! - `HNEF_PORT`           (default: "10000", 1024..=49151)
//! - `HNEF_MAX_CLIENTS`    (default: "10", 2..=20)
//! - `HNEF_MAX_ROOMS`      (default: "5", 1..=10)
//! - `HNEF_PING_PERIOD_MS` (default: "5000")
//! - `HNEF_DECAY_BUDGET`   (default: "24")

use std::env;
use std::fmt::Display;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: Ipv4Addr = Ipv4Addr::LOCALHOST;
pub const DEFAULT_PORT: u16 = 10_000;
pub const DEFAULT_MAX_CLIENTS: usize = 10;
pub const DEFAULT_MAX_ROOMS: usize = 5;
pub const DEFAULT_PING_PERIOD_MS: u64 = 5_000;
pub const DEFAULT_DECAY_BUDGET: u32 = 24;

pub const PORT_RANGE: RangeInclusive<u16> = 1024..=49151;
pub const MAX_CLIENTS_RANGE: RangeInclusive<usize> = 2..=20;
pub const MAX_ROOMS_RANGE: RangeInclusive<usize> = 1..=10;

/// Why a configuration value was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key}: {value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// IPv4 interface to bind to.
    pub bind_addr: Ipv4Addr,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of client records (connected or awaiting reconnection).
    pub max_clients: usize,

    /// Maximum number of game rooms running at once.
    pub max_rooms: usize,

    /// Interval between liveness sweeps.
    pub ping_period: Duration,

    /// Sweeps a disconnected client is kept around for reconnection.
    pub decay_budget: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_rooms: DEFAULT_MAX_ROOMS,
            ping_period: Duration::from_millis(DEFAULT_PING_PERIOD_MS),
            decay_budget: DEFAULT_DECAY_BUDGET,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| lookup(key);

        let config = Config {
            bind_addr: parse_or("HNEF_BIND_ADDR", read("HNEF_BIND_ADDR"), DEFAULT_BIND_ADDR)?,
            port: parse_or("HNEF_PORT", read("HNEF_PORT"), DEFAULT_PORT)?,
            max_clients: parse_or("HNEF_MAX_CLIENTS", read("HNEF_MAX_CLIENTS"), DEFAULT_MAX_CLIENTS)?,
            max_rooms: parse_or("HNEF_MAX_ROOMS", read("HNEF_MAX_ROOMS"), DEFAULT_MAX_ROOMS)?,
            ping_period: Duration::from_millis(parse_or(
                "HNEF_PING_PERIOD_MS",
                read("HNEF_PING_PERIOD_MS"),
                DEFAULT_PING_PERIOD_MS,
            )?),
            decay_budget: parse_or("HNEF_DECAY_BUDGET", read("HNEF_DECAY_BUDGET"), DEFAULT_DECAY_BUDGET)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("port", self.port, PORT_RANGE)?;
        check_range("max_clients", self.max_clients, MAX_CLIENTS_RANGE)?;
        check_range("max_rooms", self.max_rooms, MAX_ROOMS_RANGE)?;
        check_range("ping_period_ms", self.ping_period.as_millis(), 1..=u128::from(u64::MAX))?;
        check_range("decay_budget", self.decay_budget, 1..=u32::MAX)?;
        Ok(())
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn check_range<T>(key: &'static str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }
}
