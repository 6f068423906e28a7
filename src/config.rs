//! Runtime configuration read from the environment (and `.env`).

use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "data_demo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub difficulty: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `DATA_DIR` and `DIFFICULTY` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing or unparseable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port);
        let data_dir = lookup("DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let mut difficulty = parse_or(&lookup, "DIFFICULTY", defaults.difficulty);
        if difficulty > DIFF_MAX {
            warn!(
                "DIFFICULTY={} is too high for dev mode, capping at {}",
                difficulty, DIFF_MAX
            );
            difficulty = DIFF_MAX;
        }

        Self {
            host,
            port,
            data_dir,
            difficulty,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("invalid {}={:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
