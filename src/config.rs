//! Server Configuration
//!
//! Command-line flags with environment fallbacks. Dataset bounds and fan-out are
//! validated once at startup; nothing else reads the environment afterwards.

use crate::company::dataset::{DatasetBounds, DatasetError};

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// In-process store; contents are lost on exit.
    Memory,
    Redis,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid dataset bounds: {0}")]
    Dataset(#[from] DatasetError),

    #[error("fan-out must be at least 1")]
    ZeroFanOut,

    #[error("bridge timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "company_store", about = "Company dataset HTTP service")]
pub struct Settings {
    /// Address the HTTP server listens on.
    #[arg(long, env = "COMPANY_BIND", default_value = "127.0.0.1:8280")]
    pub bind: SocketAddr,

    #[arg(long, env = "COMPANY_STORE", value_enum, default_value_t = StoreBackend::Memory)]
    pub store: StoreBackend,

    /// Only used with `--store redis`.
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Per-phase limit for the bootstrap bridges. Unset waits indefinitely.
    #[arg(long, env = "COMPANY_BRIDGE_TIMEOUT_MS")]
    pub bridge_timeout_ms: Option<u64>,

    #[arg(long, default_value_t = 1)]
    pub department_from: u32,

    #[arg(long, default_value_t = 2)]
    pub department_to: u32,

    #[arg(long, default_value_t = 1)]
    pub employee_from: u32,

    #[arg(long, default_value_t = 2)]
    pub employee_to: u32,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub team_id_from: i32,

    #[arg(long, default_value_t = 5)]
    pub team_count: u32,

    /// Maximum concurrent store calls when fanning out.
    #[arg(long, default_value_t = 8)]
    pub fan_out: usize,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dataset_bounds()?;
        if self.fan_out == 0 {
            return Err(ConfigError::ZeroFanOut);
        }
        if self.bridge_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn dataset_bounds(&self) -> Result<DatasetBounds, ConfigError> {
        let bounds = DatasetBounds {
            department_from: self.department_from,
            department_to: self.department_to,
            employee_from: self.employee_from,
            employee_to: self.employee_to,
            team_id_from: self.team_id_from,
            team_count: self.team_count,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn bridge_timeout(&self) -> Option<Duration> {
        self.bridge_timeout_ms.map(Duration::from_millis)
    }
}
