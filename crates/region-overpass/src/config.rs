//! Run configuration
//!
//! Defaults describe the standard batch job (5 days from 2023-11-01 at 1 s,
//! 1 GiB match buffer). A JSON file can override any field; the CLI overrides
//! the file.

use crate::region::Region;
use crate::scanner::ScanWindow;
use crate::{OverpassError, Result, DEFAULT_HORIZON_SECONDS, DEFAULT_MEMORY_LIMIT_BYTES};
use chrono::{DateTime, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// What to do with a satellite whose element set cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Leave the satellite out and list it in `ResultSet::skipped`
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub start_epoch: DateTime<Utc>,
    pub horizon_seconds: u32,
    pub worker_pool_size: usize,
    /// Ceiling on match records held for the whole run, in bytes
    pub memory_limit_bytes: Option<u64>,
    pub malformed_policy: MalformedPolicy,
    pub region: Option<Region>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_epoch: default_start_epoch(),
            horizon_seconds: DEFAULT_HORIZON_SECONDS,
            worker_pool_size: num_cpus(),
            memory_limit_bytes: Some(DEFAULT_MEMORY_LIMIT_BYTES),
            malformed_policy: MalformedPolicy::Skip,
            region: None,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading run configuration from {:?}", path);

        let file = File::open(path)?;
        let config: RunConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn start_epoch(mut self, start: DateTime<Utc>) -> Self {
        self.start_epoch = start;
        self
    }

    pub fn horizon_seconds(mut self, seconds: u32) -> Self {
        self.horizon_seconds = seconds;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.worker_pool_size = n;
        self
    }

    pub fn memory_limit_bytes(mut self, limit: Option<u64>) -> Self {
        self.memory_limit_bytes = limit;
        self
    }

    pub fn malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn window(&self) -> ScanWindow {
        ScanWindow::new(self.start_epoch, self.horizon_seconds)
    }

    /// Checks that must pass before any work is dispatched.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_seconds == 0 {
            return Err(OverpassError::Config("horizon_seconds must be positive".into()));
        }
        if self.worker_pool_size == 0 {
            return Err(OverpassError::Config("worker_pool_size must be positive".into()));
        }
        if self.memory_limit_bytes == Some(0) {
            return Err(OverpassError::Config("memory_limit_bytes must be positive".into()));
        }
        let span = chrono::Duration::seconds(i64::from(self.horizon_seconds));
        if self.start_epoch.checked_add_signed(span).is_none() {
            return Err(OverpassError::Config("horizon overflows the calendar".into()));
        }
        Ok(())
    }
}

fn default_start_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}
