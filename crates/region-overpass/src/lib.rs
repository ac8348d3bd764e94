//! Region Overpass Scanner
//!
//! Finds every second, over a multi-day horizon, at which a catalog satellite's
//! ground track lies inside a geographic bounding region.
//!
//! # Pipeline
//!
//! ```text
//! catalog ──► WorkerPool fan-out ──► scan (per satellite, per second)
//!                                      propagate ─► to_geodetic ─► contains
//!                                          │
//! ResultSet ◄── index-ordered fan-in ◄─────┘
//! ```
//!
//! Each satellite is one unit of work. Units share only read-only data (the
//! region, the propagator factory, the frame converter), so the pool needs no
//! locking, and results are merged by catalog index, never by completion order.

use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod fleet;
pub mod output;
pub mod prompt;
pub mod region;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{MalformedPolicy, RunConfig};
pub use fleet::{FleetReport, ResultSet, SatelliteMatches, SkippedSatellite, WorkerPool};
pub use region::{BoundingBox, Corner, Region};
pub use scanner::{MatchRecord, ScanWindow};

/// Corners required to describe a region
pub const REGION_CORNERS: usize = 4;

/// 5 days at one-second resolution
pub const DEFAULT_HORIZON_SECONDS: u32 = 5 * 24 * 3600;

/// 1 GiB default ceiling on buffered match records
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 1_073_741_824;

#[derive(Error, Debug)]
pub enum OverpassError {
    #[error("Region must have exactly {expected} corners, got {corners}")]
    RegionMalformed { expected: usize, corners: usize },
    #[error("Invalid corner: {0}")]
    InvalidCorner(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Catalog error at line {line}: {reason}")]
    Catalog { line: usize, reason: String },
    #[error("Malformed element set #{index} ({name}): {reason}")]
    MalformedElementSet {
        index: usize,
        name: String,
        reason: String,
    },
    #[error("Worker failed on satellite #{index} ({name}): {reason}")]
    WorkerFailure {
        index: usize,
        name: String,
        reason: String,
    },
    #[error("Match buffer reached {buffered_bytes} bytes at satellite #{index}, limit is {limit_bytes}")]
    BufferLimitExceeded {
        index: usize,
        buffered_bytes: u64,
        limit_bytes: u64,
    },
    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OverpassError>;
