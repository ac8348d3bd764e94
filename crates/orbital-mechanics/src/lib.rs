//! Orbital Mechanics Library
//!
//! SGP4 propagation, TEME to Earth-fixed rotation and WGS84 geodetic
//! conversion for catalog satellites described by two-line element sets.
//!
//! Both numerical stages sit behind narrow traits so the scanning code never
//! depends on a particular propagator or datum implementation:
//!
//! - [`propagation::Propagator`] / [`propagation::PropagatorFactory`]
//! - [`transforms::FrameConverter`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod elements;
pub mod propagation;
pub mod time;
pub mod transforms;

pub use elements::ElementSet;
pub use nalgebra::Vector3;
pub use propagation::{Propagator, PropagatorFactory, Sgp4, Sgp4Propagator};
pub use transforms::{FrameConverter, Wgs84};

#[derive(Error, Debug)]
pub enum OrbitalError {
    #[error("Invalid TLE format: {0}")]
    InvalidTle(String),
    #[error("Propagation failed: {0}")]
    PropagationFailed(String),
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

/// Position (km) and velocity (km/s) in the Earth-fixed frame at `epoch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub epoch: DateTime<Utc>,
}

/// Geodetic coordinates relative to the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeodeticPosition {
    /// Degrees, positive north
    pub latitude: f64,
    /// Degrees in (-180, 180], positive east
    pub longitude: f64,
    pub altitude_km: f64,
}
