//! Orbit propagation
//!
//! [`Propagator`] answers "where is this one satellite at this instant" in the
//! Earth-fixed frame. Failures come back as `Err` values and never panic, so a
//! caller sweeping thousands of instants can skip the bad ones and carry on.

use crate::elements::ElementSet;
use crate::transforms::{teme_to_ecef, EARTH_RADIUS_KM};
use crate::{time, OrbitalError, Result, StateVector};
use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use tracing::debug;

/// Position/velocity of a single satellite as a pure function of time.
pub trait Propagator {
    fn propagate(&self, time: DateTime<Utc>) -> Result<StateVector>;
}

/// Builds a [`Propagator`] from a catalog element set.
///
/// Shared across worker threads; each worker builds its own propagator.
pub trait PropagatorFactory: Sync {
    type Propagator: Propagator;

    fn build(&self, elements: &ElementSet) -> Result<Self::Propagator>;
}

/// SGP4/SDP4 via the `sgp4` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4;

impl PropagatorFactory for Sgp4 {
    type Propagator = Sgp4Propagator;

    fn build(&self, elements: &ElementSet) -> Result<Sgp4Propagator> {
        Sgp4Propagator::from_element_set(elements)
    }
}

pub struct Sgp4Propagator {
    constants: sgp4::Constants,
    epoch: DateTime<Utc>,
}

impl Sgp4Propagator {
    pub fn from_element_set(set: &ElementSet) -> Result<Self> {
        let elements = set.parse()?;

        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| OrbitalError::InvalidTle(format!("{}: {:?}", set.name, e)))?;

        let epoch = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);
        debug!("SGP4 initialized for {} (NORAD {}, epoch {})", set.name, elements.norad_id, epoch);

        Ok(Self { constants, epoch })
    }

    /// Element set epoch
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Raw SGP4 output in the TEME frame
    pub fn propagate_teme(&self, time: DateTime<Utc>) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let duration = time.signed_duration_since(self.epoch);
        let minutes_since_epoch = duration.num_milliseconds() as f64 / 60_000.0;

        let prediction = self
            .constants
            .propagate(minutes_since_epoch)
            .map_err(|e| OrbitalError::PropagationFailed(format!("{:?}", e)))?;

        let position = Vector3::from(prediction.position);
        let velocity = Vector3::from(prediction.velocity);

        if !(position.iter().all(|c| c.is_finite()) && velocity.iter().all(|c| c.is_finite())) {
            return Err(OrbitalError::PropagationFailed(format!(
                "non-finite state at {}",
                time
            )));
        }
        if position.norm() < EARTH_RADIUS_KM {
            return Err(OrbitalError::PropagationFailed(format!(
                "orbit decayed: radius {:.1} km at {}",
                position.norm(),
                time
            )));
        }

        Ok((position, velocity))
    }
}

impl Propagator for Sgp4Propagator {
    fn propagate(&self, time: DateTime<Utc>) -> Result<StateVector> {
        let (r_teme, v_teme) = self.propagate_teme(time)?;
        let (position, velocity) = teme_to_ecef(&r_teme, &v_teme, time::gmst(time));

        Ok(StateVector {
            position,
            velocity,
            epoch: time,
        })
    }
}
