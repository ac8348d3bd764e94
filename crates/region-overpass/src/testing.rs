//! Scripted propagators for exercising the scan pipeline without SGP4

use crate::region::Region;
use chrono::{DateTime, TimeZone, Utc};
use orbital_mechanics::transforms::geodetic_to_ecef;
use orbital_mechanics::{
    ElementSet, GeodeticPosition, OrbitalError, Propagator, PropagatorFactory, StateVector,
    Vector3,
};
use std::collections::{HashMap, HashSet};
use std::time::Duration as StdDuration;

pub const INSIDE: (f64, f64) = (15.0, 15.0);
pub const OUTSIDE: (f64, f64) = (50.0, -100.0);

pub fn run_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap()
}

pub fn ten_degree_box() -> Region {
    Region::new(&[(10.0, 10.0), (10.0, 20.0), (20.0, 20.0), (20.0, 10.0)]).unwrap()
}

pub fn element_set(name: &str) -> ElementSet {
    ElementSet::new(name, "1 scripted", "2 scripted")
}

pub fn malformed(name: &str) -> ElementSet {
    ElementSet::new(name, "bad", "bad")
}

#[derive(Debug, Clone, Copy)]
enum Sample {
    At(f64, f64),
    Fail,
}

/// Ground track given second by second: a default (lat, lon) plus overrides.
#[derive(Debug, Clone)]
pub struct Track {
    start: DateTime<Utc>,
    default: Sample,
    overrides: HashMap<u32, Sample>,
}

impl Track {
    pub fn outside(start: DateTime<Utc>) -> Self {
        Self {
            start,
            default: Sample::At(OUTSIDE.0, OUTSIDE.1),
            overrides: HashMap::new(),
        }
    }

    pub fn inside(start: DateTime<Utc>) -> Self {
        Self {
            start,
            default: Sample::At(INSIDE.0, INSIDE.1),
            overrides: HashMap::new(),
        }
    }

    pub fn inside_at(mut self, second: u32) -> Self {
        self.overrides.insert(second, Sample::At(INSIDE.0, INSIDE.1));
        self
    }

    pub fn failing_at(mut self, second: u32) -> Self {
        self.overrides.insert(second, Sample::Fail);
        self
    }
}

impl Propagator for Track {
    fn propagate(&self, time: DateTime<Utc>) -> orbital_mechanics::Result<StateVector> {
        let offset = (time - self.start).num_seconds() as u32;
        match self.overrides.get(&offset).copied().unwrap_or(self.default) {
            Sample::Fail => Err(OrbitalError::PropagationFailed(format!(
                "scripted failure at +{}s",
                offset
            ))),
            Sample::At(latitude, longitude) => {
                let position = geodetic_to_ecef(&GeodeticPosition {
                    latitude,
                    longitude,
                    altitude_km: 500.0,
                })?;
                Ok(StateVector {
                    position,
                    velocity: Vector3::zeros(),
                    epoch: time,
                })
            }
        }
    }
}

/// Hands out [`Track`]s by element set name.
///
/// Element sets whose first line is `"bad"` fail to build, names in `panics`
/// blow up the worker, and names in `delays` sleep before building so tests
/// can force a completion order.
#[derive(Debug, Default)]
pub struct ScriptedFactory {
    tracks: HashMap<String, Track>,
    delays: HashMap<String, StdDuration>,
    panics: HashSet<String>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(mut self, name: &str, track: Track) -> Self {
        self.tracks.insert(name.to_string(), track);
        self
    }

    pub fn delay(mut self, name: &str, delay: StdDuration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, name: &str) -> Self {
        self.panics.insert(name.to_string());
        self
    }
}

impl PropagatorFactory for ScriptedFactory {
    type Propagator = Track;

    fn build(&self, elements: &ElementSet) -> orbital_mechanics::Result<Track> {
        if elements.tle_line1 == "bad" {
            return Err(OrbitalError::InvalidTle(format!(
                "{}: checksum mismatch",
                elements.name
            )));
        }
        if self.panics.contains(&elements.name) {
            panic!("worker crashed on {}", elements.name);
        }
        if let Some(delay) = self.delays.get(&elements.name) {
            std::thread::sleep(*delay);
        }
        self.tracks
            .get(&elements.name)
            .cloned()
            .ok_or_else(|| OrbitalError::InvalidTle(format!("no track for {}", elements.name)))
    }
}
