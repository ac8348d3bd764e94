//! Per-satellite scan
//!
//! Walks one satellite across the horizon one second at a time:
//! propagate, convert to geodetic, test against the region, keep the hits.

use crate::region::Region;
use chrono::{DateTime, Duration, Utc};
use orbital_mechanics::{FrameConverter, GeodeticPosition, Propagator};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A sample that fell inside the region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub timestamp: DateTime<Utc>,
    pub position: GeodeticPosition,
}

/// Sampled instants `start + j` seconds for `j` in `[0, horizon_seconds)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub start: DateTime<Utc>,
    pub horizon_seconds: u32,
}

impl ScanWindow {
    pub fn new(start: DateTime<Utc>, horizon_seconds: u32) -> Self {
        Self {
            start,
            horizon_seconds,
        }
    }

    pub fn instant(&self, offset_seconds: u32) -> DateTime<Utc> {
        self.start + Duration::seconds(i64::from(offset_seconds))
    }

    pub fn instants(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.horizon_seconds).map(move |j| self.instant(j))
    }
}

/// Matches for one satellite, with sample counters for the run log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub matches: Vec<MatchRecord>,
    pub samples: u64,
    /// Seconds skipped because propagation or conversion failed
    pub skipped_samples: u64,
}

/// Scan one satellite over the whole window.
///
/// Failed samples are skipped. Matches come out in strictly increasing
/// timestamp order.
pub fn scan<P, C>(
    propagator: &P,
    converter: &C,
    window: &ScanWindow,
    region: &Region,
) -> ScanOutcome
where
    P: Propagator + ?Sized,
    C: FrameConverter + ?Sized,
{
    let mut outcome = ScanOutcome::default();

    for timestamp in window.instants() {
        outcome.samples += 1;

        let state = match propagator.propagate(timestamp) {
            Ok(state) => state,
            Err(e) => {
                trace!("{}: {}", timestamp, e);
                outcome.skipped_samples += 1;
                continue;
            }
        };

        let position = match converter.to_geodetic(&state.position) {
            Ok(position) => position,
            Err(e) => {
                trace!("{}: {}", timestamp, e);
                outcome.skipped_samples += 1;
                continue;
            }
        };

        if !region.contains(&position) {
            continue;
        }

        outcome.matches.push(MatchRecord {
            timestamp,
            position,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_epoch, ten_degree_box, Track};
    use orbital_mechanics::Wgs84;

    #[test]
    fn test_window_instants() {
        let window = ScanWindow::new(run_epoch(), 3);
        let instants: Vec<_> = window.instants().collect();
        assert_eq!(instants.len(), 3);
        assert_eq!(instants[0], run_epoch());
        assert_eq!(instants[2], run_epoch() + Duration::seconds(2));
        assert_eq!(ScanWindow::new(run_epoch(), 0).instants().count(), 0);
    }

    #[test]
    fn test_single_pass() {
        let track = Track::outside(run_epoch()).inside_at(4);
        let window = ScanWindow::new(run_epoch(), 10);

        let outcome = scan(&track, &Wgs84, &window, &ten_degree_box());

        assert_eq!(outcome.samples, 10);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].timestamp, run_epoch() + Duration::seconds(4));
        assert!((outcome.matches[0].position.latitude - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_never_enters() {
        let track = Track::outside(run_epoch());
        let window = ScanWindow::new(run_epoch(), 60);
        let outcome = scan(&track, &Wgs84, &window, &ten_degree_box());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.skipped_samples, 0);
    }

    #[test]
    fn test_propagation_failure_skips_second() {
        let track = Track::inside(run_epoch()).failing_at(2).failing_at(3);
        let window = ScanWindow::new(run_epoch(), 6);

        let outcome = scan(&track, &Wgs84, &window, &ten_degree_box());

        let offsets: Vec<i64> = outcome
            .matches
            .iter()
            .map(|m| (m.timestamp - run_epoch()).num_seconds())
            .collect();
        assert_eq!(offsets, vec![0, 1, 4, 5]);
        assert_eq!(outcome.skipped_samples, 2);
    }

    #[test]
    fn test_matches_strictly_increasing() {
        let track = Track::inside(run_epoch());
        let window = ScanWindow::new(run_epoch(), 100);
        let outcome = scan(&track, &Wgs84, &window, &ten_degree_box());
        assert_eq!(outcome.matches.len(), 100);
        assert!(outcome
            .matches
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }
}
