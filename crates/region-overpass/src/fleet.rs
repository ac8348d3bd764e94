//! Fleet orchestration
//!
//! One unit of work per catalog satellite, dispatched to a fixed-size rayon
//! pool. Results are slotted by catalog index before they are concatenated,
//! so the merged [`ResultSet`] is satellite-major, time-minor and identical
//! for any pool size or completion order. The memory ceiling is checked on
//! that same ordered walk, so whether a run fits does not depend on the pool
//! either.

use crate::config::{MalformedPolicy, RunConfig};
use crate::region::Region;
use crate::scanner::{self, MatchRecord, ScanWindow};
use crate::{OverpassError, Result};
use orbital_mechanics::{ElementSet, FrameConverter, PropagatorFactory};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, info, warn};
use uuid::Uuid;

/// Matches for one satellite, in time order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteMatches {
    /// Position in the input catalog
    pub index: usize,
    pub name: String,
    pub matches: Vec<MatchRecord>,
}

/// A satellite left out of the run because its element set was unusable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSatellite {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Merged output of a fleet run.
///
/// Satellites with no matches contribute nothing to `satellites`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub satellites: Vec<SatelliteMatches>,
    pub skipped: Vec<SkippedSatellite>,
}

impl ResultSet {
    /// Every match in satellite-major, time-minor order
    pub fn records(&self) -> impl Iterator<Item = (&str, &MatchRecord)> + '_ {
        self.satellites
            .iter()
            .flat_map(|s| s.matches.iter().map(move |m| (s.name.as_str(), m)))
    }

    pub fn len(&self) -> usize {
        self.satellites.iter().map(|s| s.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A completed run: results plus the side-channel metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetReport {
    pub run_id: Uuid,
    pub results: ResultSet,
    /// Wall clock for dispatch + collect
    pub elapsed: Duration,
    pub satellites_scanned: usize,
    pub samples: u64,
    pub skipped_samples: u64,
}

/// How a single unit of work ended
#[derive(Debug)]
enum UnitOutcome {
    Completed {
        matches: Vec<MatchRecord>,
        samples: u64,
        skipped_samples: u64,
    },
    Malformed(String),
    Failed(String),
}

/// Fixed-size pool of OS worker threads scoped to one batch run.
///
/// Lifecycle is explicit: [`WorkerPool::initialize`] before dispatch,
/// [`WorkerPool::shutdown`] once results are collected.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
    memory_limit_bytes: Option<u64>,
}

impl WorkerPool {
    pub fn initialize(config: &RunConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_pool_size)
            .thread_name(|i| format!("overpass-worker-{}", i))
            .build()?;

        info!(
            "Worker pool up: {} workers, buffer ceiling {}",
            config.worker_pool_size,
            config
                .memory_limit_bytes
                .map(|b| format!("{} bytes", b))
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(Self {
            pool,
            workers: config.worker_pool_size,
            memory_limit_bytes: config.memory_limit_bytes,
        })
    }

    /// Scan every satellite in `catalog` and merge the results.
    ///
    /// Blocks until every unit has finished. A crashed unit, or a result set
    /// larger than the memory ceiling, fails the whole run; malformed element
    /// sets follow `policy`.
    pub fn run<F, C>(
        &self,
        catalog: Vec<ElementSet>,
        region: &Region,
        window: ScanWindow,
        factory: &F,
        converter: &C,
        policy: MalformedPolicy,
    ) -> Result<FleetReport>
    where
        F: PropagatorFactory,
        C: FrameConverter,
    {
        let run_id = Uuid::new_v4();
        let total = catalog.len();

        info!(
            "Run {}: {} satellites, {} s from {} over {}",
            run_id, total, window.horizon_seconds, window.start, region
        );

        let started = Instant::now();

        let outcomes: Vec<(usize, String, UnitOutcome)> = self.pool.install(|| {
            catalog
                .into_par_iter()
                .enumerate()
                .map(|(index, elements)| {
                    let outcome = run_unit(index, &elements, region, &window, factory, converter);
                    (index, elements.name, outcome)
                })
                .collect()
        });

        let merged = merge(total, outcomes, policy, self.memory_limit_bytes);
        let elapsed = started.elapsed();

        let (results, samples, skipped_samples) = merged?;
        let satellites_scanned = total - results.skipped.len();

        info!(
            "Run {} finished in {:.3}s: {} matches from {} satellites ({} skipped)",
            run_id,
            elapsed.as_secs_f64(),
            results.len(),
            satellites_scanned,
            results.skipped.len()
        );

        Ok(FleetReport {
            run_id,
            results,
            elapsed,
            satellites_scanned,
            samples,
            skipped_samples,
        })
    }

    pub fn shutdown(self) {
        // Dropping the rayon pool joins its threads once they go idle
        drop(self.pool);
        info!("Worker pool shut down ({} workers)", self.workers);
    }
}

fn run_unit<F, C>(
    index: usize,
    elements: &ElementSet,
    region: &Region,
    window: &ScanWindow,
    factory: &F,
    converter: &C,
) -> UnitOutcome
where
    F: PropagatorFactory,
    C: FrameConverter,
{
    let span = debug_span!("scan", index, name = %elements.name);
    let _enter = span.enter();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let propagator = match factory.build(elements) {
            Ok(p) => p,
            Err(e) => return UnitOutcome::Malformed(e.to_string()),
        };

        let outcome = scanner::scan(&propagator, converter, window, region);
        UnitOutcome::Completed {
            matches: outcome.matches,
            samples: outcome.samples,
            skipped_samples: outcome.skipped_samples,
        }
    }));

    let outcome = result.unwrap_or_else(|payload| UnitOutcome::Failed(panic_message(payload)));

    match &outcome {
        UnitOutcome::Completed {
            matches,
            skipped_samples,
            ..
        } => debug!("{} matches, {} samples skipped", matches.len(), skipped_samples),
        UnitOutcome::Malformed(reason) => debug!("malformed element set: {}", reason),
        UnitOutcome::Failed(reason) => debug!("worker failed: {}", reason),
    }

    outcome
}

/// Fan-in: place each outcome at its catalog index, then concatenate.
///
/// The running size of the merged matches is held against `limit_bytes` in
/// catalog order.
fn merge(
    total: usize,
    outcomes: Vec<(usize, String, UnitOutcome)>,
    policy: MalformedPolicy,
    limit_bytes: Option<u64>,
) -> Result<(ResultSet, u64, u64)> {
    let mut slots: Vec<Option<(String, UnitOutcome)>> = (0..total).map(|_| None).collect();
    for (index, name, outcome) in outcomes {
        slots[index] = Some((name, outcome));
    }

    let mut results = ResultSet::default();
    let mut samples = 0u64;
    let mut skipped_samples = 0u64;
    let mut buffered_bytes = 0u64;
    let record_bytes = std::mem::size_of::<MatchRecord>() as u64;

    for (index, slot) in slots.into_iter().enumerate() {
        let (name, outcome) = slot.ok_or_else(|| OverpassError::WorkerFailure {
            index,
            name: String::new(),
            reason: "no result returned".to_string(),
        })?;

        match outcome {
            UnitOutcome::Completed {
                matches,
                samples: s,
                skipped_samples: k,
            } => {
                samples += s;
                skipped_samples += k;

                buffered_bytes += matches.len() as u64 * record_bytes;
                if let Some(limit) = limit_bytes {
                    if buffered_bytes > limit {
                        return Err(OverpassError::BufferLimitExceeded {
                            index,
                            buffered_bytes,
                            limit_bytes: limit,
                        });
                    }
                }

                if !matches.is_empty() {
                    results.satellites.push(SatelliteMatches {
                        index,
                        name,
                        matches,
                    });
                }
            }
            UnitOutcome::Malformed(reason) => match policy {
                MalformedPolicy::Skip => {
                    warn!("Skipping satellite #{} ({}): {}", index, name, reason);
                    results.skipped.push(SkippedSatellite {
                        index,
                        name,
                        reason,
                    });
                }
                MalformedPolicy::Abort => {
                    return Err(OverpassError::MalformedElementSet {
                        index,
                        name,
                        reason,
                    })
                }
            },
            UnitOutcome::Failed(reason) => {
                return Err(OverpassError::WorkerFailure {
                    index,
                    name,
                    reason,
                })
            }
        }
    }

    Ok((results, samples, skipped_samples))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
