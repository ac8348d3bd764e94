//! TLE catalog loading
//!
//! Accepts the usual text layouts: bare two-line pairs, or a name line followed
//! by the pair (three-line format). Blank lines are ignored and file order is
//! preserved, which is what makes the final result order deterministic.
//! Element lines are not parsed here; a malformed pair only fails its own
//! unit of work later on.

use crate::{OverpassError, Result};
use orbital_mechanics::ElementSet;
use std::fs;
use std::path::Path;
use tracing::info;

fn is_line1(line: &str) -> bool {
    line.starts_with("1 ")
}

fn is_line2(line: &str) -> bool {
    line.starts_with("2 ")
}

/// Load a catalog file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<ElementSet>> {
    let path = path.as_ref();
    info!("Loading TLE catalog from {:?}", path);

    let text = fs::read_to_string(path)?;
    let catalog = parse_catalog(&text)?;

    info!("Loaded {} element sets", catalog.len());
    Ok(catalog)
}

/// Group catalog text into element sets, in order of appearance
pub fn parse_catalog(text: &str) -> Result<Vec<ElementSet>> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end()))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let mut catalog = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (line_no, first) = lines[i];

        let (name, line1, line2, consumed) = if is_line1(first) {
            let (_, second) = lines.get(i + 1).copied().ok_or_else(|| dangling(line_no))?;
            (None, first, second, 2)
        } else {
            let (l1_no, line1) = lines.get(i + 1).copied().ok_or_else(|| dangling(line_no))?;
            let (_, line2) = lines.get(i + 2).copied().ok_or_else(|| dangling(l1_no))?;
            if !is_line1(line1) {
                return Err(OverpassError::Catalog {
                    line: l1_no,
                    reason: format!("expected TLE line 1 after name {:?}", first.trim()),
                });
            }
            (Some(first.trim().to_string()), line1, line2, 3)
        };

        if !is_line2(line2) {
            return Err(OverpassError::Catalog {
                line: lines[i + consumed - 1].0,
                reason: "expected TLE line 2".to_string(),
            });
        }

        let mut set = ElementSet::new(String::new(), line1, line2);
        set.name = name
            .or_else(|| set.norad_id().map(|id| id.to_string()))
            .unwrap_or_else(|| format!("sat-{}", catalog.len()));
        catalog.push(set);

        i += consumed;
    }

    Ok(catalog)
}

fn dangling(line: usize) -> OverpassError {
    OverpassError::Catalog {
        line,
        reason: "incomplete element set at end of catalog".to_string(),
    }
}
