//! Interactive region entry

use crate::region::{Corner, Region};
use crate::{OverpassError, Result, REGION_CORNERS};
use std::io::{self, BufRead, Write};

/// Validate latitude is in valid range
fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

/// Validate longitude is in valid range
fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon)
}

/// Ask for the four region corners, latitude then longitude for each point.
///
/// Unparseable answers and values outside the geographic ranges are asked
/// again; end of input is an error.
pub fn prompt_region<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Region> {
    let mut corners = Vec::with_capacity(REGION_CORNERS);

    for i in 1..=REGION_CORNERS {
        loop {
            let latitude = ask(input, output, &format!("Enter Latitude for Point {}: ", i))?;
            let longitude = ask(input, output, &format!("Enter Longitude for Point {}: ", i))?;

            if !is_valid_latitude(latitude) {
                writeln!(output, "latitude {} outside [-90, 90]", latitude)?;
                continue;
            }
            if !is_valid_longitude(longitude) {
                writeln!(output, "longitude {} outside [-180, 180]", longitude)?;
                continue;
            }
            corners.push(Corner::new(latitude, longitude)?);
            break;
        }
    }

    Region::from_corners(corners)
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<f64> {
    let mut line = String::new();
    loop {
        write!(output, "{}", question)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(OverpassError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before all region corners were entered",
            )));
        }

        match line.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(value),
            _ => writeln!(output, "Not a number: {:?}", line.trim())?,
        }
    }
}
