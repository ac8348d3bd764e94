//! Geographic region and the containment predicate
//!
//! A region is supplied as four (latitude, longitude) corners but is tested as
//! the axis-aligned box spanned by their extremes. Corner order and polygon
//! shape are deliberately discarded: any quadrilateral reduces to its
//! bounding box, and the box does not wrap across the antimeridian.

use crate::{OverpassError, Result, REGION_CORNERS};
use orbital_mechanics::GeodeticPosition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub latitude: f64,
    pub longitude: f64,
}

impl Corner {
    /// Any finite pair is accepted. Values beyond the usual geographic ranges
    /// simply widen the bounding box.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(latitude.is_finite() && longitude.is_finite()) {
            return Err(OverpassError::InvalidCorner(format!(
                "({}, {}) is not a finite coordinate",
                latitude, longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// `"lat,lon"`
impl FromStr for Corner {
    type Err = OverpassError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| OverpassError::InvalidCorner(format!("expected LAT,LON, got {:?}", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| OverpassError::InvalidCorner(format!("{:?}: {}", v.trim(), e)))
        };
        Corner::new(parse(lat)?, parse(lon)?)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Inclusive longitude/latitude bounds in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn from_corners(corners: &[Corner]) -> Self {
        corners.iter().fold(
            BoundingBox {
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
            },
            |b, c| BoundingBox {
                min_lon: b.min_lon.min(c.longitude),
                max_lon: b.max_lon.max(c.longitude),
                min_lat: b.min_lat.min(c.latitude),
                max_lat: b.max_lat.max(c.latitude),
            },
        )
    }

    /// Boundary inclusive on all four edges
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        self.min_lon <= longitude
            && longitude <= self.max_lon
            && self.min_lat <= latitude
            && latitude <= self.max_lat
    }
}

/// Exactly four corners, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Corner>", into = "Vec<Corner>")]
pub struct Region {
    corners: [Corner; REGION_CORNERS],
    bounds: BoundingBox,
}

impl Region {
    /// Build from `(latitude, longitude)` pairs.
    pub fn new(corners: &[(f64, f64)]) -> Result<Self> {
        let corners = corners
            .iter()
            .map(|&(lat, lon)| Corner::new(lat, lon))
            .collect::<Result<Vec<_>>>()?;
        Self::from_corners(corners)
    }

    pub fn from_corners(corners: Vec<Corner>) -> Result<Self> {
        let count = corners.len();
        let corners: [Corner; REGION_CORNERS] =
            corners
                .try_into()
                .map_err(|_| OverpassError::RegionMalformed {
                    expected: REGION_CORNERS,
                    corners: count,
                })?;

        for c in &corners {
            Corner::new(c.latitude, c.longitude)?;
        }

        Ok(Self {
            bounds: BoundingBox::from_corners(&corners),
            corners,
        })
    }

    pub fn corners(&self) -> &[Corner; REGION_CORNERS] {
        &self.corners
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn contains(&self, point: &GeodeticPosition) -> bool {
        self.bounds.contains(point.longitude, point.latitude)
    }
}

impl TryFrom<Vec<Corner>> for Region {
    type Error = OverpassError;

    fn try_from(corners: Vec<Corner>) -> Result<Self> {
        Region::from_corners(corners)
    }
}

impl From<Region> for Vec<Corner> {
    fn from(region: Region) -> Self {
        region.corners.to_vec()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bounds;
        write!(
            f,
            "lat [{}, {}] x lon [{}, {}]",
            b.min_lat, b.max_lat, b.min_lon, b.max_lon
        )
    }
}

/// Containment predicate: inside the region's bounding box, edges included.
pub fn contains(point: &GeodeticPosition, region: &Region) -> bool {
    region.contains(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(latitude: f64, longitude: f64) -> GeodeticPosition {
        GeodeticPosition {
            latitude,
            longitude,
            altitude_km: 500.0,
        }
    }

    fn ten_degree_box() -> Region {
        Region::new(&[(10.0, 10.0), (10.0, 20.0), (20.0, 20.0), (20.0, 10.0)]).unwrap()
    }

    #[test]
    fn test_interior_and_exterior() {
        let region = ten_degree_box();
        assert!(contains(&point(15.0, 15.0), &region));
        assert!(!contains(&point(25.0, 15.0), &region));
        assert!(!contains(&point(15.0, 9.999), &region));
    }

    #[test]
    fn test_boundary_inclusive() {
        let region = ten_degree_box();
        assert!(contains(&point(10.0, 15.0), &region));
        assert!(contains(&point(20.0, 15.0), &region));
        assert!(contains(&point(15.0, 10.0), &region));
        assert!(contains(&point(15.0, 20.0), &region));
        assert!(contains(&point(10.0, 10.0), &region));
        assert!(contains(&point(20.0, 20.0), &region));
    }

    #[test]
    fn test_non_rectangular_reduces_to_bounding_box() {
        // Kite: (0,5) (5,10) (10,5) (5,0). The point (1,1) is outside the kite
        // but inside its bounding box, so it counts as contained.
        let kite = Region::new(&[(0.0, 5.0), (5.0, 10.0), (10.0, 5.0), (5.0, 0.0)]).unwrap();
        assert!(contains(&point(1.0, 1.0), &kite));
        assert_eq!(
            kite.bounds(),
            BoundingBox {
                min_lon: 0.0,
                max_lon: 10.0,
                min_lat: 0.0,
                max_lat: 10.0
            }
        );
    }

    #[test]
    fn test_corner_order_irrelevant() {
        let a = Region::new(&[(10.0, 10.0), (10.0, 20.0), (20.0, 20.0), (20.0, 10.0)]).unwrap();
        let b = Region::new(&[(20.0, 20.0), (10.0, 10.0), (20.0, 10.0), (10.0, 20.0)]).unwrap();
        assert_eq!(a.bounds(), b.bounds());
    }

    #[test]
    fn test_wrong_corner_count() {
        let three = Region::new(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(matches!(
            three,
            Err(OverpassError::RegionMalformed { expected: 4, corners: 3 })
        ));
        let five = Region::new(&[(0.0, 0.0); 5]);
        assert!(matches!(five, Err(OverpassError::RegionMalformed { corners: 5, .. })));
    }

    #[test]
    fn test_corner_requires_finite_values() {
        assert!(Corner::new(f64::NAN, 0.0).is_err());
        assert!(Corner::new(0.0, f64::INFINITY).is_err());
        assert!(Corner::new(-90.0, 180.0).is_ok());
        assert!(Corner::new(91.0, -180.5).is_ok());
    }

    #[test]
    fn test_region_past_antimeridian_keeps_in_range_part() {
        // Longitudes 170..190: the box is taken as given, so the 170..180
        // stretch matches and nothing wraps to -180..-170.
        let region =
            Region::new(&[(10.0, 170.0), (10.0, 190.0), (20.0, 190.0), (20.0, 170.0)]).unwrap();
        assert_eq!(region.bounds().max_lon, 190.0);
        assert!(contains(&point(15.0, 175.0), &region));
        assert!(contains(&point(15.0, 180.0), &region));
        assert!(!contains(&point(15.0, -175.0), &region));
    }

    #[test]
    fn test_corner_from_str() {
        let c: Corner = " 12.5 , -70.25".parse().unwrap();
        assert_eq!(c, Corner::new(12.5, -70.25).unwrap());
        assert!("12.5".parse::<Corner>().is_err());
        assert!("north,east".parse::<Corner>().is_err());
    }

    #[test]
    fn test_serde_validates_corner_count() {
        let json = r#"[{"latitude":0,"longitude":0},{"latitude":1,"longitude":1}]"#;
        assert!(serde_json::from_str::<Region>(json).is_err());

        let region = ten_degree_box();
        let encoded = serde_json::to_string(&region).unwrap();
        let decoded: Region = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, region);
    }

    proptest! {
        #[test]
        fn prop_contains_matches_min_max(
            lats in prop::array::uniform4(-90.0f64..=90.0),
            lons in prop::array::uniform4(-180.0f64..=180.0),
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
        ) {
            let pairs: Vec<(f64, f64)> = lats.iter().copied().zip(lons.iter().copied()).collect();
            let region = Region::new(&pairs).unwrap();

            let min_lat = lats.iter().copied().fold(f64::INFINITY, f64::min);
            let max_lat = lats.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min_lon = lons.iter().copied().fold(f64::INFINITY, f64::min);
            let max_lon = lons.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let expected = min_lon <= lon && lon <= max_lon && min_lat <= lat && lat <= max_lat;

            prop_assert_eq!(contains(&point(lat, lon), &region), expected);
        }
    }
}
