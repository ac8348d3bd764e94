//! Coordinate frame transforms
//!
//! TEME (SGP4 output frame) to Earth-fixed rotation, and conversions between
//! Earth-fixed Cartesian coordinates and WGS84 geodetic coordinates. All
//! linear quantities are kilometers.

use crate::{GeodeticPosition, OrbitalError, Result};
use nalgebra::{Rotation3, Vector3};

pub const EARTH_RADIUS_KM: f64 = 6378.137;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257223563;
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292115146706979e-5;

/// First eccentricity squared of the WGS84 ellipsoid
pub const EARTH_ECCENTRICITY_SQ: f64 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Earth-fixed Cartesian position to geodetic coordinates.
///
/// Implementations must be pure and thread safe: one converter instance is
/// shared read-only by every scan in a run.
pub trait FrameConverter: Send + Sync {
    fn to_geodetic(&self, position: &Vector3<f64>) -> Result<GeodeticPosition>;
}

/// WGS84 ellipsoid converter
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84;

impl FrameConverter for Wgs84 {
    fn to_geodetic(&self, position: &Vector3<f64>) -> Result<GeodeticPosition> {
        ecef_to_geodetic(position.x, position.y, position.z)
    }
}

/// Rotate a TEME state into the Earth-fixed frame at the given GMST.
///
/// Polar motion is ignored. Velocity picks up the `-ω × r` term of the
/// rotating frame.
pub fn teme_to_ecef(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    gmst_rad: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst_rad);
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE_RAD_S);

    let r_ecef = rotation * position;
    let v_ecef = rotation * velocity - omega.cross(&r_ecef);

    (r_ecef, v_ecef)
}

/// ECEF (km) to WGS84 geodetic, iterating on latitude.
pub fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> Result<GeodeticPosition> {
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(OrbitalError::InvalidCoordinates(format!(
            "non-finite ECEF position ({}, {}, {})",
            x, y, z
        )));
    }

    let a = EARTH_RADIUS_KM;
    let e2 = EARTH_ECCENTRICITY_SQ;
    let p = (x * x + y * y).sqrt();

    let longitude = y.atan2(x);
    let mut latitude = z.atan2(p * (1.0 - e2));

    for _ in 0..MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + e2 * n * sin_lat).atan2(p);
        let converged = (next - latitude).abs() < LATITUDE_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }

    // Height formula that stays well conditioned at the poles
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let altitude_km = p * cos_lat + z * sin_lat - a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

    Ok(GeodeticPosition {
        latitude: latitude.to_degrees(),
        longitude: longitude.to_degrees(),
        altitude_km,
    })
}

/// WGS84 geodetic to ECEF (km)
pub fn geodetic_to_ecef(pos: &GeodeticPosition) -> Result<Vector3<f64>> {
    if !(pos.latitude.is_finite() && pos.longitude.is_finite() && pos.altitude_km.is_finite()) {
        return Err(OrbitalError::InvalidCoordinates(format!("{:?}", pos)));
    }

    let lat_rad = pos.latitude.to_radians();
    let lon_rad = pos.longitude.to_radians();
    let alt = pos.altitude_km;
    let e2 = EARTH_ECCENTRICITY_SQ;

    // Radius of curvature in prime vertical
    let n = EARTH_RADIUS_KM / (1.0 - e2 * lat_rad.sin().powi(2)).sqrt();

    Ok(Vector3::new(
        (n + alt) * lat_rad.cos() * lon_rad.cos(),
        (n + alt) * lat_rad.cos() * lon_rad.sin(),
        (n * (1.0 - e2) + alt) * lat_rad.sin(),
    ))
}
