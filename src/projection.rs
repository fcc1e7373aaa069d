//! WGS84 to NVDB planar coordinates.
//!
//! NVDB v4 takes planar coordinates in EPSG:5973 (ETRS89 / UTM zone 33N +
//! NN2000 heights); the horizontal part is plain UTM 33N on the GRS80
//! ellipsoid. The forward transform below is the Karney/Krüger series to
//! third order in the third flattening, good to well under a millimeter over
//! the zone. ETRS89 vs WGS84 datum drift is far below GPS fix noise and is
//! ignored.
//!
//! The network API takes `nord`/`ost` as named parameters; keep northing and
//! easting apart by name, never by position.

use crate::error::ResolveError;
use crate::models::{GeoPoint, ProjectedPoint};

// GRS80
const SEMI_MAJOR_M: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_222_101;

// UTM zone 33N
const CENTRAL_MERIDIAN_DEG: f64 = 15.0;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING_M: f64 = 500_000.0;

/// Project a validated GPS fix into EPSG:5973 easting/northing
pub fn project(point: &GeoPoint) -> Result<ProjectedPoint, ResolveError> {
    if !point.is_valid() {
        return Err(ResolveError::InvalidInput(format!(
            "coordinates out of range: lat={}, lon={}",
            point.lat, point.lon
        )));
    }
    Ok(utm33_forward(point.lat, point.lon))
}

/// Karney-series forward transverse Mercator, fixed to zone 33N
fn utm33_forward(lat_deg: f64, lon_deg: f64) -> ProjectedPoint {
    let n = FLATTENING / (2.0 - FLATTENING);
    let n2 = n * n;
    let n3 = n2 * n;

    // Rectifying radius
    let big_a = SEMI_MAJOR_M / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

    let alpha1 = n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0;
    let alpha2 = 13.0 * n2 / 48.0 - 3.0 * n3 / 5.0;
    let alpha3 = 61.0 * n3 / 240.0;

    let phi = lat_deg.to_radians();
    let dlam = (lon_deg - CENTRAL_MERIDIAN_DEG).to_radians();

    // Conformal latitude
    let k = 2.0 * n.sqrt() / (1.0 + n);
    let t = (phi.sin().atanh() - k * (k * phi.sin()).atanh()).sinh();

    let xi_p = t.atan2(dlam.cos());
    let eta_p = (dlam.sin() / (t * t + dlam.cos() * dlam.cos()).sqrt()).asinh();

    let xi = xi_p
        + alpha1 * (2.0 * xi_p).sin() * (2.0 * eta_p).cosh()
        + alpha2 * (4.0 * xi_p).sin() * (4.0 * eta_p).cosh()
        + alpha3 * (6.0 * xi_p).sin() * (6.0 * eta_p).cosh();
    let eta = eta_p
        + alpha1 * (2.0 * xi_p).cos() * (2.0 * eta_p).sinh()
        + alpha2 * (4.0 * xi_p).cos() * (4.0 * eta_p).sinh()
        + alpha3 * (6.0 * xi_p).cos() * (6.0 * eta_p).sinh();

    ProjectedPoint {
        east: FALSE_EASTING_M + SCALE_FACTOR * big_a * eta,
        north: SCALE_FACTOR * big_a * xi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of_zone() {
        // Equator on the central meridian is the projection origin
        let p = utm33_forward(0.0, CENTRAL_MERIDIAN_DEG);
        assert!((p.east - FALSE_EASTING_M).abs() < 1e-6);
        assert!(p.north.abs() < 1e-6);
    }

    #[test]
    fn test_central_meridian_easting() {
        let p = utm33_forward(63.4305, CENTRAL_MERIDIAN_DEG);
        assert!((p.east - FALSE_EASTING_M).abs() < 1e-6);
        assert!(p.north > 0.0);
    }

    #[test]
    fn test_east_west_symmetry() {
        let west = utm33_forward(63.0, 14.0);
        let east = utm33_forward(63.0, 16.0);
        assert!((west.east - FALSE_EASTING_M + (east.east - FALSE_EASTING_M)).abs() < 1e-6);
        assert!((west.north - east.north).abs() < 1e-6);
    }

    #[test]
    fn test_northing_monotonic_with_latitude() {
        let trondheim = utm33_forward(63.4305, CENTRAL_MERIDIAN_DEG);
        let oslo = utm33_forward(59.91, CENTRAL_MERIDIAN_DEG);
        assert!(trondheim.north > oslo.north);
    }

    #[test]
    fn test_trondheim_plausible() {
        // City centre of Trondheim, well west of the 15E meridian
        let p = utm33_forward(63.4305, 10.3951);
        assert!(p.east > 265_000.0 && p.east < 275_000.0, "east {}", p.east);
        assert!(
            p.north > 7_030_000.0 && p.north < 7_050_000.0,
            "north {}",
            p.north
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = project(&GeoPoint::new(120.0, 10.0));
        assert!(matches!(err, Err(ResolveError::InvalidInput(_))));
    }
}
