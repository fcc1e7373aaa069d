//! Geographic and planar coordinate types.

use serde::{Deserialize, Serialize};

/// Raw GPS fix (WGS84 degrees)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    /// Altitude in meters, when the receiver provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            altitude: None,
        }
    }

    pub fn with_altitude(lat: f64, lon: f64, altitude: f64) -> Self {
        Self {
            lat,
            lon,
            altitude: Some(altitude),
        }
    }

    /// Check that the fix is a plausible WGS84 coordinate
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Point in the road network's planar system (EPSG:5973, meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub east: f64,
    pub north: f64,
}

/// Axis-aligned square box around a projected point, for area queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_east: f64,
    pub min_north: f64,
    pub max_east: f64,
    pub max_north: f64,
}

impl BoundingBox {
    /// Build a box extending `half_width` meters in each direction
    pub fn around(center: ProjectedPoint, half_width: f64) -> Self {
        Self {
            min_east: center.east - half_width,
            min_north: center.north - half_width,
            max_east: center.east + half_width,
            max_north: center.north + half_width,
        }
    }

    /// Serialize as the `kartutsnitt` query parameter: "minx,miny,maxx,maxy"
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_east, self.min_north, self.max_east, self.max_north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        assert!(GeoPoint::new(63.4305, 10.3951).is_valid());
        assert!(!GeoPoint::new(91.0, 10.0).is_valid());
        assert!(!GeoPoint::new(60.0, -181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_bbox_around() {
        let bbox = BoundingBox::around(
            ProjectedPoint {
                east: 1000.0,
                north: 2000.0,
            },
            50.0,
        );
        assert_eq!(bbox.min_east, 950.0);
        assert_eq!(bbox.max_north, 2050.0);
        assert_eq!(bbox.to_query(), "950,1950,1050,2050");
    }
}
