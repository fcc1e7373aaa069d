//! Road network identity types.
//!
//! NVDB identifies a road two ways: the road system reference (administrative
//! category + route number, e.g. "EV6") used for identity matching, and the
//! road-link sequence (an opaque id + relative position) used to anchor
//! follow-up queries to one exact spot on the network graph.

use serde::{Deserialize, Serialize};

/// Administrative road category, from the single-letter NVDB code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadCategory {
    /// Europaveg (E)
    European,
    /// Riksveg (R)
    National,
    /// Fylkesveg (F)
    County,
    /// Kommunal veg (K)
    Municipal,
    /// Privat veg (P)
    Private,
    Unknown,
}

impl RoadCategory {
    /// Parse the `vegkategori` code as NVDB returns it
    pub fn from_code(code: &str) -> Self {
        match code {
            "E" => RoadCategory::European,
            "R" => RoadCategory::National,
            "F" => RoadCategory::County,
            "K" => RoadCategory::Municipal,
            "P" => RoadCategory::Private,
            _ => RoadCategory::Unknown,
        }
    }
}

impl std::fmt::Display for RoadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadCategory::European => write!(f, "european"),
            RoadCategory::National => write!(f, "national"),
            RoadCategory::County => write!(f, "county"),
            RoadCategory::Municipal => write!(f, "municipal"),
            RoadCategory::Private => write!(f, "private"),
            RoadCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Road-system identity key: category + route number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSystemRef {
    pub category: RoadCategory,
    /// Route number; municipal and private roads often have none
    pub route_number: Option<u32>,
}

impl RoadSystemRef {
    /// Identity comparison used for matching attribute objects to segments.
    /// Both sides need a concrete category and number to be comparable.
    pub fn same_road(&self, other: &RoadSystemRef) -> bool {
        self.route_number.is_some()
            && self.category != RoadCategory::Unknown
            && self.category == other.category
            && self.route_number == other.route_number
    }

    /// Whether this reference carries enough identity to match against
    pub fn is_identifiable(&self) -> bool {
        self.category != RoadCategory::Unknown && self.route_number.is_some()
    }
}

/// Locator for one exact spot on the network graph: road-link sequence id
/// plus relative position along it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnchor {
    pub link_sequence_id: i64,
    pub relative_position: f64,
}

impl SegmentAnchor {
    /// Serialize as the `veglenkesekvens` query parameter: "pos@id"
    pub fn to_query(&self) -> String {
        format!("{}@{}", self.relative_position, self.link_sequence_id)
    }
}

/// One road segment located near a queried point.
///
/// Produced ranked by ascending distance; rank and distance are the only
/// ordering signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCandidate {
    /// Opaque network identifier (the road-link sequence id)
    pub segment_id: i64,
    pub road_ref: RoadSystemRef,
    /// Display label, e.g. "EV6 S77D1"
    pub short_label: String,
    /// Distance from the queried point to the segment geometry, meters
    pub distance_m: f64,
    /// Locator for re-querying attributes anchored to this exact spot
    pub anchor: SegmentAnchor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes() {
        assert_eq!(RoadCategory::from_code("E"), RoadCategory::European);
        assert_eq!(RoadCategory::from_code("K"), RoadCategory::Municipal);
        assert_eq!(RoadCategory::from_code("S"), RoadCategory::Unknown);
    }

    #[test]
    fn test_same_road_requires_full_identity() {
        let e6 = RoadSystemRef {
            category: RoadCategory::European,
            route_number: Some(6),
        };
        let e6_again = e6;
        let e18 = RoadSystemRef {
            category: RoadCategory::European,
            route_number: Some(18),
        };
        let unnumbered = RoadSystemRef {
            category: RoadCategory::Municipal,
            route_number: None,
        };

        assert!(e6.same_road(&e6_again));
        assert!(!e6.same_road(&e18));
        assert!(!unnumbered.same_road(&unnumbered));
        assert!(!unnumbered.is_identifiable());
    }

    #[test]
    fn test_anchor_query_format() {
        let anchor = SegmentAnchor {
            link_sequence_id: 41423,
            relative_position: 0.63245,
        };
        assert_eq!(anchor.to_query(), "0.63245@41423");
    }
}
