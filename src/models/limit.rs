//! Speed-limit attribute objects and resolution outcomes.

use serde::{Deserialize, Serialize};

use super::road::RoadSystemRef;

/// One speed-limit object fetched from the network.
///
/// Objects without an extractable km/h value are dropped during wire
/// conversion and never reach the matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedLimitObject {
    pub object_id: i64,
    /// Signed limit in km/h (typically 20-110 in steps of 10)
    pub limit_kmh: u16,
    /// Road systems the object is registered on; empty in anchored-mode
    /// responses where location data is not requested
    pub road_refs: Vec<RoadSystemRef>,
}

impl SpeedLimitObject {
    /// Whether any of the object's road references identifies `road`
    pub fn applies_to(&self, road: &RoadSystemRef) -> bool {
        self.road_refs.iter().any(|r| r.same_road(road))
    }
}

/// How the returned value was tied to the returned road label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Re-confirmed the segment from the previous resolution
    Continuity,
    /// Road-system identity of object and candidate agree
    Identity,
    /// No candidate carried a usable identity; value taken on trust for an
    /// unnamed/private road
    Unreferenced,
    /// Identity matching failed everywhere; value is from a nearby object and
    /// the label from the nearest candidate, which may be a different road
    NearestFallback,
}

/// A successfully resolved speed limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLimit {
    pub limit_kmh: u16,
    /// Display label of the candidate the value was attached to
    pub road_label: String,
    /// Distance from the queried point to that candidate, meters
    pub distance_m: f64,
    /// Segment the value was attached to, fed back into continuity state
    pub segment_id: i64,
    pub confidence: MatchConfidence,
}

/// Terminal outcome of one resolution call.
///
/// Absence of data is a normal outcome, kept apart from transport failure
/// (`ResolveError`) so callers never conflate "no signed limit here" with
/// "network is down".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found(ResolvedLimit),
    NotFound {
        /// Label of the nearest located segment, when any was found
        nearest_label: Option<String>,
        distance_m: Option<f64>,
    },
}

impl Resolution {
    pub fn limit_kmh(&self) -> Option<u16> {
        match self {
            Resolution::Found(r) => Some(r.limit_kmh),
            Resolution::NotFound { .. } => None,
        }
    }
}
