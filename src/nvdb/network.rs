//! Road network query seam.

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::models::{BoundingBox, ProjectedPoint, SegmentAnchor, SegmentCandidate, SpeedLimitObject};

/// The queries the resolution engine makes against a road network.
///
/// `NvdbClient` is the production implementation; tests drive the engine
/// against an in-memory stub. Every method is one fresh network call with a
/// bounded timeout and no internal retries.
#[async_trait]
pub trait RoadNetwork: Send + Sync {
    /// Snap a projected point to the nearest road segments within
    /// `radius_m`, at most `max_candidates` of them, ordered by ascending
    /// distance. Nothing within radius is an empty list, not an error.
    async fn locate_segments(
        &self,
        point: ProjectedPoint,
        radius_m: f64,
        max_candidates: usize,
    ) -> Result<Vec<SegmentCandidate>, NetworkError>;

    /// Fetch speed-limit objects anchored to one exact segment locator.
    /// Objects without a usable value are already filtered out.
    async fn limits_at_anchor(
        &self,
        anchor: &SegmentAnchor,
    ) -> Result<Vec<SpeedLimitObject>, NetworkError>;

    /// Fetch speed-limit objects whose geometry intersects `area`.
    /// Objects without a usable value are already filtered out.
    async fn limits_in_area(
        &self,
        area: &BoundingBox,
    ) -> Result<Vec<SpeedLimitObject>, NetworkError>;
}
