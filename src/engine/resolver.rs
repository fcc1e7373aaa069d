//! Resolution orchestrator.
//!
//! One `resolve` call is strictly sequential: project, locate, continuity
//! check, fetch, match, confirm. Nothing is retried here; transport failures
//! surface immediately and retry policy stays with the caller.

use serde::Deserialize;
use tracing::{debug, info};

use super::matcher;
use super::session::DriveSession;
use crate::error::ResolveError;
use crate::models::{
    BoundingBox, GeoPoint, MatchConfidence, Resolution, ResolvedLimit, SegmentCandidate,
};
use crate::nvdb::RoadNetwork;
use crate::projection;

/// Candidate preference strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Always work through candidates in pure distance order
    Naive,
    /// Re-prioritize the previously confirmed segment while it stays within
    /// the continuity tolerance, suppressing flicker at intersections
    Sticky,
}

/// Tuning for one resolver instance.
///
/// The earlier implementations of this lookup drifted apart in radius,
/// candidate count and stickiness; they are collapsed into this one set of
/// knobs picked at construction time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Segment search radius around the projected point, meters
    pub radius_m: f64,
    /// Maximum number of candidate segments to consider
    pub max_candidates: usize,
    /// A remembered segment is only re-confirmed while still within this
    /// distance, meters
    pub continuity_tolerance_m: f64,
    /// Half-width of the area-mode object query box, meters
    pub area_half_width_m: f64,
    pub mode: MatchMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            radius_m: 40.0,
            max_candidates: 5,
            continuity_tolerance_m: 30.0,
            area_half_width_m: 50.0,
            mode: MatchMode::Sticky,
        }
    }
}

impl ResolverConfig {
    /// Wide-radius, single-candidate tuning for one-shot lookups where no
    /// continuity exists
    pub fn one_shot() -> Self {
        Self {
            radius_m: 150.0,
            max_candidates: 1,
            mode: MatchMode::Naive,
            ..Self::default()
        }
    }
}

/// Stateless resolution engine over some road network.
///
/// All cross-call state lives in the `DriveSession` handed to `resolve`, so
/// one resolver may serve any number of concurrent sessions.
pub struct Resolver<N: RoadNetwork> {
    network: N,
    config: ResolverConfig,
}

impl<N: RoadNetwork> Resolver<N> {
    pub fn new(network: N) -> Self {
        Self::with_config(network, ResolverConfig::default())
    }

    pub fn with_config(network: N, config: ResolverConfig) -> Self {
        Self { network, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the speed limit at `point` for one drive session.
    ///
    /// Returns `Resolution::NotFound` when the network has no qualifying
    /// data; only malformed input and transport trouble are errors.
    pub async fn resolve(
        &self,
        session: &mut DriveSession,
        point: &GeoPoint,
    ) -> Result<Resolution, ResolveError> {
        let projected = projection::project(point)?;
        debug!(
            session = %session.id(),
            east = projected.east,
            north = projected.north,
            "resolving"
        );

        let candidates = self
            .network
            .locate_segments(projected, self.config.radius_m, self.config.max_candidates)
            .await?;

        if candidates.is_empty() {
            debug!(session = %session.id(), "no segment within radius");
            return Ok(Resolution::NotFound {
                nearest_label: None,
                distance_m: None,
            });
        }

        if self.config.mode == MatchMode::Sticky {
            if let Some(resolved) = self.try_continuity(session, &candidates).await? {
                session.confirm(resolved.segment_id, resolved.distance_m);
                return Ok(Resolution::Found(resolved));
            }
        }

        let area = BoundingBox::around(projected, self.config.area_half_width_m);
        let objects = self.network.limits_in_area(&area).await?;

        match matcher::match_candidates(&candidates, &objects) {
            Some(resolved) => {
                info!(
                    session = %session.id(),
                    limit = resolved.limit_kmh,
                    road = %resolved.road_label,
                    confidence = ?resolved.confidence,
                    "resolved"
                );
                session.confirm(resolved.segment_id, resolved.distance_m);
                Ok(Resolution::Found(resolved))
            }
            None => {
                let nearest = &candidates[0];
                debug!(
                    session = %session.id(),
                    nearest = %nearest.short_label,
                    "segments located but no usable speed-limit object"
                );
                Ok(Resolution::NotFound {
                    nearest_label: Some(nearest.short_label.clone()),
                    distance_m: Some(nearest.distance_m),
                })
            }
        }
    }

    /// Re-confirm the previously resolved segment if it is still among the
    /// candidates and close enough. An anchored fetch is precise and cheap;
    /// its value wins outright so a closer unrelated road cannot steal the
    /// match mid-junction.
    async fn try_continuity(
        &self,
        session: &DriveSession,
        candidates: &[SegmentCandidate],
    ) -> Result<Option<ResolvedLimit>, ResolveError> {
        let last_id = match session.current() {
            Some(id) => id,
            None => return Ok(None),
        };

        let candidate = match candidates.iter().find(|c| c.segment_id == last_id) {
            Some(c) if c.distance_m < self.config.continuity_tolerance_m => c,
            Some(c) => {
                debug!(
                    session = %session.id(),
                    distance = c.distance_m,
                    "remembered segment drifted past continuity tolerance"
                );
                return Ok(None);
            }
            None => return Ok(None),
        };

        let objects = self.network.limits_at_anchor(&candidate.anchor).await?;
        let Some(object) = objects.first() else {
            return Ok(None);
        };

        debug!(
            session = %session.id(),
            road = %candidate.short_label,
            limit = object.limit_kmh,
            "continuity hold"
        );
        Ok(Some(ResolvedLimit {
            limit_kmh: object.limit_kmh,
            road_label: candidate.short_label.clone(),
            distance_m: candidate.distance_m,
            segment_id: candidate.segment_id,
            confidence: MatchConfidence::Continuity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::models::{
        ProjectedPoint, RoadCategory, RoadSystemRef, SegmentAnchor, SpeedLimitObject,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory road network with scriptable failures
    #[derive(Default)]
    struct StubNetwork {
        candidates: Vec<SegmentCandidate>,
        anchored: HashMap<i64, Vec<SpeedLimitObject>>,
        area: Vec<SpeedLimitObject>,
        fail_area: bool,
        fail_anchor: bool,
    }

    #[async_trait]
    impl RoadNetwork for StubNetwork {
        async fn locate_segments(
            &self,
            _point: ProjectedPoint,
            _radius_m: f64,
            max_candidates: usize,
        ) -> Result<Vec<SegmentCandidate>, NetworkError> {
            Ok(self.candidates.iter().take(max_candidates).cloned().collect())
        }

        async fn limits_at_anchor(
            &self,
            anchor: &SegmentAnchor,
        ) -> Result<Vec<SpeedLimitObject>, NetworkError> {
            if self.fail_anchor {
                return Err(NetworkError::Decode {
                    endpoint: "anchor".into(),
                    message: "injected".into(),
                });
            }
            Ok(self
                .anchored
                .get(&anchor.link_sequence_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn limits_in_area(
            &self,
            _area: &BoundingBox,
        ) -> Result<Vec<SpeedLimitObject>, NetworkError> {
            if self.fail_area {
                return Err(NetworkError::Decode {
                    endpoint: "area".into(),
                    message: "injected".into(),
                });
            }
            Ok(self.area.clone())
        }
    }

    fn candidate(id: i64, category: RoadCategory, number: Option<u32>, label: &str, distance: f64) -> SegmentCandidate {
        SegmentCandidate {
            segment_id: id,
            road_ref: RoadSystemRef {
                category,
                route_number: number,
            },
            short_label: label.to_string(),
            distance_m: distance,
            anchor: SegmentAnchor {
                link_sequence_id: id,
                relative_position: 0.5,
            },
        }
    }

    fn object(id: i64, limit: u16, refs: &[(RoadCategory, u32)]) -> SpeedLimitObject {
        SpeedLimitObject {
            object_id: id,
            limit_kmh: limit,
            road_refs: refs
                .iter()
                .map(|&(category, number)| RoadSystemRef {
                    category,
                    route_number: Some(number),
                })
                .collect(),
        }
    }

    fn point() -> GeoPoint {
        GeoPoint::new(63.333542, 10.356348)
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let resolver = Resolver::new(StubNetwork::default());
        let mut session = DriveSession::new();

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        assert!(matches!(
            resolution,
            Resolution::NotFound {
                nearest_label: None,
                ..
            }
        ));
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let resolver = Resolver::new(StubNetwork::default());
        let mut session = DriveSession::new();

        let err = resolver
            .resolve(&mut session, &GeoPoint::new(95.0, 10.0))
            .await;
        assert!(matches!(err, Err(ResolveError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_single_european_route_match() {
        // Known 80 km/h spot on the E6 with one candidate and one object
        let network = StubNetwork {
            candidates: vec![candidate(41423, RoadCategory::European, Some(6), "EV6 S77D1", 12.0)],
            area: vec![object(1, 80, &[(RoadCategory::European, 6)])],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a resolved limit");
        };
        assert_eq!(resolved.limit_kmh, 80);
        assert_eq!(resolved.road_label, "EV6 S77D1");
        assert_eq!(resolved.distance_m, 12.0);
        assert_eq!(resolved.confidence, MatchConfidence::Identity);
        assert_eq!(session.current(), Some(41423));
    }

    #[tokio::test]
    async fn test_idempotent_under_fresh_state() {
        let network = StubNetwork {
            candidates: vec![candidate(41423, RoadCategory::European, Some(6), "EV6", 12.0)],
            area: vec![object(1, 80, &[(RoadCategory::European, 6)])],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();

        let first = resolver.resolve(&mut session, &point()).await.unwrap();
        session.reset();
        let second = resolver.resolve(&mut session, &point()).await.unwrap();
        assert_eq!(first.limit_kmh(), second.limit_kmh());
    }

    #[tokio::test]
    async fn test_continuity_suppresses_flicker() {
        // The vehicle confirmed segment 1 (80 km/h) earlier. At the next fix
        // an unrelated crossing road (segment 2, 50 km/h) is closer, but
        // segment 1 is still within tolerance and must keep winning.
        let mut anchored = HashMap::new();
        anchored.insert(1, vec![object(10, 80, &[])]);
        let network = StubNetwork {
            candidates: vec![
                candidate(2, RoadCategory::Municipal, Some(1012), "KV1012", 3.0),
                candidate(1, RoadCategory::European, Some(6), "EV6", 9.0),
            ],
            anchored,
            area: vec![object(20, 50, &[(RoadCategory::Municipal, 1012)])],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a resolved limit");
        };
        assert_eq!(resolved.limit_kmh, 80);
        assert_eq!(resolved.road_label, "EV6");
        assert_eq!(resolved.confidence, MatchConfidence::Continuity);
        assert_eq!(session.current(), Some(1));
    }

    #[tokio::test]
    async fn test_naive_mode_ignores_continuity() {
        let mut anchored = HashMap::new();
        anchored.insert(1, vec![object(10, 80, &[])]);
        let network = StubNetwork {
            candidates: vec![
                candidate(2, RoadCategory::Municipal, Some(1012), "KV1012", 3.0),
                candidate(1, RoadCategory::European, Some(6), "EV6", 9.0),
            ],
            anchored,
            area: vec![object(20, 50, &[(RoadCategory::Municipal, 1012)])],
            ..Default::default()
        };
        let config = ResolverConfig {
            mode: MatchMode::Naive,
            ..ResolverConfig::default()
        };
        let resolver = Resolver::with_config(network, config);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a resolved limit");
        };
        assert_eq!(resolved.limit_kmh, 50);
        assert_eq!(resolved.road_label, "KV1012");
    }

    #[tokio::test]
    async fn test_continuity_expires_past_tolerance() {
        // Remembered segment still listed, but 45 m away: beyond the 30 m
        // tolerance, so normal matching decides.
        let mut anchored = HashMap::new();
        anchored.insert(1, vec![object(10, 80, &[])]);
        let network = StubNetwork {
            candidates: vec![
                candidate(2, RoadCategory::Municipal, Some(1012), "KV1012", 3.0),
                candidate(1, RoadCategory::European, Some(6), "EV6", 45.0),
            ],
            anchored,
            area: vec![object(20, 50, &[(RoadCategory::Municipal, 1012)])],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        assert_eq!(resolution.limit_kmh(), Some(50));
        // The new road is confirmed as the current segment
        assert_eq!(session.current(), Some(2));
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_state_untouched() {
        let network = StubNetwork {
            candidates: vec![candidate(2, RoadCategory::Municipal, Some(1012), "KV1012", 3.0)],
            fail_area: true,
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let err = resolver.resolve(&mut session, &point()).await;
        assert!(matches!(err, Err(ResolveError::Transport(_))));
        assert_eq!(session.current(), Some(1));
        assert_eq!(session.last_distance_m(), Some(5.0));
    }

    #[tokio::test]
    async fn test_anchor_failure_is_transport_too() {
        let network = StubNetwork {
            candidates: vec![candidate(1, RoadCategory::European, Some(6), "EV6", 9.0)],
            fail_anchor: true,
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let err = resolver.resolve(&mut session, &point()).await;
        assert!(matches!(err, Err(ResolveError::Transport(_))));
        assert_eq!(session.current(), Some(1));
    }

    #[tokio::test]
    async fn test_located_but_no_objects_is_not_found_with_label() {
        let network = StubNetwork {
            candidates: vec![candidate(1, RoadCategory::European, Some(6), "EV6", 9.0)],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::NotFound {
            nearest_label,
            distance_m,
        } = resolution
        else {
            panic!("expected NotFound");
        };
        assert_eq!(nearest_label.as_deref(), Some("EV6"));
        assert_eq!(distance_m, Some(9.0));
        // NotFound never updates continuity
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_empty_continuity_anchor_falls_through() {
        // Remembered segment is close, but its anchored fetch yields no
        // object; area matching must still resolve the call.
        let network = StubNetwork {
            candidates: vec![candidate(1, RoadCategory::European, Some(6), "EV6", 9.0)],
            area: vec![object(1, 80, &[(RoadCategory::European, 6)])],
            ..Default::default()
        };
        let resolver = Resolver::new(network);
        let mut session = DriveSession::new();
        session.confirm(1, 5.0);

        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a resolved limit");
        };
        assert_eq!(resolved.limit_kmh, 80);
        assert_eq!(resolved.confidence, MatchConfidence::Identity);
    }

    #[tokio::test]
    async fn test_max_candidates_is_respected() {
        let config = ResolverConfig {
            max_candidates: 1,
            mode: MatchMode::Naive,
            ..ResolverConfig::default()
        };
        let network = StubNetwork {
            candidates: vec![
                candidate(1, RoadCategory::European, Some(6), "EV6", 5.0),
                candidate(2, RoadCategory::County, Some(704), "FV704", 8.0),
            ],
            area: vec![object(10, 60, &[(RoadCategory::County, 704)])],
            ..Default::default()
        };
        let resolver = Resolver::with_config(network, config);
        let mut session = DriveSession::new();

        // Only the first candidate is visible, so identity matching cannot
        // reach FV704 and the fallback label is the E6
        let resolution = resolver.resolve(&mut session, &point()).await.unwrap();
        let Resolution::Found(resolved) = resolution else {
            panic!("expected a resolved limit");
        };
        assert_eq!(resolved.confidence, MatchConfidence::NearestFallback);
        assert_eq!(resolved.road_label, "EV6");
    }
}
