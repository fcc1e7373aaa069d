//! Candidate/object matching.
//!
//! Identity matching runs before any nearest-value fallback: a neighboring
//! parallel road's limit must not get attached to the wrong label just
//! because that road's geometry happens to be closer.

use tracing::debug;

use crate::models::{MatchConfidence, ResolvedLimit, SegmentCandidate, SpeedLimitObject};

/// Match fetched speed-limit objects against located candidates.
///
/// `candidates` are ordered by ascending distance and `objects` are already
/// filtered to usable values. Priority ladder:
///
/// 1. road-system identity: first candidate (by distance) for which some
///    object carries a matching category + route number;
/// 2. unconstrained: no candidate carries a usable identity (unnamed or
///    private roads), so the first object is taken on trust;
/// 3. nearest-value fallback: identity failed everywhere, the first object's
///    value is returned labeled with the nearest candidate, and the mismatch
///    is flagged through [`MatchConfidence::NearestFallback`].
///
/// Continuity priority is not handled here; the resolver applies it through
/// an anchored fetch before any area matching happens.
pub fn match_candidates(
    candidates: &[SegmentCandidate],
    objects: &[SpeedLimitObject],
) -> Option<ResolvedLimit> {
    let nearest = candidates.first()?;

    for candidate in candidates {
        for object in objects {
            if object.applies_to(&candidate.road_ref) {
                debug!(
                    "identity match: object {} ({} km/h) on {}",
                    object.object_id, object.limit_kmh, candidate.short_label
                );
                return Some(ResolvedLimit {
                    limit_kmh: object.limit_kmh,
                    road_label: candidate.short_label.clone(),
                    distance_m: candidate.distance_m,
                    segment_id: candidate.segment_id,
                    confidence: MatchConfidence::Identity,
                });
            }
        }
    }

    let object = objects.first()?;
    let confidence = if candidates.iter().any(|c| c.road_ref.is_identifiable()) {
        debug!(
            "no identity match; falling back to object {} ({} km/h) labeled {}",
            object.object_id, object.limit_kmh, nearest.short_label
        );
        MatchConfidence::NearestFallback
    } else {
        MatchConfidence::Unreferenced
    };

    Some(ResolvedLimit {
        limit_kmh: object.limit_kmh,
        road_label: nearest.short_label.clone(),
        distance_m: nearest.distance_m,
        segment_id: nearest.segment_id,
        confidence,
    })
}
