//! Core data models for the resolution engine.

pub mod geo;
pub mod limit;
pub mod road;

pub use geo::{BoundingBox, GeoPoint, ProjectedPoint};
pub use limit::{MatchConfidence, Resolution, ResolvedLimit, SpeedLimitObject};
pub use road::{RoadCategory, RoadSystemRef, SegmentAnchor, SegmentCandidate};
