//! Skilt - speed-limit resolution for the Norwegian road network (NVDB)
//!
//! Turns a raw GPS fix into the signed speed limit of the road the fix lies
//! on: projects the fix into NVDB's planar SRID, snaps it to nearby road
//! segments, fetches speed-limit objects for those segments, and matches
//! value to road by road-system identity. Per-session continuity state keeps
//! the resolved road stable across intersections.

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod nvdb;
pub mod pipeline;
pub mod projection;
pub mod weather;

pub use engine::{DriveSession, MatchMode, Resolver, ResolverConfig};
pub use error::{NetworkError, ResolveError};
pub use models::{GeoPoint, MatchConfidence, Resolution, ResolvedLimit, RoadCategory};
pub use nvdb::{NvdbClient, RoadNetwork};
