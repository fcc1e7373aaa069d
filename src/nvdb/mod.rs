//! NVDB v4 REST API access.
//!
//! Two read-only endpoints are consumed: position snap-to-segments
//! (`/vegnett/api/v4/posisjon`) and speed-limit objects by location
//! (`/vegobjekter/api/v4/vegobjekter/105`). Attributes are never embedded in
//! the position response; resolution is always the two-step locate-then-fetch
//! pattern.

pub mod client;
pub mod network;
pub mod wire;

pub use client::{NetworkConfig, NvdbClient};
pub use network::RoadNetwork;
