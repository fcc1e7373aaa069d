//! Feature shaping for the downstream ML pipeline.
//!
//! Turns a resolution into the numeric features the road-condition model
//! consumes: normalized limit, one-hot road class, an urbanization heuristic,
//! and the delta from the previously seen limit.

use serde::Serialize;

use crate::models::{Resolution, RoadCategory};

/// Normalization ceiling; 110 km/h is the highest signed limit in the network
const MAX_LIMIT_KMH: f64 = 110.0;

/// Number of one-hot road class bins: European, National, County, Municipal,
/// and everything else collapsed into one
pub const ROAD_CLASS_BINS: usize = 5;

/// Feature vector shaped from one successful resolution
#[derive(Debug, Clone, Serialize)]
pub struct LimitFeatures {
    /// Limit scaled to [0, 1]
    pub normalized_limit: f64,
    pub road_class_one_hot: [f64; ROAD_CLASS_BINS],
    /// 0.0 = rural/highway, 1.0 = dense urban
    pub urbanization_index: f64,
    /// Change from the previous resolved limit, km/h; 0 on the first sample
    pub limit_delta: f64,
}

/// Road class parsed from a display label like "EV6 S77D1" or "FV704 S1D1"
pub fn road_class_from_label(label: &str) -> RoadCategory {
    let prefix = label.chars().take(2).collect::<String>().to_uppercase();
    match prefix.as_str() {
        "EV" => RoadCategory::European,
        "RV" => RoadCategory::National,
        "FV" => RoadCategory::County,
        "KV" => RoadCategory::Municipal,
        "PV" => RoadCategory::Private,
        _ => RoadCategory::Unknown,
    }
}

/// One-hot encoding over [European, National, County, Municipal, other]
pub fn one_hot_road_class(category: RoadCategory) -> [f64; ROAD_CLASS_BINS] {
    let mut bins = [0.0; ROAD_CLASS_BINS];
    let index = match category {
        RoadCategory::European => 0,
        RoadCategory::National => 1,
        RoadCategory::County => 2,
        RoadCategory::Municipal => 3,
        RoadCategory::Private | RoadCategory::Unknown => 4,
    };
    bins[index] = 1.0;
    bins
}

/// Rough urbanization estimate: low limits on municipal/county roads mean
/// dense surroundings, high limits on trunk routes mean open road
pub fn urbanization_index(category: RoadCategory, limit_kmh: u16) -> f64 {
    match category {
        RoadCategory::Municipal if limit_kmh <= 40 => 1.0,
        RoadCategory::County if limit_kmh <= 50 => 0.7,
        RoadCategory::European | RoadCategory::National if limit_kmh >= 80 => 0.1,
        _ => 0.4,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Stateful shaper keeping the previous limit for delta features.
///
/// Like the continuity state it is per-session: one shaper per moving entity.
#[derive(Debug, Default)]
pub struct FeatureShaper {
    last_limit_kmh: Option<u16>,
}

impl FeatureShaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape features from a resolution; `None` when nothing was resolved.
    /// The previous-limit memory only advances on successful resolutions.
    pub fn shape(&mut self, resolution: &Resolution) -> Option<LimitFeatures> {
        let resolved = match resolution {
            Resolution::Found(r) => r,
            Resolution::NotFound { .. } => return None,
        };

        let category = road_class_from_label(&resolved.road_label);
        let delta = match self.last_limit_kmh {
            Some(last) => f64::from(resolved.limit_kmh) - f64::from(last),
            None => 0.0,
        };
        self.last_limit_kmh = Some(resolved.limit_kmh);

        Some(LimitFeatures {
            normalized_limit: round3(f64::from(resolved.limit_kmh) / MAX_LIMIT_KMH),
            road_class_one_hot: one_hot_road_class(category),
            urbanization_index: urbanization_index(category, resolved.limit_kmh),
            limit_delta: delta,
        })
    }

    pub fn reset(&mut self) {
        self.last_limit_kmh = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchConfidence, ResolvedLimit};

    fn found(limit: u16, label: &str) -> Resolution {
        Resolution::Found(ResolvedLimit {
            limit_kmh: limit,
            road_label: label.to_string(),
            distance_m: 10.0,
            segment_id: 1,
            confidence: MatchConfidence::Identity,
        })
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(road_class_from_label("EV6 S77D1"), RoadCategory::European);
        assert_eq!(road_class_from_label("fv704"), RoadCategory::County);
        assert_eq!(road_class_from_label("KV1012 S1D1"), RoadCategory::Municipal);
        assert_eq!(road_class_from_label(""), RoadCategory::Unknown);
        assert_eq!(road_class_from_label("X"), RoadCategory::Unknown);
    }

    #[test]
    fn test_one_hot_sums_to_one() {
        for category in [
            RoadCategory::European,
            RoadCategory::County,
            RoadCategory::Private,
        ] {
            let bins = one_hot_road_class(category);
            assert_eq!(bins.iter().sum::<f64>(), 1.0);
        }
        assert_eq!(one_hot_road_class(RoadCategory::European)[0], 1.0);
        assert_eq!(one_hot_road_class(RoadCategory::Unknown)[4], 1.0);
    }

    #[test]
    fn test_urbanization_bands() {
        assert_eq!(urbanization_index(RoadCategory::Municipal, 30), 1.0);
        assert_eq!(urbanization_index(RoadCategory::County, 50), 0.7);
        assert_eq!(urbanization_index(RoadCategory::European, 100), 0.1);
        assert_eq!(urbanization_index(RoadCategory::Municipal, 60), 0.4);
    }

    #[test]
    fn test_shaper_delta_tracking() {
        let mut shaper = FeatureShaper::new();

        let first = shaper.shape(&found(80, "EV6 S77D1")).unwrap();
        assert_eq!(first.limit_delta, 0.0);
        assert_eq!(first.normalized_limit, 0.727);
        assert_eq!(first.urbanization_index, 0.1);

        let second = shaper.shape(&found(60, "EV6 S77D1")).unwrap();
        assert_eq!(second.limit_delta, -20.0);

        // NotFound yields nothing and does not advance the memory
        assert!(shaper
            .shape(&Resolution::NotFound {
                nearest_label: None,
                distance_m: None
            })
            .is_none());
        let third = shaper.shape(&found(80, "EV6 S77D1")).unwrap();
        assert_eq!(third.limit_delta, 20.0);
    }
}
