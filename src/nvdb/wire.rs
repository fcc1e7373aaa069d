//! Serde models of the NVDB v4 response shapes, and their conversion into
//! domain models.
//!
//! Field names follow the Norwegian API verbatim; everything downstream of
//! this module speaks the domain vocabulary instead.

use serde::Deserialize;
use tracing::debug;

use crate::models::{
    RoadCategory, RoadSystemRef, SegmentAnchor, SegmentCandidate, SpeedLimitObject,
};

/// Property id carrying the numeric km/h value on a type-105 object
pub const SPEED_LIMIT_PROPERTY_ID: i64 = 2021;

/// One entry of the position endpoint's response array
#[derive(Debug, Deserialize)]
pub struct PositionMatch {
    #[serde(default)]
    pub avstand: Option<f64>,
    #[serde(default)]
    pub vegsystemreferanse: Option<Vegsystemreferanse>,
    #[serde(default)]
    pub veglenkesekvens: Option<Veglenkesekvens>,
}

#[derive(Debug, Deserialize)]
pub struct Vegsystemreferanse {
    #[serde(default)]
    pub kortform: Option<String>,
    #[serde(default)]
    pub vegsystem: Option<Vegsystem>,
}

#[derive(Debug, Deserialize)]
pub struct Vegsystem {
    #[serde(default)]
    pub vegkategori: Option<String>,
    #[serde(default)]
    pub nummer: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Veglenkesekvens {
    pub veglenkesekvensid: i64,
    #[serde(rename = "relativPosisjon")]
    pub relativ_posisjon: f64,
}

/// Envelope of the object endpoint's response
#[derive(Debug, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub objekter: Vec<Vegobjekt>,
}

#[derive(Debug, Deserialize)]
pub struct Vegobjekt {
    pub id: i64,
    #[serde(default)]
    pub egenskaper: Vec<Egenskap>,
    #[serde(default)]
    pub lokasjon: Option<Lokasjon>,
}

#[derive(Debug, Deserialize)]
pub struct Egenskap {
    pub id: i64,
    #[serde(default)]
    pub verdi: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Lokasjon {
    #[serde(default)]
    pub vegsystemreferanser: Vec<Vegsystemreferanse>,
}

impl Vegsystemreferanse {
    fn road_ref(&self) -> RoadSystemRef {
        let vegsystem = self.vegsystem.as_ref();
        RoadSystemRef {
            category: vegsystem
                .and_then(|v| v.vegkategori.as_deref())
                .map(RoadCategory::from_code)
                .unwrap_or(RoadCategory::Unknown),
            route_number: vegsystem.and_then(|v| v.nummer),
        }
    }
}

impl PositionMatch {
    /// Convert into a domain candidate; matches without a link-sequence
    /// locator cannot be re-queried and are dropped.
    pub fn into_candidate(self) -> Option<SegmentCandidate> {
        let link = self.veglenkesekvens?;
        let (road_ref, label) = match &self.vegsystemreferanse {
            Some(vref) => (
                vref.road_ref(),
                vref.kortform.clone().unwrap_or_else(|| "unknown".into()),
            ),
            None => (
                RoadSystemRef {
                    category: RoadCategory::Unknown,
                    route_number: None,
                },
                "unknown".into(),
            ),
        };
        Some(SegmentCandidate {
            segment_id: link.veglenkesekvensid,
            road_ref,
            short_label: label,
            distance_m: self.avstand.unwrap_or(0.0),
            anchor: SegmentAnchor {
                link_sequence_id: link.veglenkesekvensid,
                relative_position: link.relativ_posisjon,
            },
        })
    }
}

impl Vegobjekt {
    /// Extract the km/h value; the API has been seen returning it both as a
    /// number and as a string.
    fn speed_value(&self) -> Option<u16> {
        let verdi = self
            .egenskaper
            .iter()
            .find(|e| e.id == SPEED_LIMIT_PROPERTY_ID)?
            .verdi
            .as_ref()?;
        match verdi {
            serde_json::Value::Number(n) => n.as_u64().map(|v| v as u16),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Convert into a domain object; objects with no extractable value are
    /// discarded before matching.
    pub fn into_limit(self) -> Option<SpeedLimitObject> {
        let limit_kmh = match self.speed_value() {
            Some(v) => v,
            None => {
                debug!("object {} has no usable speed value, dropping", self.id);
                return None;
            }
        };
        let road_refs = self
            .lokasjon
            .map(|l| {
                l.vegsystemreferanser
                    .iter()
                    .map(Vegsystemreferanse::road_ref)
                    .collect()
            })
            .unwrap_or_default();
        Some(SpeedLimitObject {
            object_id: self.id,
            limit_kmh,
            road_refs,
        })
    }
}
