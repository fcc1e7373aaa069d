//! Reqwest-backed NVDB v4 client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::network::RoadNetwork;
use super::wire::{ObjectResponse, PositionMatch, Vegobjekt};
use crate::error::NetworkError;
use crate::models::{BoundingBox, ProjectedPoint, SegmentAnchor, SegmentCandidate, SpeedLimitObject};

const DEFAULT_BASE_URL: &str = "https://nvdbapiles.atlas.vegvesen.no";
const ACCEPT_V4: &str = "application/vnd.vegvesen.nvdb-v4+json";

/// NVDB object type 105 = speed limit
const SPEED_LIMIT_TYPE_ID: u32 = 105;
/// Planar SRID of every coordinate sent and received
const PLANAR_SRID: u32 = 5973;
/// Position queries are pinned to motorized traffic; pedestrian/cycle links
/// must never become candidates
const TRAFFIC_GROUP_MOTORIZED: &str = "K";
/// Result cap for area-mode object queries
const AREA_RESULT_COUNT: u32 = 20;

/// HTTP-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub base_url: String,
    /// Sent as the `X-Client` identification header NVDB asks consumers for
    pub client_id: String,
    /// Per-request timeout; on expiry the call fails as a transport error
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: format!("skilt/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

/// Client for the two NVDB v4 endpoints the engine consumes
pub struct NvdbClient {
    client: Client,
    position_url: Url,
    objects_url: Url,
}

impl NvdbClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid NVDB base url: {}", config.base_url))?;
        let position_url = base.join("vegnett/api/v4/posisjon")?;
        let objects_url = base.join(&format!(
            "vegobjekter/api/v4/vegobjekter/{}",
            SPEED_LIMIT_TYPE_ID
        ))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V4));
        headers.insert(
            "X-Client",
            HeaderValue::from_str(&config.client_id).context("invalid X-Client value")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            position_url,
            objects_url,
        })
    }

    /// GET with query parameters, decoding the body as JSON.
    ///
    /// Returns `Ok(None)` on 404 so callers can decide whether that means
    /// "no data" or a failure for their endpoint.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        params: &[(&str, String)],
    ) -> Result<Option<T>, NetworkError> {
        let response = self.client.get(url.clone()).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(NetworkError::Status {
                status,
                endpoint: url.path().to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| NetworkError::Decode {
                endpoint: url.path().to_string(),
                message: e.to_string(),
            })
    }

    /// The object endpoint never 404s for an empty result; treat one as a
    /// failing upstream.
    async fn fetch_objects(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<SpeedLimitObject>, NetworkError> {
        let response: ObjectResponse = self
            .get_json(&self.objects_url, params)
            .await?
            .ok_or_else(|| NetworkError::Status {
                status: StatusCode::NOT_FOUND,
                endpoint: self.objects_url.path().to_string(),
            })?;

        Ok(response
            .objekter
            .into_iter()
            .filter_map(Vegobjekt::into_limit)
            .collect())
    }
}

#[async_trait]
impl RoadNetwork for NvdbClient {
    async fn locate_segments(
        &self,
        point: ProjectedPoint,
        radius_m: f64,
        max_candidates: usize,
    ) -> Result<Vec<SegmentCandidate>, NetworkError> {
        let params = [
            ("nord", point.north.to_string()),
            ("ost", point.east.to_string()),
            ("srid", PLANAR_SRID.to_string()),
            ("maks_avstand", radius_m.to_string()),
            ("maks_antall", max_candidates.to_string()),
            ("trafikantgruppe", TRAFFIC_GROUP_MOTORIZED.to_string()),
        ];

        // 404 from the position endpoint means nothing within radius
        let matches: Vec<PositionMatch> = self
            .get_json(&self.position_url, &params)
            .await?
            .unwrap_or_default();

        let candidates: Vec<SegmentCandidate> = matches
            .into_iter()
            .filter_map(PositionMatch::into_candidate)
            .collect();
        debug!(
            "located {} candidate(s) within {radius_m} m",
            candidates.len()
        );
        Ok(candidates)
    }

    async fn limits_at_anchor(
        &self,
        anchor: &SegmentAnchor,
    ) -> Result<Vec<SpeedLimitObject>, NetworkError> {
        let params = [
            ("veglenkesekvens", anchor.to_query()),
            ("inkluder", "egenskaper".to_string()),
            ("srid", PLANAR_SRID.to_string()),
        ];
        let limits = self.fetch_objects(&params).await?;
        debug!(
            "anchor {} returned {} usable object(s)",
            anchor.to_query(),
            limits.len()
        );
        Ok(limits)
    }

    async fn limits_in_area(
        &self,
        area: &BoundingBox,
    ) -> Result<Vec<SpeedLimitObject>, NetworkError> {
        let params = [
            ("kartutsnitt", area.to_query()),
            ("srid", PLANAR_SRID.to_string()),
            ("inkluder", "egenskaper,lokasjon".to_string()),
            ("antall", AREA_RESULT_COUNT.to_string()),
        ];
        let limits = self.fetch_objects(&params).await?;
        debug!("area query returned {} usable object(s)", limits.len());
        Ok(limits)
    }
}
