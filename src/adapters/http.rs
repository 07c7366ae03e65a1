use crate::core::{ConfigProvider, ParcelFeature, PlanningApi};
use crate::domain::model::{Geometry, LayerId, ParcelIdentifier, Subsystem};
use crate::utils::error::{ExtractError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://sppims-dams.dsdilgp.qld.gov.au";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const LOT_PLAN_PATH: &str = "/api/v1/lot_plan_geo/";
const IMS_INTERSECT_PATH: &str = "/api/v1/spp_intersect/";
const DAMS_INTERSECT_PATH: &str = "/api/v1/dams_intersect/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/120.0.0.0 Safari/537.36";

#[derive(Serialize)]
struct LotPlanQuery<'a> {
    search_term_multiple: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntersectQuery<'a> {
    f: &'static str,
    is_envelope: bool,
    geometry: &'a Value,
}

#[derive(Deserialize)]
struct LotPlanResponse {
    #[serde(default)]
    features: Option<Vec<FeatureBody>>,
}

#[derive(Deserialize)]
struct FeatureBody {
    #[serde(default)]
    attributes: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Value>,
}

#[derive(Deserialize)]
struct IntersectResponse {
    #[serde(default, rename = "layerList")]
    layer_list: Option<Vec<Value>>,
}

/// The header set the upstream service expects from its own web client.
pub fn default_headers(base_url: &str) -> Result<HeaderMap> {
    let origin = base_url.trim_end_matches('/');
    let referer = format!("{}/", origin);

    let pairs = [
        ("content-type", "application/json"),
        ("accept", "application/json, text/javascript, */*; q=0.01"),
        ("origin", origin),
        ("referer", referer.as_str()),
        ("user-agent", USER_AGENT),
        ("accept-language", "en-AU,en;q=0.9"),
        ("accept-encoding", "gzip, deflate, br"),
        ("connection", "keep-alive"),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(HeaderName::from_static(name), header_value(name, value)?);
    }
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ExtractError::InvalidConfigValue {
        field: format!("api.headers.{}", name),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// reqwest client for the SPP IMS / DAMS planning API.
#[derive(Debug, Clone)]
pub struct PlanningApiClient {
    client: Client,
    base_url: String,
}

impl PlanningApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_extra_headers(base_url, timeout, &HashMap::new())
    }

    /// Extra headers are applied on top of the defaults and may override them.
    pub fn with_extra_headers(
        base_url: &str,
        timeout: Duration,
        extra: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut headers = default_headers(base_url)?;
        for (key, value) in extra {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                ExtractError::InvalidConfigValue {
                    field: "api.headers".to_string(),
                    value: key.clone(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(name, header_value(key, value)?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(ExtractError::remote(url, format!("HTTP {}", status)));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ExtractError::remote(url, format!("malformed response: {}", e)))
    }
}

#[async_trait::async_trait]
impl PlanningApi for PlanningApiClient {
    async fn lookup_lot_plan(&self, identifier: &ParcelIdentifier) -> Result<Vec<ParcelFeature>> {
        let query = LotPlanQuery {
            search_term_multiple: identifier.as_str(),
        };
        let response: LotPlanResponse = self.post_json(LOT_PLAN_PATH, &query).await?;

        Ok(response
            .features
            .unwrap_or_default()
            .into_iter()
            .map(|f| ParcelFeature {
                attributes: f.attributes.unwrap_or_default(),
                geometry: f.geometry,
            })
            .collect())
    }

    async fn intersect(&self, subsystem: Subsystem, geometry: &Geometry) -> Result<Vec<LayerId>> {
        let path = match subsystem {
            Subsystem::Ims => IMS_INTERSECT_PATH,
            Subsystem::Dams => DAMS_INTERSECT_PATH,
        };
        let query = IntersectQuery {
            f: "json",
            is_envelope: false,
            geometry: geometry.as_json(),
        };
        let response: IntersectResponse = self.post_json(path, &query).await?;

        response
            .layer_list
            .unwrap_or_default()
            .iter()
            .map(|value| {
                layer_id(value).ok_or_else(|| {
                    ExtractError::remote(
                        self.endpoint(path),
                        format!("unexpected layer id {}", value),
                    )
                })
            })
            .collect()
    }
}

/// Layer ids arrive as integers, integral floats, or numeric strings.
fn layer_id(value: &Value) -> Option<LayerId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
