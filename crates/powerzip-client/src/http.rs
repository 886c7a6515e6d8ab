//! reqwest-backed clients for the address registry and the pricing service.

use std::time::Duration;

use async_trait::async_trait;
use powerzip_core::{
    AddressMatch, ResolveError, ResolveResult, ServicePointDetails, Tdsp, ZipCode,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{AddressRegistry, Plan, PlanPricing};

/// Default per-request timeout for both services.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    /// Transport failures, 429 and 5xx may succeed on retry; the rest will not.
    pub fn retryable(&self) -> bool {
        match self {
            HttpError::Http(e) => !(e.is_builder() || e.is_decode() || e.is_redirect()),
            HttpError::Server { status, .. } => *status == 429 || *status >= 500,
            HttpError::Json(_) => false,
        }
    }
}

impl From<HttpError> for ResolveError {
    fn from(err: HttpError) -> Self {
        ResolveError::Network {
            retryable: err.retryable(),
            message: err.to_string(),
        }
    }
}

/// Service point as the registry serializes it.
#[derive(Debug, Deserialize)]
struct RawServicePoint {
    esiid: String,
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default = "default_state")]
    state: String,
    zip: String,
    #[serde(default)]
    county: Option<String>,
    duns: String,
    #[serde(default)]
    premise_type: Option<String>,
    #[serde(default)]
    meter_type: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn default_state() -> String {
    "TX".to_string()
}

impl RawServicePoint {
    fn into_match(self) -> Option<(AddressMatch, RawExtras)> {
        let utility = Tdsp::from_id(&self.duns)?;
        let extras = RawExtras {
            premise_type: self.premise_type,
            meter_type: self.meter_type,
            status: self.status,
        };
        let matched = AddressMatch {
            service_point_id: self.esiid,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            county: self.county,
            utility,
        };
        Some((matched, extras))
    }
}

struct RawExtras {
    premise_type: Option<String>,
    meter_type: Option<String>,
    status: Option<String>,
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, HttpError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

async fn read_body(resp: reqwest::Response) -> Result<String, HttpError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(HttpError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.text().await?)
}

/// HTTP client for the service-address (ESIID) registry.
pub struct HttpAddressRegistry {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAddressRegistry {
    /// `base_url` should be like `https://registry.example.com/v1` (no trailing slash).
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn search_request(&self, address: &str, zip: ZipCode) -> reqwest::RequestBuilder {
        let url = format!("{}/esiids", self.base_url);
        let zip = zip.to_string();
        let req = self
            .client
            .get(url)
            .query(&[("address", address), ("zip", zip.as_str())]);
        self.authorize(req)
    }

    fn details_request(&self, service_point_id: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/esiids/{}", self.base_url, service_point_id);
        self.authorize(self.client.get(url))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

fn parse_search(body: &str) -> Result<Vec<AddressMatch>, HttpError> {
    let raw: Vec<RawServicePoint> = serde_json::from_str(body)?;
    let total = raw.len();
    let matches: Vec<AddressMatch> = raw
        .into_iter()
        .filter_map(|r| {
            let duns = r.duns.clone();
            let esiid = r.esiid.clone();
            let parsed = r.into_match();
            if parsed.is_none() {
                warn!(esiid = %esiid, duns = %duns, "ignoring service point with unknown utility id");
            }
            parsed.map(|(m, _)| m)
        })
        .collect();
    if matches.len() < total {
        info!(kept = matches.len(), total, "filtered registry results");
    }
    Ok(matches)
}

fn parse_details(body: &str) -> Result<Option<ServicePointDetails>, HttpError> {
    let raw: RawServicePoint = serde_json::from_str(body)?;
    Ok(raw.into_match().map(|(matched, extras)| ServicePointDetails {
        matched,
        premise_type: extras.premise_type,
        meter_type: extras.meter_type,
        status: extras.status,
    }))
}

#[async_trait]
impl AddressRegistry for HttpAddressRegistry {
    async fn search(&self, address: &str, zip: ZipCode) -> ResolveResult<Vec<AddressMatch>> {
        info!(zip = %zip, address, "searching service address registry");
        let resp = self
            .search_request(address, zip)
            .send()
            .await
            .map_err(HttpError::from)?;
        let body = read_body(resp).await?;
        let matches = parse_search(&body)?;
        info!(count = matches.len(), "registry search complete");
        Ok(matches)
    }

    async fn details(&self, service_point_id: &str) -> ResolveResult<ServicePointDetails> {
        info!(service_point_id, "fetching service point details");
        let resp = self
            .details_request(service_point_id)
            .send()
            .await
            .map_err(HttpError::from)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::UnknownServicePoint(service_point_id.to_string()));
        }
        let body = read_body(resp).await?;
        parse_details(&body)?
            .ok_or_else(|| ResolveError::UnknownServicePoint(service_point_id.to_string()))
    }
}

#[derive(Deserialize)]
struct PlansResponse {
    plans: Vec<Plan>,
}

/// HTTP client for the retail plan pricing service.
pub struct HttpPlanPricing {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPlanPricing {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn plans_request(&self, zip: ZipCode, utility: Tdsp, usage_kwh: u32) -> reqwest::RequestBuilder {
        let url = format!("{}/plans", self.base_url);
        let req = self.client.get(url).query(&[
            ("tdsp_duns", utility.id().to_string()),
            ("zip", zip.to_string()),
            ("usage", usage_kwh.to_string()),
        ]);
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl PlanPricing for HttpPlanPricing {
    async fn fetch_plans(
        &self,
        zip: ZipCode,
        utility: Tdsp,
        usage_kwh: u32,
    ) -> ResolveResult<Vec<Plan>> {
        info!(zip = %zip, utility = %utility, usage_kwh, "fetching plans");
        let resp = self
            .plans_request(zip, utility, usage_kwh)
            .send()
            .await
            .map_err(HttpError::from)?;
        let body = read_body(resp).await?;
        let parsed: PlansResponse = serde_json::from_str(&body).map_err(HttpError::from)?;
        info!(count = parsed.plans.len(), "plans fetched");
        Ok(parsed.plans)
    }
}
