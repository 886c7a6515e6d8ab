//! Collaborator seams for the resolver: the service-address registry and the
//! plan pricing service, plus the retry policy applied to both.

pub mod retry;

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use powerzip_core::{AddressMatch, ResolveResult, ServicePointDetails, Tdsp, ZipCode};
use serde::{Deserialize, Serialize};

pub use retry::{RetryPolicy, with_timeout};

#[cfg(feature = "http")]
pub use http::{HttpAddressRegistry, HttpError, HttpPlanPricing};

/// External registry mapping service addresses to service points and utilities.
#[async_trait]
pub trait AddressRegistry: Send + Sync {
    /// All premises matching a normalized street address within a ZIP.
    async fn search(&self, address: &str, zip: ZipCode) -> ResolveResult<Vec<AddressMatch>>;

    /// Extended fields for one service point.
    async fn details(&self, service_point_id: &str) -> ResolveResult<ServicePointDetails>;
}

/// A retail plan as returned by the pricing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub rate_cents_per_kwh: Option<f64>,
    #[serde(default)]
    pub term_months: Option<u32>,
}

/// Plan pricing service, scoped by ZIP and utility.
#[async_trait]
pub trait PlanPricing: Send + Sync {
    async fn fetch_plans(&self, zip: ZipCode, utility: Tdsp, usage_kwh: u32)
    -> ResolveResult<Vec<Plan>>;
}
