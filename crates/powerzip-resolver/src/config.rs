use std::time::Duration;

use powerzip_client::RetryPolicy;

/// Tunables for the resolver. `Default` carries production values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Bound on each address registry call.
    pub address_timeout: Duration,
    /// Bound on each pricing call made while probing.
    pub probe_timeout: Duration,
    /// Pause between consecutive probe queries for one ZIP.
    pub probe_delay: Duration,
    pub retry: RetryPolicy,
    pub zip_cache_ttl: Duration,
    pub address_cache_ttl: Duration,
    /// Include the dynamic prober in the strategy chain when pricing is available.
    pub probe_enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            address_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(10),
            probe_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            zip_cache_ttl: Duration::from_secs(24 * 60 * 60),
            address_cache_ttl: Duration::from_secs(30 * 60),
            probe_enabled: true,
        }
    }
}

impl ResolverConfig {
    /// No delays or retries; for tests and offline tools.
    pub fn immediate() -> Self {
        Self {
            probe_delay: Duration::ZERO,
            retry: RetryPolicy::none(),
            ..Self::default()
        }
    }
}
