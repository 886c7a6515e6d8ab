//! Address-level resolution against the service-address registry.

use std::sync::Arc;
use std::time::Duration;

use powerzip_client::{AddressRegistry, RetryPolicy, with_timeout};
use powerzip_core::{
    AddressMatch, Alternative, Confidence, Method, ResolutionResult, ResolveError, ResolveResult,
    ServicePoint, ServicePointDetails, Tdsp, ZipCode, normalize_address,
};
use tracing::{debug, info};

use crate::cache::Cache;
use crate::config::ResolverConfig;

/// Resolves a street address to the utility of the premise it names.
pub struct AddressResolver {
    registry: Arc<dyn AddressRegistry>,
    cache: Arc<dyn Cache<Vec<AddressMatch>>>,
    retry: RetryPolicy,
    timeout: Duration,
    ttl: Duration,
}

impl AddressResolver {
    pub fn new(
        registry: Arc<dyn AddressRegistry>,
        cache: Arc<dyn Cache<Vec<AddressMatch>>>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            retry: config.retry.clone(),
            timeout: config.address_timeout,
            ttl: config.address_cache_ttl,
        }
    }

    /// Resolve `address` within `zip`.
    ///
    /// `usage_hint` is carried for the caller's pricing step and only logged
    /// here. Returns `NoMatchFound` when the registry has no premise for the
    /// address, and a retryable error when the registry cannot be reached.
    pub async fn resolve_address(
        &self,
        address: &str,
        zip: &str,
        usage_hint: Option<u32>,
    ) -> ResolveResult<ResolutionResult> {
        let zip = ZipCode::parse(zip)?;
        let normalized = normalize_address(address);
        if normalized.is_empty() {
            return Err(ResolveError::InvalidAddress(address.to_string()));
        }
        debug!(zip = %zip, address = %normalized, ?usage_hint, "resolving address");

        let matches = self.search(&normalized, zip).await?;
        let result = rank_matches(zip, &matches).ok_or_else(|| ResolveError::NoMatchFound {
            address: normalized.clone(),
            zip: zip.to_string(),
        })?;
        info!(
            zip = %zip,
            utility = %result.utility,
            confidence = %result.confidence,
            matches = matches.len(),
            "address resolved"
        );
        Ok(result)
    }

    /// Extended registry fields for one service point.
    pub async fn details(&self, service_point_id: &str) -> ResolveResult<ServicePointDetails> {
        self.retry
            .run("service_point_details", || {
                with_timeout(self.timeout, self.registry.details(service_point_id))
            })
            .await
    }

    async fn search(&self, normalized: &str, zip: ZipCode) -> ResolveResult<Vec<AddressMatch>> {
        let key = cache_key(normalized, zip);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let matches = self
            .retry
            .run("address_search", || {
                with_timeout(self.timeout, self.registry.search(normalized, zip))
            })
            .await?;
        self.cache.set(&key, matches.clone(), self.ttl);
        Ok(matches)
    }
}

pub(crate) fn cache_key(address: &str, zip: ZipCode) -> String {
    format!("{}_{}", address.to_lowercase(), zip)
}

/// Pick a utility from registry matches.
///
/// One distinct utility gives `High`. Several give `Medium`, with utilities
/// ranked by match count and ties kept in first-seen order. `None` when
/// there are no matches.
pub fn rank_matches(zip: ZipCode, matches: &[AddressMatch]) -> Option<ResolutionResult> {
    let mut groups: Vec<(Tdsp, usize, &AddressMatch)> = Vec::new();
    for m in matches {
        match groups.iter_mut().find(|(t, _, _)| *t == m.utility) {
            Some(group) => group.1 += 1,
            None => groups.push((m.utility, 1, m)),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let (primary, _, representative) = *groups.first()?;
    let service_point = ServicePoint {
        id: representative.service_point_id.clone(),
        address: normalize_address(&representative.address),
    };

    if groups.len() == 1 {
        return Some(
            ResolutionResult::new(zip, primary, Method::AddressResolved, Confidence::High)
                .with_service_point(service_point),
        );
    }

    let total = matches.len();
    let alternatives = groups[1..]
        .iter()
        .map(|(tdsp, count, rep)| Alternative {
            utility: *tdsp,
            reason: format!(
                "{count} of {total} matching service points ({})",
                normalize_address(&rep.address)
            ),
            service_point_id: Some(rep.service_point_id.clone()),
        })
        .collect();

    Some(
        ResolutionResult::new(zip, primary, Method::AddressResolved, Confidence::Medium)
            .with_service_point(service_point)
            .with_alternatives(alternatives),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn premise(id: &str, address: &str, utility: Tdsp) -> AddressMatch {
        AddressMatch {
            service_point_id: id.to_string(),
            address: address.to_string(),
            city: "ADDISON".to_string(),
            state: "TX".to_string(),
            zip: "75001".to_string(),
            county: Some("DALLAS".to_string()),
            utility,
        }
    }

    /// Registry fake with scripted responses.
    pub(crate) struct FakeRegistry {
        pub matches: Vec<AddressMatch>,
        pub failures_before_success: usize,
        pub failure: Option<ResolveError>,
        pub delay: Duration,
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        pub(crate) fn returning(matches: Vec<AddressMatch>) -> Self {
            Self {
                matches,
                failures_before_success: 0,
                failure: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AddressRegistry for FakeRegistry {
        async fn search(&self, address: &str, _zip: ZipCode) -> ResolveResult<Vec<AddressMatch>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(address.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(err) = &self.failure
                && call < self.failures_before_success
            {
                return Err(err.clone());
            }
            Ok(self.matches.clone())
        }

        async fn details(&self, service_point_id: &str) -> ResolveResult<ServicePointDetails> {
            self.matches
                .iter()
                .find(|m| m.service_point_id == service_point_id)
                .map(|m| ServicePointDetails {
                    matched: m.clone(),
                    premise_type: Some("Residential".into()),
                    meter_type: None,
                    status: Some("Active".into()),
                })
                .ok_or_else(|| ResolveError::UnknownServicePoint(service_point_id.to_string()))
        }
    }

    fn resolver(registry: Arc<FakeRegistry>, config: &ResolverConfig) -> AddressResolver {
        AddressResolver::new(
            registry,
            Arc::new(MemoryCache::<Vec<AddressMatch>>::new()),
            config,
        )
    }

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    #[test]
    fn single_utility_is_high() {
        let matches = vec![
            premise("1", "1234 MAIN ST", Tdsp::Oncor),
            premise("2", "1234 MAIN ST UNIT B", Tdsp::Oncor),
        ];
        let r = rank_matches(zip("75001"), &matches).unwrap();
        assert_eq!(r.utility, Tdsp::Oncor);
        assert_eq!(r.confidence, Confidence::High);
        assert_eq!(r.method, Method::AddressResolved);
        assert_eq!(r.service_point.unwrap().id, "1");
        assert!(r.alternatives.is_empty());
    }

    #[test]
    fn most_frequent_utility_wins() {
        let matches = vec![
            premise("1", "1234 MAIN ST", Tdsp::Tnmp),
            premise("2", "1234 MAIN ST UNIT A", Tdsp::Oncor),
            premise("3", "1234 MAIN ST UNIT B", Tdsp::Oncor),
        ];
        let r = rank_matches(zip("75001"), &matches).unwrap();
        assert_eq!(r.utility, Tdsp::Oncor);
        assert_eq!(r.confidence, Confidence::Medium);
        assert_eq!(r.service_point.as_ref().unwrap().id, "2");
        assert_eq!(r.alternatives.len(), 1);
        assert_eq!(r.alternatives[0].utility, Tdsp::Tnmp);
        assert_eq!(r.alternatives[0].service_point_id.as_deref(), Some("1"));
        assert!(r.alternatives[0].reason.starts_with("1 of 3"));
        assert!(r.alternatives[0].reason.ends_with("(1234 MAIN Street)"));
    }

    #[test]
    fn matched_address_is_normalized() {
        let matches = vec![premise("1", "1234  MAIN ST APT 2", Tdsp::Oncor)];
        let r = rank_matches(zip("75001"), &matches).unwrap();
        let sp = r.service_point.unwrap();
        assert_eq!(sp.id, "1");
        assert_eq!(sp.address, "1234 MAIN Street Unit 2");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let matches = vec![
            premise("1", "A", Tdsp::Tnmp),
            premise("2", "B", Tdsp::CenterPoint),
            premise("3", "C", Tdsp::CenterPoint),
            premise("4", "D", Tdsp::Tnmp),
            premise("5", "E", Tdsp::Oncor),
        ];
        let r = rank_matches(zip("77573"), &matches).unwrap();
        assert_eq!(r.utility, Tdsp::Tnmp);
        let alts: Vec<Tdsp> = r.alternatives.iter().map(|a| a.utility).collect();
        assert_eq!(alts, vec![Tdsp::CenterPoint, Tdsp::Oncor]);
    }

    #[test]
    fn no_matches_is_none() {
        assert!(rank_matches(zip("75001"), &[]).is_none());
    }

    #[tokio::test]
    async fn two_utilities_scenario() {
        let registry = Arc::new(FakeRegistry::returning(vec![
            premise("1", "1234 MAIN ST", Tdsp::Oncor),
            premise("2", "1234 MAIN ST", Tdsp::Tnmp),
            premise("3", "1234 MAIN ST APT 2", Tdsp::Oncor),
        ]));
        let resolver = resolver(registry.clone(), &ResolverConfig::immediate());
        let r = resolver
            .resolve_address("1234 Main St", "75001", None)
            .await
            .unwrap();
        assert_eq!(r.confidence, Confidence::Medium);
        assert_eq!(r.utility, Tdsp::Oncor);
        let alts: Vec<Tdsp> = r.alternatives.iter().map(|a| a.utility).collect();
        assert_eq!(alts, vec![Tdsp::Tnmp]);
        assert_eq!(registry.queries.lock().as_slice(), ["1234 Main Street"]);
    }

    #[tokio::test]
    async fn zero_matches_is_no_match_found() {
        let registry = Arc::new(FakeRegistry::returning(Vec::new()));
        let resolver = resolver(registry, &ResolverConfig::immediate());
        let err = resolver
            .resolve_address("9 Nowhere Rd", "75001", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchFound { .. }));
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn second_call_served_from_cache() {
        let registry = Arc::new(FakeRegistry::returning(vec![premise(
            "1",
            "1234 MAIN ST",
            Tdsp::Oncor,
        )]));
        let resolver = resolver(registry.clone(), &ResolverConfig::immediate());
        let first = resolver.resolve_address("1234 Main St", "75001", None).await.unwrap();
        let second = resolver
            .resolve_address("1234 MAIN STREET", "75001", Some(1000))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn cache_miss_matches_cache_hit() {
        let matches = vec![
            premise("1", "1234 MAIN ST", Tdsp::Tnmp),
            premise("2", "1234 MAIN ST", Tdsp::Oncor),
        ];
        let cached = resolver(
            Arc::new(FakeRegistry::returning(matches.clone())),
            &ResolverConfig::immediate(),
        );
        let uncached = AddressResolver::new(
            Arc::new(FakeRegistry::returning(matches)),
            Arc::new(NoCache),
            &ResolverConfig::immediate(),
        );
        let a = cached.resolve_address("1234 Main St", "75001", None).await.unwrap();
        let b = cached.resolve_address("1234 Main St", "75001", None).await.unwrap();
        let c = uncached.resolve_address("1234 Main St", "75001", None).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let mut fake = FakeRegistry::returning(vec![premise("1", "1 ELM", Tdsp::Oncor)]);
        fake.failure = Some(ResolveError::Network {
            message: "503".into(),
            retryable: true,
        });
        fake.failures_before_success = 2;
        let registry = Arc::new(fake);
        let config = ResolverConfig {
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
                multiplier: 2,
                max_delay: Duration::ZERO,
            },
            ..ResolverConfig::immediate()
        };
        let r = resolver(registry.clone(), &config)
            .resolve_address("1 Elm St", "75001", None)
            .await
            .unwrap();
        assert_eq!(r.utility, Tdsp::Oncor);
        assert_eq!(registry.calls(), 3);
    }

    #[tokio::test]
    async fn hung_registry_times_out() {
        let mut fake = FakeRegistry::returning(vec![premise("1", "1 ELM", Tdsp::Oncor)]);
        fake.delay = Duration::from_secs(5);
        let config = ResolverConfig {
            address_timeout: Duration::from_millis(20),
            ..ResolverConfig::immediate()
        };
        let err = resolver(Arc::new(fake), &config)
            .resolve_address("1 Elm St", "75001", None)
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn malformed_zip_rejected_before_lookup() {
        let registry = Arc::new(FakeRegistry::returning(Vec::new()));
        let resolver = resolver(registry.clone(), &ResolverConfig::immediate());
        let err = resolver.resolve_address("1 Elm St", "7500", None).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidZipFormat(_)));
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn details_passthrough() {
        let registry = Arc::new(FakeRegistry::returning(vec![premise("42", "1 ELM", Tdsp::Tnmp)]));
        let resolver = resolver(registry, &ResolverConfig::immediate());
        let d = resolver.details("42").await.unwrap();
        assert_eq!(d.matched.utility, Tdsp::Tnmp);
        assert_eq!(d.status.as_deref(), Some("Active"));
        assert!(matches!(
            resolver.details("43").await,
            Err(ResolveError::UnknownServicePoint(_))
        ));
    }

    #[test]
    fn cache_key_is_lowercase_address_and_zip() {
        assert_eq!(cache_key("1234 Main Street", zip("75001")), "1234 main street_75001");
    }
}
