//! The orchestrator: validates input, screens municipal ZIPs, and walks the
//! strategy chain until one strategy answers.

use std::sync::Arc;

use powerzip_client::{AddressRegistry, PlanPricing};
use powerzip_core::{
    AddressMatch, MunicipalService, NotFound, NotFoundReason, Outcome, ReferenceData,
    ResolutionResult, ResolveError, ResolveResult, ZipCode, resolve_zip,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::address::AddressResolver;
use crate::cache::{Cache, Clock, MemoryCache, SystemClock};
use crate::config::ResolverConfig;
use crate::prober::Prober;
use crate::request::AnalyzeRequest;
use crate::strategy::{
    AddressStrategy, Attempt, PatternStrategy, ProbeStrategy, StaticStrategy, Strategy,
    StrategyContext,
};

/// The standard chain: static tables, address, pattern, probe.
///
/// Address and probe stages are left out when their collaborator is absent.
pub fn default_chain(
    data: &Arc<ReferenceData>,
    address: Option<Arc<AddressResolver>>,
    prober: Option<Arc<Prober>>,
) -> Vec<Box<dyn Strategy>> {
    let mut chain: Vec<Box<dyn Strategy>> = vec![Box::new(StaticStrategy::new(data.clone()))];
    if let Some(resolver) = address {
        chain.push(Box::new(AddressStrategy::new(resolver)));
    }
    chain.push(Box::new(PatternStrategy));
    if let Some(prober) = prober {
        chain.push(Box::new(ProbeStrategy::new(prober, data.clone())));
    }
    chain
}

pub struct AnalyzerBuilder {
    data: Arc<ReferenceData>,
    config: ResolverConfig,
    clock: Arc<dyn Clock>,
    registry: Option<Arc<dyn AddressRegistry>>,
    pricing: Option<Arc<dyn PlanPricing>>,
    zip_cache: Option<Arc<dyn Cache<ResolutionResult>>>,
    address_cache: Option<Arc<dyn Cache<Vec<AddressMatch>>>>,
    strategies: Option<Vec<Box<dyn Strategy>>>,
}

impl AnalyzerBuilder {
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock for the default in-memory caches.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn address_registry(mut self, registry: Arc<dyn AddressRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn plan_pricing(mut self, pricing: Arc<dyn PlanPricing>) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn zip_cache(mut self, cache: Arc<dyn Cache<ResolutionResult>>) -> Self {
        self.zip_cache = Some(cache);
        self
    }

    pub fn address_cache(mut self, cache: Arc<dyn Cache<Vec<AddressMatch>>>) -> Self {
        self.address_cache = Some(cache);
        self
    }

    /// Replace the default chain.
    pub fn strategies(mut self, strategies: Vec<Box<dyn Strategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn build(self) -> Analyzer {
        let clock = self.clock;
        let zip_cache: Arc<dyn Cache<ResolutionResult>> = match self.zip_cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::<ResolutionResult>::with_clock(clock.clone())),
        };
        let address_cache: Arc<dyn Cache<Vec<AddressMatch>>> = match self.address_cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::<Vec<AddressMatch>>::with_clock(clock)),
        };

        let address = self
            .registry
            .map(|registry| Arc::new(AddressResolver::new(registry, address_cache, &self.config)));
        let prober = self
            .pricing
            .filter(|_| self.config.probe_enabled)
            .map(|pricing| Arc::new(Prober::new(pricing, &self.config)));

        let strategies = match self.strategies {
            Some(strategies) => strategies,
            None => default_chain(&self.data, address.clone(), prober.clone()),
        };

        Analyzer {
            data: self.data,
            strategies,
            zip_cache,
            config: self.config,
            address,
            prober,
        }
    }
}

/// Resolves a ZIP (and optional address) to the utility that serves it.
pub struct Analyzer {
    data: Arc<ReferenceData>,
    strategies: Vec<Box<dyn Strategy>>,
    zip_cache: Arc<dyn Cache<ResolutionResult>>,
    config: ResolverConfig,
    address: Option<Arc<AddressResolver>>,
    prober: Option<Arc<Prober>>,
}

impl Analyzer {
    pub fn builder(data: Arc<ReferenceData>) -> AnalyzerBuilder {
        AnalyzerBuilder {
            data,
            config: ResolverConfig::default(),
            clock: Arc::new(SystemClock),
            registry: None,
            pricing: None,
            zip_cache: None,
            address_cache: None,
            strategies: None,
        }
    }

    /// Resolve a request.
    ///
    /// Errors only on a malformed or non-Texas ZIP. Every other case is an
    /// [`Outcome`]: resolved, municipal, or not found with diagnostics.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> ResolveResult<Outcome> {
        let zip = ZipCode::parse(request.zip())?;

        if let Some(area) = self.data.municipal(zip) {
            info!(zip = %zip, utility = %area.utility, "municipal utility, no retail choice");
            return Ok(Outcome::Municipal(MunicipalService {
                zip,
                utility: area.utility.clone(),
                city: area.city.clone(),
            }));
        }

        let cache_key = zip.to_string();
        let cacheable = request.address().is_none();
        if cacheable && let Some(mut hit) = self.zip_cache.get(&cache_key) {
            debug!(zip = %zip, "zip analysis cache hit");
            hit.cached = true;
            return Ok(Outcome::Resolved(finish(hit, request)));
        }

        let started = Instant::now();
        let mut provisional: Option<ResolutionResult> = None;
        let mut attempted = Vec::new();
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            let ctx = StrategyContext {
                request,
                zip,
                provisional: provisional.as_ref(),
            };
            let attempt = run_strategy(strategy.as_ref(), &ctx, request, started).await;

            match attempt {
                Attempt::Skipped => debug!(zip = %zip, strategy = %kind, "skipped"),
                Attempt::Miss => {
                    debug!(zip = %zip, strategy = %kind, "no answer");
                    attempted.push(kind);
                }
                Attempt::Failed(e) => {
                    warn!(zip = %zip, strategy = %kind, error = %e, "strategy failed, falling through");
                    attempted.push(kind);
                    failures.push(format!("{kind}: {e}"));
                }
                Attempt::Provisional(result) => {
                    debug!(zip = %zip, strategy = %kind, utility = %result.utility, "provisional answer");
                    attempted.push(kind);
                    provisional = Some(result);
                }
                Attempt::Resolved(result) => {
                    attempted.push(kind);
                    info!(
                        zip = %zip,
                        utility = %result.utility,
                        method = %result.method,
                        confidence = %result.confidence,
                        "resolved"
                    );
                    if cacheable {
                        self.zip_cache
                            .set(&cache_key, result.clone(), self.config.zip_cache_ttl);
                    }
                    return Ok(Outcome::Resolved(finish(result, request)));
                }
            }
        }

        if let Some(result) = provisional {
            info!(zip = %zip, utility = %result.utility, "falling back to boundary primary");
            return Ok(Outcome::Resolved(finish(result, request)));
        }

        let reason = if self.data.in_deregulated_area(zip) {
            NotFoundReason::NoData
        } else {
            NotFoundReason::OutsideCoverage
        };
        info!(zip = %zip, ?reason, ?attempted, "no strategy resolved zip");
        Ok(Outcome::NotFound(NotFound::new(zip, reason, attempted, failures)))
    }

    /// Static stage only.
    pub fn resolve_zip(&self, zip: &str) -> ResolveResult<Option<ResolutionResult>> {
        resolve_zip(&self.data, zip)
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn address_resolver(&self) -> Option<&AddressResolver> {
        self.address.as_deref()
    }

    pub fn prober(&self) -> Option<&Prober> {
        self.prober.as_deref()
    }

    pub fn clear_cache(&self) {
        self.zip_cache.clear();
    }
}

async fn run_strategy(
    strategy: &dyn Strategy,
    ctx: &StrategyContext<'_>,
    request: &AnalyzeRequest,
    started: Instant,
) -> Attempt {
    let Some(deadline) = request.deadline().filter(|_| strategy.suspends()) else {
        return strategy.attempt(ctx).await;
    };
    let remaining = deadline.saturating_sub(started.elapsed());
    // Timeout polls the strategy once first, so inapplicable strategies still skip.
    match tokio::time::timeout(remaining, strategy.attempt(ctx)).await {
        Ok(attempt) => attempt,
        Err(_) => Attempt::Failed(ResolveError::Timeout(deadline)),
    }
}

fn finish(mut result: ResolutionResult, request: &AnalyzeRequest) -> ResolutionResult {
    if !request.wants_alternatives() {
        result.alternatives.clear();
    }
    result
}
