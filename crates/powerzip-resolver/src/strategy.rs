//! The ordered strategy chain.
//!
//! Each strategy inspects the request and whatever provisional answer an
//! earlier strategy left behind, then resolves, defers, or passes. The
//! analyzer walks the list in order; reordering the chain means reordering
//! the list.

use std::sync::Arc;

use async_trait::async_trait;
use powerzip_core::{
    Method, ReferenceData, ResolutionResult, ResolveError, StrategyKind, ZipCode,
    resolve_by_pattern, resolve_static,
};

use crate::address::AddressResolver;
use crate::prober::Prober;
use crate::request::AnalyzeRequest;

/// Inputs visible to a strategy.
pub struct StrategyContext<'a> {
    pub request: &'a AnalyzeRequest,
    pub zip: ZipCode,
    /// Usable answer from an earlier strategy that a later one may refine.
    pub provisional: Option<&'a ResolutionResult>,
}

/// What one strategy produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Final answer; later strategies are not consulted.
    Resolved(ResolutionResult),
    /// Usable answer that a later strategy may supersede.
    Provisional(ResolutionResult),
    /// Ran and found nothing.
    Miss,
    /// Ran and failed; the chain falls through.
    Failed(ResolveError),
    /// Did not apply to this request.
    Skipped,
}

#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether this strategy waits on the network.
    fn suspends(&self) -> bool {
        false
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> Attempt;
}

/// Boundary registry, then direct assignments.
pub struct StaticStrategy {
    data: Arc<ReferenceData>,
}

impl StaticStrategy {
    pub fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Strategy for StaticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Static
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> Attempt {
        let Some(result) = resolve_static(&self.data, ctx.zip) else {
            return Attempt::Miss;
        };
        let refinable = result.method == Method::BoundaryPrimary
            && self
                .data
                .boundary(ctx.zip)
                .is_some_and(|b| b.requires_address)
            && ctx.request.address().is_some();
        if refinable {
            Attempt::Provisional(result)
        } else {
            Attempt::Resolved(result)
        }
    }
}

/// Address lookup for boundary ZIPs that need one.
pub struct AddressStrategy {
    resolver: Arc<AddressResolver>,
}

impl AddressStrategy {
    pub fn new(resolver: Arc<AddressResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Strategy for AddressStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Address
    }

    fn suspends(&self) -> bool {
        true
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> Attempt {
        let (Some(address), Some(_)) = (ctx.request.address(), ctx.provisional) else {
            return Attempt::Skipped;
        };
        match self
            .resolver
            .resolve_address(address, &ctx.zip.to_string(), Some(ctx.request.usage_kwh()))
            .await
        {
            Ok(result) => Attempt::Resolved(result),
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// Range heuristic, only when nothing better exists.
pub struct PatternStrategy;

#[async_trait]
impl Strategy for PatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pattern
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> Attempt {
        if ctx.provisional.is_some() {
            return Attempt::Skipped;
        }
        match resolve_by_pattern(ctx.zip) {
            Some(result) => Attempt::Resolved(result),
            None => Attempt::Miss,
        }
    }
}

/// Pricing-service probe for ZIPs absent from every static table.
pub struct ProbeStrategy {
    prober: Arc<Prober>,
    data: Arc<ReferenceData>,
}

impl ProbeStrategy {
    pub fn new(prober: Arc<Prober>, data: Arc<ReferenceData>) -> Self {
        Self { prober, data }
    }
}

#[async_trait]
impl Strategy for ProbeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Probe
    }

    fn suspends(&self) -> bool {
        true
    }

    async fn attempt(&self, ctx: &StrategyContext<'_>) -> Attempt {
        if ctx.provisional.is_some() || self.data.is_known(ctx.zip) {
            return Attempt::Skipped;
        }
        match self.prober.probe_zip(ctx.zip, ctx.request.usage_kwh()).await {
            Ok(Some(result)) => Attempt::Resolved(result),
            Ok(None) => Attempt::Miss,
            Err(e) => Attempt::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::tests::{FakeRegistry, premise};
    use crate::cache::NoCache;
    use crate::config::ResolverConfig;
    use crate::prober::tests::FakePricing;
    use powerzip_core::{Confidence, Tdsp};

    fn data() -> Arc<ReferenceData> {
        Arc::new(ReferenceData::builtin())
    }

    fn ctx<'a>(
        request: &'a AnalyzeRequest,
        provisional: Option<&'a ResolutionResult>,
    ) -> StrategyContext<'a> {
        StrategyContext {
            request,
            zip: ZipCode::parse(request.zip()).unwrap(),
            provisional,
        }
    }

    #[tokio::test]
    async fn static_defers_boundary_when_address_given() {
        let request = AnalyzeRequest::new("77573")
            .with_address("100 Main St")
            .unwrap();
        let attempt = StaticStrategy::new(data()).attempt(&ctx(&request, None)).await;
        assert!(matches!(attempt, Attempt::Provisional(ref r) if r.utility == Tdsp::Tnmp));
    }

    #[tokio::test]
    async fn static_resolves_boundary_without_address() {
        let request = AnalyzeRequest::new("77573");
        let attempt = StaticStrategy::new(data()).attempt(&ctx(&request, None)).await;
        assert!(matches!(attempt, Attempt::Resolved(ref r) if r.confidence == Confidence::Medium));
    }

    #[tokio::test]
    async fn static_resolves_high_boundary_even_with_address() {
        let request = AnalyzeRequest::new("76904")
            .with_address("100 Main St")
            .unwrap();
        let attempt = StaticStrategy::new(data()).attempt(&ctx(&request, None)).await;
        assert!(matches!(attempt, Attempt::Resolved(ref r) if r.confidence == Confidence::High));
    }

    #[tokio::test]
    async fn static_misses_unknown_zip() {
        let request = AnalyzeRequest::new("76301");
        let attempt = StaticStrategy::new(data()).attempt(&ctx(&request, None)).await;
        assert_eq!(attempt, Attempt::Miss);
    }

    #[tokio::test]
    async fn address_skips_without_provisional() {
        let registry = Arc::new(FakeRegistry::returning(vec![premise("1", "A", Tdsp::Oncor)]));
        let resolver = AddressResolver::new(registry.clone(), Arc::new(NoCache), &ResolverConfig::immediate());
        let strategy = AddressStrategy::new(Arc::new(resolver));
        let request = AnalyzeRequest::new("75205")
            .with_address("100 Main St")
            .unwrap();
        assert_eq!(strategy.attempt(&ctx(&request, None)).await, Attempt::Skipped);
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn pattern_skips_when_provisional_exists() {
        let request = AnalyzeRequest::new("77573");
        let provisional = resolve_static(&data(), ZipCode::parse("77573").unwrap()).unwrap();
        let attempt = PatternStrategy.attempt(&ctx(&request, Some(&provisional))).await;
        assert_eq!(attempt, Attempt::Skipped);
    }

    #[tokio::test]
    async fn probe_skips_known_zips() {
        let pricing = Arc::new(FakePricing::with_plans(&[(Tdsp::Oncor, 3)]));
        let prober = Arc::new(Prober::new(pricing.clone(), &ResolverConfig::immediate()));
        let strategy = ProbeStrategy::new(prober, data());
        let request = AnalyzeRequest::new("77099");
        assert_eq!(strategy.attempt(&ctx(&request, None)).await, Attempt::Skipped);
        assert_eq!(pricing.calls(), 0);
    }

    #[tokio::test]
    async fn probe_runs_for_unknown_zip() {
        let pricing = Arc::new(FakePricing::with_plans(&[(Tdsp::Oncor, 3)]));
        let prober = Arc::new(Prober::new(pricing, &ResolverConfig::immediate()));
        let strategy = ProbeStrategy::new(prober, data());
        let request = AnalyzeRequest::new("76301");
        assert!(matches!(
            strategy.attempt(&ctx(&request, None)).await,
            Attempt::Resolved(ref r) if r.method == Method::DynamicProbe
        ));
    }
}
