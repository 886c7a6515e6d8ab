//! Dynamic multi-utility probing for ZIPs with no static data.
//!
//! Asks the pricing service for plans under each TDSP in turn. A non-empty
//! plan list means that TDSP serves the ZIP; more than one serving TDSP is
//! empirical evidence of a boundary ZIP. "Most plans wins" is a plausibility
//! heuristic, not a verified boundary rule.

use std::sync::Arc;
use std::time::Duration;

use powerzip_client::{PlanPricing, RetryPolicy, with_timeout};
use powerzip_core::{
    Alternative, Confidence, Method, ResolutionResult, ResolveResult, Tdsp, ZipCode,
};
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;

pub struct Prober {
    pricing: Arc<dyn PlanPricing>,
    retry: RetryPolicy,
    timeout: Duration,
    delay: Duration,
}

impl Prober {
    pub fn new(pricing: Arc<dyn PlanPricing>, config: &ResolverConfig) -> Self {
        Self {
            pricing,
            retry: config.retry.clone(),
            timeout: config.probe_timeout,
            delay: config.probe_delay,
        }
    }

    /// Probe every TDSP for `zip`, one at a time, in priority order.
    ///
    /// `Ok(None)` when no TDSP returns plans. Fails only when every probe
    /// failed, with the last failure.
    pub async fn probe_zip(&self, zip: ZipCode, usage_kwh: u32) -> ResolveResult<Option<ResolutionResult>> {
        let mut serving: Vec<(Tdsp, usize)> = Vec::new();
        let mut last_error = None;
        let mut failures = 0;

        for (i, tdsp) in Tdsp::ALL.into_iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let result = self
                .retry
                .run("probe_plans", || {
                    with_timeout(self.timeout, self.pricing.fetch_plans(zip, tdsp, usage_kwh))
                })
                .await;
            match result {
                Ok(plans) if plans.is_empty() => debug!(zip = %zip, utility = %tdsp, "no plans"),
                Ok(plans) => {
                    debug!(zip = %zip, utility = %tdsp, plans = plans.len(), "utility serves zip");
                    serving.push((tdsp, plans.len()));
                }
                Err(e) => {
                    warn!(zip = %zip, utility = %tdsp, error = %e, "probe failed");
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        if failures == Tdsp::ALL.len()
            && let Some(e) = last_error
        {
            return Err(e);
        }

        Ok(summarize(zip, serving, failures))
    }
}

/// A lone serving utility is `High` only when every other TDSP answered with
/// no plans; a failed probe could have hidden a second candidate.
fn summarize(
    zip: ZipCode,
    mut serving: Vec<(Tdsp, usize)>,
    failures: usize,
) -> Option<ResolutionResult> {
    // Stable: equal plan counts stay in priority order.
    serving.sort_by(|a, b| b.1.cmp(&a.1));
    let (primary, plans) = *serving.first()?;

    if serving.len() == 1 {
        let confidence = if failures == 0 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        info!(zip = %zip, utility = %primary, plans, failures, %confidence, "probe found single utility");
        return Some(ResolutionResult::new(
            zip,
            primary,
            Method::DynamicProbe,
            confidence,
        ));
    }

    info!(zip = %zip, utility = %primary, candidates = serving.len(), "probe found boundary zip");
    let alternatives = serving[1..]
        .iter()
        .map(|(tdsp, count)| {
            Alternative::new(*tdsp, format!("{count} plans offered here (primary has {plans})"))
        })
        .collect();
    Some(
        ResolutionResult::new(zip, primary, Method::DynamicProbe, Confidence::Medium)
            .with_alternatives(alternatives),
    )
}
