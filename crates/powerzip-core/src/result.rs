//! Resolution outcomes returned to callers.

use std::fmt;

use serde::Serialize;

use crate::utility::Tdsp;
use crate::zip::ZipCode;

/// Coarse trust grade driven by which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    DirectMapping,
    BoundaryPrimary,
    AddressResolved,
    PatternMatch,
    DynamicProbe,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::DirectMapping => "direct_mapping",
            Method::BoundaryPrimary => "boundary_primary",
            Method::AddressResolved => "address_resolved",
            Method::PatternMatch => "pattern_match",
            Method::DynamicProbe => "dynamic_probe",
        })
    }
}

/// A secondary utility the caller may offer for disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub utility: Tdsp,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_point_id: Option<String>,
}

impl Alternative {
    pub fn new(utility: Tdsp, reason: impl Into<String>) -> Self {
        Self {
            utility,
            reason: reason.into(),
            service_point_id: None,
        }
    }
}

/// The specific premise an address lookup settled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePoint {
    pub id: String,
    pub address: String,
}

/// Answer to "which utility serves this location".
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub zip: ZipCode,
    pub utility: Tdsp,
    pub method: Method,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_point: Option<ServicePoint>,
    /// Served from a cache rather than computed. Not part of equality.
    pub cached: bool,
}

impl ResolutionResult {
    pub fn new(zip: ZipCode, utility: Tdsp, method: Method, confidence: Confidence) -> Self {
        Self {
            zip,
            utility,
            method,
            confidence,
            alternatives: Vec::new(),
            service_point: None,
            cached: false,
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<Alternative>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_service_point(mut self, service_point: ServicePoint) -> Self {
        self.service_point = Some(service_point);
        self
    }

    /// Whether the caller should ask for a street address to firm this up.
    pub fn address_would_help(&self) -> bool {
        self.method == Method::BoundaryPrimary && self.confidence < Confidence::High
    }
}

impl PartialEq for ResolutionResult {
    fn eq(&self, other: &Self) -> bool {
        self.zip == other.zip
            && self.utility == other.utility
            && self.method == other.method
            && self.confidence == other.confidence
            && self.alternatives == other.alternatives
            && self.service_point == other.service_point
    }
}

impl Eq for ResolutionResult {}

/// One premise returned by the address registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressMatch {
    /// Externally issued service-point identifier (ESIID).
    pub service_point_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub county: Option<String>,
    pub utility: Tdsp,
}

/// Extended registry fields for a single service point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePointDetails {
    #[serde(flatten)]
    pub matched: AddressMatch,
    pub premise_type: Option<String>,
    pub meter_type: Option<String>,
    pub status: Option<String>,
}

/// Names a strategy in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Static,
    Address,
    Pattern,
    Probe,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Static => "static",
            StrategyKind::Address => "address",
            StrategyKind::Pattern => "pattern",
            StrategyKind::Probe => "probe",
        })
    }
}

/// What the caller should do with a ZIP that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    Redirect,
    RetryWithAddress,
    ContactSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// Not a Texas ZIP at all.
    OutsideTexas,
    /// Texas ZIP outside the deregulated areas we know about.
    OutsideCoverage,
    /// Inside deregulated territory, but no table or probe had an answer.
    NoData,
}

impl NotFoundReason {
    pub fn remediation(self) -> Remediation {
        match self {
            NotFoundReason::OutsideTexas => Remediation::Redirect,
            NotFoundReason::OutsideCoverage => Remediation::RetryWithAddress,
            NotFoundReason::NoData => Remediation::ContactSupport,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            NotFoundReason::OutsideTexas => "This ZIP code is outside Texas.",
            NotFoundReason::OutsideCoverage => {
                "This Texas ZIP code is outside our known coverage. Try again with a street address."
            }
            NotFoundReason::NoData => {
                "This area has retail choice, but we have no utility data for it yet. Please contact support."
            }
        }
    }
}

/// A well-formed ZIP that no strategy could resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    pub zip: ZipCode,
    pub reason: NotFoundReason,
    pub remediation: Remediation,
    /// User-facing explanation matching `reason`.
    pub message: &'static str,
    pub attempted: Vec<StrategyKind>,
    /// Strategy failures, formatted, for support diagnostics.
    pub failures: Vec<String>,
}

impl NotFound {
    pub fn new(
        zip: ZipCode,
        reason: NotFoundReason,
        attempted: Vec<StrategyKind>,
        failures: Vec<String>,
    ) -> Self {
        Self {
            zip,
            reason,
            remediation: reason.remediation(),
            message: reason.message(),
            attempted,
            failures,
        }
    }
}

/// A ZIP served by a municipal utility with no retail choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalService {
    pub zip: ZipCode,
    pub utility: String,
    pub city: String,
}

/// Final answer from the orchestrator for a well-formed ZIP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Resolved(ResolutionResult),
    Municipal(MunicipalService),
    NotFound(NotFound),
}

impl Outcome {
    pub fn resolved(&self) -> Option<&ResolutionResult> {
        match self {
            Outcome::Resolved(r) => Some(r),
            _ => None,
        }
    }

    /// Only resolved outcomes may proceed to plan search.
    pub fn is_plan_search_eligible(&self) -> bool {
        matches!(self, Outcome::Resolved(_))
    }
}
