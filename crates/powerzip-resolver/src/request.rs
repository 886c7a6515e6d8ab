use std::ops::RangeInclusive;
use std::time::Duration;

use powerzip_core::{ResolveError, ResolveResult};

pub const DEFAULT_USAGE_KWH: u32 = 1000;
pub const USAGE_RANGE_KWH: RangeInclusive<u32> = 100..=5000;
pub const MIN_ADDRESS_LEN: usize = 5;

/// Inbound parameters for [`Analyzer::analyze`](crate::Analyzer::analyze).
///
/// The ZIP is validated by the analyzer; address and usage are validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    zip: String,
    address: Option<String>,
    usage_kwh: u32,
    return_alternatives: bool,
    deadline: Option<Duration>,
}

impl AnalyzeRequest {
    pub fn new(zip: impl Into<String>) -> Self {
        Self {
            zip: zip.into(),
            address: None,
            usage_kwh: DEFAULT_USAGE_KWH,
            return_alternatives: true,
            deadline: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> ResolveResult<Self> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.chars().count() < MIN_ADDRESS_LEN {
            return Err(ResolveError::InvalidAddress(format!(
                "{address:?} is shorter than {MIN_ADDRESS_LEN} characters"
            )));
        }
        self.address = Some(trimmed.to_string());
        Ok(self)
    }

    pub fn with_usage(mut self, usage_kwh: u32) -> ResolveResult<Self> {
        if !USAGE_RANGE_KWH.contains(&usage_kwh) {
            return Err(ResolveError::InvalidUsage(usage_kwh));
        }
        self.usage_kwh = usage_kwh;
        Ok(self)
    }

    pub fn return_alternatives(mut self, yes: bool) -> Self {
        self.return_alternatives = yes;
        self
    }

    /// Overall budget for network-bound strategies.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn usage_kwh(&self) -> u32 {
        self.usage_kwh
    }

    pub fn wants_alternatives(&self) -> bool {
        self.return_alternatives
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
