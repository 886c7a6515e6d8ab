//! Read-only reference data indexed for lookup.
//!
//! Built once at startup from the tables in [`crate::data`], optionally with
//! a JSON overlay of extra boundary ZIPs, and shared behind an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::data::{
    BOUNDARY_ZIPS, DEREGULATED_PREFIXES, MUNICIPAL_AREAS, PatternRange, ZIP_ASSIGNMENTS,
};
use crate::pattern::match_pattern;
use crate::utility::Tdsp;
use crate::zip::ZipCode;

/// How precise an address must be to separate the territories in a boundary ZIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryPrecision {
    StreetLevel,
    BlockLevel,
    Zip4Level,
}

/// A ZIP known to span more than one utility territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryZip {
    pub zip: ZipCode,
    pub primary: Tdsp,
    pub alternatives: Vec<Tdsp>,
    pub requires_address: bool,
    pub precision: BoundaryPrecision,
    #[serde(default)]
    pub notes: String,
}

/// A city-owned utility area with no retail choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalArea {
    pub utility: String,
    pub city: String,
    pub ranges: Vec<(u32, u32)>,
}

impl MunicipalArea {
    pub fn contains(&self, zip: ZipCode) -> bool {
        self.ranges
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&zip.value()))
    }
}

/// An invariant violation found in the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum TableIssue {
    PrimaryInAlternatives { zip: ZipCode, utility: Tdsp },
    MissingAlternatives { zip: ZipCode },
    DuplicateAlternative { zip: ZipCode, utility: Tdsp },
    MunicipalOverlap { zip: ZipCode, utility: String },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::PrimaryInAlternatives { zip, utility } => {
                write!(f, "{zip}: primary {utility} also listed as alternative")
            }
            TableIssue::MissingAlternatives { zip } => {
                write!(f, "{zip}: requires an address but lists no alternatives")
            }
            TableIssue::DuplicateAlternative { zip, utility } => {
                write!(f, "{zip}: alternative {utility} listed twice")
            }
            TableIssue::MunicipalOverlap { zip, utility } => {
                write!(f, "{zip}: assigned to a TDSP but inside {utility} territory")
            }
        }
    }
}

/// Two static sources disagreeing about the same ZIP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceConflict {
    pub zip: ZipCode,
    /// Utility from the direct or boundary table.
    pub mapped: Tdsp,
    /// Utility from the range pattern.
    pub pattern: Tdsp,
    pub region: &'static str,
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("boundary overlay is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("boundary overlay violates table invariants: {}", join_issues(.0))]
    Invalid(Vec<TableIssue>),
}

fn join_issues(issues: &[TableIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// All static lookup tables.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    assignments: HashMap<ZipCode, Tdsp>,
    boundaries: HashMap<ZipCode, BoundaryZip>,
    municipal: Vec<MunicipalArea>,
}

impl ReferenceData {
    /// Index the built-in tables.
    pub fn builtin() -> Self {
        let mut assignments = HashMap::new();
        for (tdsp, zips) in ZIP_ASSIGNMENTS {
            for zip in *zips {
                match ZipCode::parse(zip) {
                    Ok(z) => {
                        assignments.insert(z, *tdsp);
                    }
                    Err(e) => warn!(zip, error = %e, "skipping malformed built-in assignment"),
                }
            }
        }

        let mut boundaries = HashMap::new();
        for seed in BOUNDARY_ZIPS {
            match ZipCode::parse(seed.zip) {
                Ok(zip) => {
                    boundaries.insert(
                        zip,
                        BoundaryZip {
                            zip,
                            primary: seed.primary,
                            alternatives: seed.alternatives.to_vec(),
                            requires_address: seed.requires_address,
                            precision: seed.precision,
                            notes: seed.notes.to_string(),
                        },
                    );
                }
                Err(e) => warn!(zip = seed.zip, error = %e, "skipping malformed built-in boundary"),
            }
        }

        let municipal = MUNICIPAL_AREAS
            .iter()
            .map(|seed| MunicipalArea {
                utility: seed.utility.to_string(),
                city: seed.city.to_string(),
                ranges: seed.ranges.to_vec(),
            })
            .collect();

        Self {
            assignments,
            boundaries,
            municipal,
        }
    }

    /// Merge boundary entries from a JSON array over the current registry.
    ///
    /// Entries replace built-in entries for the same ZIP. The merged tables
    /// must still pass [`validate`](Self::validate).
    pub fn with_boundary_overlay(mut self, json: &str) -> Result<Self, ReferenceError> {
        let entries: Vec<BoundaryZip> = serde_json::from_str(json)?;
        let count = entries.len();
        for entry in entries {
            self.boundaries.insert(entry.zip, entry);
        }
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(ReferenceError::Invalid(issues));
        }
        info!(count, total = self.boundaries.len(), "applied boundary overlay");
        Ok(self)
    }

    /// Unambiguous single-utility assignment.
    pub fn assignment(&self, zip: ZipCode) -> Option<Tdsp> {
        self.assignments.get(&zip).copied()
    }

    pub fn boundary(&self, zip: ZipCode) -> Option<&BoundaryZip> {
        self.boundaries.get(&zip)
    }

    pub fn municipal(&self, zip: ZipCode) -> Option<&MunicipalArea> {
        self.municipal.iter().find(|m| m.contains(zip))
    }

    /// Whether any static table, including pattern ranges, knows this ZIP.
    pub fn is_known(&self, zip: ZipCode) -> bool {
        self.assignments.contains_key(&zip)
            || self.boundaries.contains_key(&zip)
            || match_pattern(zip).is_some()
    }

    /// Whether the ZIP's prefix lies in territory with retail choice.
    pub fn in_deregulated_area(&self, zip: ZipCode) -> bool {
        let prefix = zip.prefix();
        DEREGULATED_PREFIXES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&prefix))
    }

    pub fn assignments(&self) -> impl Iterator<Item = (ZipCode, Tdsp)> + '_ {
        self.assignments.iter().map(|(z, t)| (*z, *t))
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &BoundaryZip> {
        self.boundaries.values()
    }

    pub fn municipal_areas(&self) -> &[MunicipalArea] {
        &self.municipal
    }

    /// Check table invariants. Empty means consistent.
    pub fn validate(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();

        let mut boundaries: Vec<&BoundaryZip> = self.boundaries.values().collect();
        boundaries.sort_by_key(|b| b.zip);
        for b in boundaries {
            if b.alternatives.contains(&b.primary) {
                issues.push(TableIssue::PrimaryInAlternatives {
                    zip: b.zip,
                    utility: b.primary,
                });
            }
            if b.requires_address && b.alternatives.is_empty() {
                issues.push(TableIssue::MissingAlternatives { zip: b.zip });
            }
            for (i, alt) in b.alternatives.iter().enumerate() {
                if b.alternatives[..i].contains(alt) {
                    issues.push(TableIssue::DuplicateAlternative {
                        zip: b.zip,
                        utility: *alt,
                    });
                }
            }
        }

        let mut mapped: Vec<ZipCode> = self
            .assignments
            .keys()
            .chain(self.boundaries.keys())
            .copied()
            .collect();
        mapped.sort();
        mapped.dedup();
        for zip in mapped {
            if let Some(area) = self.municipal(zip) {
                issues.push(TableIssue::MunicipalOverlap {
                    zip,
                    utility: area.utility.clone(),
                });
            }
        }

        issues
    }

    /// ZIPs where the direct or boundary table and the pattern ranges disagree.
    ///
    /// Resolution order settles these at runtime; this is for auditing the data.
    pub fn conflicts(&self) -> Vec<SourceConflict> {
        let mut mapped: BTreeMap<ZipCode, Tdsp> = self.assignments.iter().map(|(z, t)| (*z, *t)).collect();
        for b in self.boundaries.values() {
            mapped.insert(b.zip, b.primary);
        }

        mapped
            .into_iter()
            .filter_map(|(zip, tdsp)| {
                let range: &PatternRange = match_pattern(zip)?;
                (range.utility != tdsp).then_some(SourceConflict {
                    zip,
                    mapped: tdsp,
                    pattern: range.utility,
                    region: range.region,
                })
            })
            .collect()
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}
