//! Core types and reference data for Texas ZIP-to-utility resolution.

pub mod address;
mod data;
pub mod direct;
pub mod error;
pub mod pattern;
pub mod reference;
pub mod result;
pub mod utility;
pub mod zip;

pub use address::normalize_address;
pub use data::PatternRange;
pub use direct::{resolve_static, resolve_zip};
pub use error::{ResolveError, ResolveResult};
pub use pattern::{match_pattern, resolve_by_pattern};
pub use reference::{
    BoundaryPrecision, BoundaryZip, MunicipalArea, ReferenceData, ReferenceError, SourceConflict,
    TableIssue,
};
pub use result::{
    AddressMatch, Alternative, Confidence, Method, MunicipalService, NotFound, NotFoundReason,
    Outcome, Remediation, ResolutionResult, ServicePoint, ServicePointDetails, StrategyKind,
};
pub use utility::{Tdsp, UtilityRecord, Zone};
pub use zip::ZipCode;
