//! Static stage: boundary registry, then direct assignments.

use crate::error::ResolveResult;
use crate::reference::{BoundaryPrecision, BoundaryZip, ReferenceData};
use crate::result::{Alternative, Confidence, Method, ResolutionResult};
use crate::zip::ZipCode;

/// Resolve a ZIP from the static tables.
///
/// Fails on malformed or non-Texas input. `Ok(None)` means neither the
/// boundary registry nor the direct map knows the ZIP.
pub fn resolve_zip(data: &ReferenceData, zip: &str) -> ResolveResult<Option<ResolutionResult>> {
    let zip = ZipCode::parse(zip)?;
    Ok(resolve_static(data, zip))
}

/// [`resolve_zip`] for an already validated ZIP.
pub fn resolve_static(data: &ReferenceData, zip: ZipCode) -> Option<ResolutionResult> {
    if let Some(boundary) = data.boundary(zip) {
        let confidence = if boundary.requires_address {
            Confidence::Medium
        } else {
            Confidence::High
        };
        return Some(
            ResolutionResult::new(zip, boundary.primary, Method::BoundaryPrimary, confidence)
                .with_alternatives(boundary_alternatives(boundary)),
        );
    }

    data.assignment(zip)
        .map(|tdsp| ResolutionResult::new(zip, tdsp, Method::DirectMapping, Confidence::High))
}

fn boundary_alternatives(boundary: &BoundaryZip) -> Vec<Alternative> {
    let precision = match boundary.precision {
        BoundaryPrecision::StreetLevel => "street address",
        BoundaryPrecision::BlockLevel => "block",
        BoundaryPrecision::Zip4Level => "ZIP+4",
    };
    boundary
        .alternatives
        .iter()
        .map(|tdsp| {
            let mut reason = format!("Serves part of {}; confirm by {precision}", boundary.zip);
            if !boundary.notes.is_empty() {
                reason.push_str(". ");
                reason.push_str(&boundary.notes);
            }
            Alternative::new(*tdsp, reason)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::utility::Tdsp;

    #[test]
    fn dallas_direct_mapping() {
        let data = ReferenceData::builtin();
        let r = resolve_zip(&data, "75205").unwrap().unwrap();
        assert_eq!(r.utility, Tdsp::Oncor);
        assert_eq!(r.method, Method::DirectMapping);
        assert_eq!(r.confidence, Confidence::High);
        assert!(r.alternatives.is_empty());
    }

    #[test]
    fn every_direct_zip_is_high() {
        let data = ReferenceData::builtin();
        for (zip, tdsp) in data.assignments() {
            if data.boundary(zip).is_some() {
                continue;
            }
            let r = resolve_static(&data, zip).unwrap();
            assert_eq!(r.method, Method::DirectMapping, "{zip}");
            assert_eq!(r.confidence, Confidence::High, "{zip}");
            assert_eq!(r.utility, tdsp, "{zip}");
        }
    }

    #[test]
    fn boundary_confidence_follows_requires_address() {
        let data = ReferenceData::builtin();
        for b in data.boundaries() {
            let r = resolve_static(&data, b.zip).unwrap();
            assert_eq!(r.method, Method::BoundaryPrimary);
            assert_eq!(r.utility, b.primary);
            if b.requires_address {
                assert_eq!(r.confidence, Confidence::Medium, "{}", b.zip);
            } else {
                assert_eq!(r.confidence, Confidence::High, "{}", b.zip);
            }
            let alts: Vec<Tdsp> = r.alternatives.iter().map(|a| a.utility).collect();
            assert_eq!(alts, b.alternatives);
            assert!(!alts.contains(&r.utility));
        }
    }

    #[test]
    fn league_city_alternative_reason() {
        let data = ReferenceData::builtin();
        let r = resolve_zip(&data, "77573").unwrap().unwrap();
        assert_eq!(r.alternatives.len(), 1);
        assert_eq!(r.alternatives[0].utility, Tdsp::CenterPoint);
        assert!(r.alternatives[0].reason.contains("street address"));
    }

    #[test]
    fn unknown_texas_zip_is_none() {
        let data = ReferenceData::builtin();
        assert_eq!(resolve_zip(&data, "75000").unwrap(), None);
        assert_eq!(resolve_zip(&data, "79999").unwrap(), None);
    }

    #[test]
    fn input_errors_propagate() {
        let data = ReferenceData::builtin();
        assert!(matches!(
            resolve_zip(&data, "7520"),
            Err(ResolveError::InvalidZipFormat(_))
        ));
        assert!(matches!(
            resolve_zip(&data, "80000"),
            Err(ResolveError::NonTexasZip(_))
        ));
    }

    #[test]
    fn repeated_calls_agree() {
        let data = ReferenceData::builtin();
        assert_eq!(
            resolve_zip(&data, "77546").unwrap(),
            resolve_zip(&data, "77546").unwrap()
        );
    }
}
