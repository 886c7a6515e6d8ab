//! Last-resort range heuristic.
//!
//! Maps numeric ZIP ranges to the dominant utility of the region. Pure and
//! always available, but never better than [`Confidence::Low`].

use crate::data::{PATTERN_RANGES, PatternRange};
use crate::result::{Confidence, Method, ResolutionResult};
use crate::zip::ZipCode;

/// Narrowest range containing the ZIP. Ties go to the earlier table entry.
pub fn match_pattern(zip: ZipCode) -> Option<&'static PatternRange> {
    let value = zip.value();
    let mut best: Option<&'static PatternRange> = None;
    for range in PATTERN_RANGES {
        if !(range.start..=range.end).contains(&value) {
            continue;
        }
        let narrower = best.is_none_or(|b| range.end - range.start < b.end - b.start);
        if narrower {
            best = Some(range);
        }
    }
    best
}

/// Resolve a ZIP from range patterns alone.
///
/// `None` means no range matched and the caller should report non-coverage.
pub fn resolve_by_pattern(zip: ZipCode) -> Option<ResolutionResult> {
    let range = match_pattern(zip)?;
    Some(ResolutionResult::new(
        zip,
        range.utility,
        Method::PatternMatch,
        Confidence::Low,
    ))
}

pub fn pattern_ranges() -> &'static [PatternRange] {
    PATTERN_RANGES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::{Tdsp, Zone};

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    #[test]
    fn houston_range() {
        let r = resolve_by_pattern(zip("77099")).unwrap();
        assert_eq!(r.utility, Tdsp::CenterPoint);
        assert_eq!(r.method, Method::PatternMatch);
        assert_eq!(r.confidence, Confidence::Low);
        assert!(r.alternatives.is_empty());
    }

    #[test]
    fn narrower_range_wins() {
        assert_eq!(match_pattern(zip("77591")).unwrap().utility, Tdsp::Tnmp);
        assert_eq!(match_pattern(zip("77589")).unwrap().utility, Tdsp::CenterPoint);
        assert_eq!(match_pattern(zip("79760")).unwrap().utility, Tdsp::Tnmp);
        assert_eq!(match_pattern(zip("79780")).unwrap().utility, Tdsp::Oncor);
    }

    #[test]
    fn valley_zone() {
        assert_eq!(match_pattern(zip("78577")).unwrap().zone, Zone::Valley);
    }

    #[test]
    fn gaps_return_none() {
        assert!(resolve_by_pattern(zip("75500")).is_none());
        assert!(resolve_by_pattern(zip("79101")).is_none());
        assert!(resolve_by_pattern(zip("76301")).is_none());
    }

    #[test]
    fn never_above_low() {
        for value in (75000..=79999).step_by(7) {
            let z = ZipCode::parse(&value.to_string()).unwrap();
            if let Some(r) = resolve_by_pattern(z) {
                assert_eq!(r.confidence, Confidence::Low, "{z}");
            }
        }
    }

    #[test]
    fn ranges_are_well_formed() {
        for r in pattern_ranges() {
            assert!(r.start <= r.end, "{}", r.region);
            assert!(r.start >= 75000 && r.end <= 79999, "{}", r.region);
        }
    }
}
