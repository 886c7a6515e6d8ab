//! Human-readable cards for resolution answers.

use std::fmt::Write;

use powerzip_core::{
    MunicipalService, NotFound, NotFoundReason, Outcome, ReferenceData, Remediation,
    ResolutionResult, ServicePointDetails, SourceConflict, TableIssue,
};
use serde::Serialize;

/// Answer for a ZIP outside Texas, shaped like the other not-found outcomes.
#[derive(Debug, Serialize)]
pub struct OutsideTexas {
    outcome: &'static str,
    zip: String,
    reason: NotFoundReason,
    remediation: Remediation,
    message: &'static str,
}

impl OutsideTexas {
    pub fn new(zip: &str) -> Self {
        let reason = NotFoundReason::OutsideTexas;
        Self {
            outcome: "not_found",
            zip: zip.to_string(),
            reason,
            remediation: reason.remediation(),
            message: reason.message(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Audit {
    pub issues: Vec<TableIssue>,
    pub conflicts: Vec<SourceConflict>,
}

impl Audit {
    pub fn of(data: &ReferenceData) -> Self {
        Self {
            issues: data.validate(),
            conflicts: data.conflicts(),
        }
    }
}

// ── Public API ──

pub fn print_outcome(outcome: &Outcome) {
    print!("{}", render_outcome(outcome));
}

pub fn print_result(result: &ResolutionResult) {
    print!("{}", render_result(result));
}

pub fn print_lookup(zip: &str, result: Option<&ResolutionResult>) {
    match result {
        Some(r) => print_result(r),
        None => println!("=== {zip} ===\nNo utility found.\n"),
    }
}

pub fn print_outside_texas(answer: &OutsideTexas) {
    println!("=== {} ===", answer.zip);
    println!("{}", answer.message);
    println!("  {:<14} {}", "next step", remediation_label(answer.remediation));
    println!();
}

pub fn print_details(details: &ServicePointDetails) {
    print!("{}", render_details(details));
}

pub fn print_audit(audit: &Audit) {
    print!("{}", render_audit(audit));
}

// ── Rendering ──

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Resolved(r) => render_result(r),
        Outcome::Municipal(m) => render_municipal(m),
        Outcome::NotFound(n) => render_not_found(n),
    }
}

fn render_result(r: &ResolutionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", r.zip);
    let _ = writeln!(out, "{}", r.utility.name());
    let _ = writeln!(out);
    row(&mut out, "utility", &r.utility.to_string());
    row(&mut out, "duns", r.utility.id());
    row(&mut out, "zone", &r.utility.zone().to_string());
    row(&mut out, "method", &r.method.to_string());
    row(&mut out, "confidence", &r.confidence.to_string());
    if r.cached {
        row(&mut out, "cached", "yes");
    }
    if let Some(sp) = &r.service_point {
        row(&mut out, "service point", &format!("{} ({})", sp.id, sp.address));
    }
    if !r.alternatives.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Alternatives");
        for alt in &r.alternatives {
            let _ = writeln!(out, "  - {}: {}", alt.utility, alt.reason);
        }
    }
    if r.address_would_help() {
        let _ = writeln!(out);
        let _ = writeln!(out, "This ZIP spans more than one utility. Add --address to confirm.");
    }
    let _ = writeln!(out);
    out
}

fn render_municipal(m: &MunicipalService) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", m.zip);
    let _ = writeln!(out, "{} (municipal, no retail choice)", m.utility);
    let _ = writeln!(out);
    row(&mut out, "city", &m.city);
    let _ = writeln!(out);
    out
}

fn render_not_found(n: &NotFound) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", n.zip);
    let _ = writeln!(out, "{}", n.message);
    let _ = writeln!(out);
    row(&mut out, "next step", remediation_label(n.remediation));
    if !n.attempted.is_empty() {
        let tried: Vec<String> = n.attempted.iter().map(ToString::to_string).collect();
        row(&mut out, "tried", &tried.join(", "));
    }
    for failure in &n.failures {
        row(&mut out, "failure", failure);
    }
    let _ = writeln!(out);
    out
}

fn render_details(d: &ServicePointDetails) -> String {
    let m = &d.matched;
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", m.service_point_id);
    let _ = writeln!(out, "{}, {}, {} {}", m.address, m.city, m.state, m.zip);
    let _ = writeln!(out);
    row(&mut out, "utility", &m.utility.to_string());
    for (label, value) in [
        ("county", &m.county),
        ("premise type", &d.premise_type),
        ("meter type", &d.meter_type),
        ("status", &d.status),
    ] {
        if let Some(v) = value {
            row(&mut out, label, v);
        }
    }
    let _ = writeln!(out);
    out
}

fn render_audit(audit: &Audit) -> String {
    let mut out = String::new();
    if audit.issues.is_empty() {
        let _ = writeln!(out, "Reference tables: no invariant violations");
    } else {
        let _ = writeln!(out, "Invariant violations ({})", audit.issues.len());
        for issue in &audit.issues {
            let _ = writeln!(out, "  - {issue}");
        }
    }
    if !audit.conflicts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Source conflicts ({})", audit.conflicts.len());
        for c in &audit.conflicts {
            let _ = writeln!(
                out,
                "  - {}: tables say {}, {} range says {}",
                c.zip, c.mapped, c.region, c.pattern
            );
        }
    }
    out
}

// ── Helpers ──

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<14} {value}");
}

fn remediation_label(remediation: Remediation) -> &'static str {
    match remediation {
        Remediation::Redirect => "redirect (outside Texas)",
        Remediation::RetryWithAddress => "retry with a street address",
        Remediation::ContactSupport => "contact support",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerzip_core::{Alternative, Confidence, Method, StrategyKind, Tdsp, ZipCode};

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    #[test]
    fn result_card_lists_alternatives() {
        let r = ResolutionResult::new(
            zip("77573"),
            Tdsp::Tnmp,
            Method::BoundaryPrimary,
            Confidence::Medium,
        )
        .with_alternatives(vec![Alternative::new(
            Tdsp::CenterPoint,
            "Serves part of 77573",
        )]);
        let card = render_result(&r);
        assert!(card.starts_with("=== 77573 ===\n"));
        assert!(card.contains("boundary_primary"));
        assert!(card.contains("  - CenterPoint: Serves part of 77573"));
        assert!(card.contains("Add --address"));
    }

    #[test]
    fn high_confidence_card_has_no_hint() {
        let r = ResolutionResult::new(
            zip("75205"),
            Tdsp::Oncor,
            Method::DirectMapping,
            Confidence::High,
        );
        let card = render_result(&r);
        assert!(card.contains("high"));
        assert!(!card.contains("Alternatives"));
        assert!(!card.contains("--address"));
    }

    #[test]
    fn not_found_card_names_next_step() {
        let n = NotFound::new(
            zip("76301"),
            NotFoundReason::NoData,
            vec![StrategyKind::Static, StrategyKind::Pattern],
            Vec::new(),
        );
        let card = render_outcome(&Outcome::NotFound(n));
        assert!(card.contains("contact support"));
        assert!(card.contains("static, pattern"));
    }

    #[test]
    fn outside_texas_serializes_as_not_found() {
        let json = serde_json::to_value(OutsideTexas::new("80202")).unwrap();
        assert_eq!(json["outcome"], "not_found");
        assert_eq!(json["reason"], "outside_texas");
        assert_eq!(json["remediation"], "redirect");
    }

    #[test]
    fn builtin_audit_reports_conflicts() {
        let audit = Audit::of(&ReferenceData::builtin());
        assert!(audit.issues.is_empty());
        let text = render_audit(&audit);
        assert!(text.contains("no invariant violations"));
        assert!(text.contains("77573"));
    }
}
