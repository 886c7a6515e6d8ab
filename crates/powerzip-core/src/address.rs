//! Street address normalization.
//!
//! Registries match on expanded street suffixes, so `1234 Main St.` and
//! `1234 Main Street` must reach them as the same string. The rules:
//!
//! - whitespace collapses to single spaces
//! - street suffixes (`St`, `Ave`, `Rd`, ...) expand to their full word
//! - unit designators (`Apt`, `Ste`, `Suite`, `#`, ...) collapse to `Unit`
//! - directionals (`N`, `SW`, ...) expand unless they follow a unit designator
//!
//! Every replacement maps to a word that maps to itself, which keeps
//! [`normalize_address`] idempotent.

const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("ST", "Street"),
    ("STR", "Street"),
    ("STREET", "Street"),
    ("AVE", "Avenue"),
    ("AV", "Avenue"),
    ("AVENUE", "Avenue"),
    ("RD", "Road"),
    ("ROAD", "Road"),
    ("DR", "Drive"),
    ("DRIVE", "Drive"),
    ("BLVD", "Boulevard"),
    ("BOULEVARD", "Boulevard"),
    ("LN", "Lane"),
    ("LANE", "Lane"),
    ("CT", "Court"),
    ("COURT", "Court"),
    ("CIR", "Circle"),
    ("CIRCLE", "Circle"),
    ("PKWY", "Parkway"),
    ("PARKWAY", "Parkway"),
    ("HWY", "Highway"),
    ("HIGHWAY", "Highway"),
    ("FWY", "Freeway"),
    ("FREEWAY", "Freeway"),
    ("PL", "Place"),
    ("PLACE", "Place"),
    ("TRL", "Trail"),
    ("TRAIL", "Trail"),
    ("TER", "Terrace"),
    ("TERRACE", "Terrace"),
    ("CV", "Cove"),
    ("COVE", "Cove"),
    ("EXPY", "Expressway"),
    ("EXPRESSWAY", "Expressway"),
];

const UNIT_DESIGNATORS: &[&str] = &["APT", "APARTMENT", "UNIT", "STE", "SUITE", "BLDG", "RM", "ROOM"];

const DIRECTIONALS: &[(&str, &str)] = &[
    ("N", "North"),
    ("NORTH", "North"),
    ("S", "South"),
    ("SOUTH", "South"),
    ("E", "East"),
    ("EAST", "East"),
    ("W", "West"),
    ("WEST", "West"),
    ("NE", "Northeast"),
    ("NORTHEAST", "Northeast"),
    ("NW", "Northwest"),
    ("NORTHWEST", "Northwest"),
    ("SE", "Southeast"),
    ("SOUTHEAST", "Southeast"),
    ("SW", "Southwest"),
    ("SOUTHWEST", "Southwest"),
];

const UNIT: &str = "Unit";

/// Normalize a free-text street address for registry lookup.
pub fn normalize_address(address: &str) -> String {
    let mut out: Vec<String> = Vec::new();

    for raw in address.split_whitespace() {
        let (word, trailing) = split_trailing_punctuation(raw);

        let word = if word.starts_with('#') {
            push_unit(&mut out);
            word.trim_start_matches('#')
        } else {
            word
        };
        if word.is_empty() {
            if !trailing.is_empty() {
                append_to_last(&mut out, trailing);
            }
            continue;
        }

        let key = word.trim_end_matches('.').to_ascii_uppercase();
        let after_unit = out.last().is_some_and(|w| w == UNIT);

        if UNIT_DESIGNATORS.contains(&key.as_str()) {
            push_unit(&mut out);
            if !trailing.is_empty() {
                append_to_last(&mut out, trailing);
            }
            continue;
        }

        let replacement = lookup(STREET_SUFFIXES, &key).or_else(|| {
            if after_unit {
                None
            } else {
                lookup(DIRECTIONALS, &key)
            }
        });

        let mut token = match replacement {
            Some(full) => full.to_string(),
            None => word.to_string(),
        };
        token.push_str(trailing);
        out.push(token);
    }

    out.join(" ")
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(abbr, _)| *abbr == key)
        .map(|(_, full)| *full)
}

fn push_unit(out: &mut Vec<String>) {
    if out.last().is_none_or(|w| w != UNIT) {
        out.push(UNIT.to_string());
    }
}

fn append_to_last(out: &mut [String], trailing: &str) {
    if let Some(last) = out.last_mut() {
        last.push_str(trailing);
    }
}

/// Split `"St.,"` into `("St.", ",")`.
fn split_trailing_punctuation(raw: &str) -> (&str, &str) {
    let end = raw.trim_end_matches([',', ';']).len();
    raw.split_at(end)
}
