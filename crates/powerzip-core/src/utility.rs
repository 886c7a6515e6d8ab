//! The regulated distribution utilities (TDSPs) of the Texas retail market.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Geographic zone a utility or ZIP range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    North,
    Coast,
    Central,
    South,
    West,
    Valley,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Zone::North => "North",
            Zone::Coast => "Coast",
            Zone::Central => "Central",
            Zone::South => "South",
            Zone::West => "West",
            Zone::Valley => "Valley",
        };
        f.write_str(s)
    }
}

/// Immutable reference record for one TDSP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtilityRecord {
    /// DUNS-style identifier used by pricing and registry services.
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub zone: Zone,
    /// Lower tier wins ties and sets probe order.
    pub tier: u8,
}

/// One of the five deregulated-market TDSPs.
///
/// Declaration order is probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tdsp {
    Oncor,
    CenterPoint,
    AepCentral,
    AepNorth,
    Tnmp,
}

const ONCOR: UtilityRecord = UtilityRecord {
    id: "1039940674000",
    name: "Oncor Electric Delivery",
    short_name: "Oncor",
    zone: Zone::North,
    tier: 1,
};

const CENTERPOINT: UtilityRecord = UtilityRecord {
    id: "957877905",
    name: "CenterPoint Energy Houston Electric",
    short_name: "CenterPoint",
    zone: Zone::Coast,
    tier: 2,
};

const AEP_CENTRAL: UtilityRecord = UtilityRecord {
    id: "007924772",
    name: "AEP Texas Central Company",
    short_name: "AEP Texas Central",
    zone: Zone::South,
    tier: 3,
};

const AEP_NORTH: UtilityRecord = UtilityRecord {
    id: "007923311",
    name: "AEP Texas North Company",
    short_name: "AEP Texas North",
    zone: Zone::West,
    tier: 4,
};

const TNMP: UtilityRecord = UtilityRecord {
    id: "007929441",
    name: "Texas-New Mexico Power Company",
    short_name: "TNMP",
    zone: Zone::Central,
    tier: 5,
};

impl Tdsp {
    /// All utilities in probe priority order.
    pub const ALL: [Tdsp; 5] = [
        Tdsp::Oncor,
        Tdsp::CenterPoint,
        Tdsp::AepCentral,
        Tdsp::AepNorth,
        Tdsp::Tnmp,
    ];

    pub fn record(self) -> &'static UtilityRecord {
        match self {
            Tdsp::Oncor => &ONCOR,
            Tdsp::CenterPoint => &CENTERPOINT,
            Tdsp::AepCentral => &AEP_CENTRAL,
            Tdsp::AepNorth => &AEP_NORTH,
            Tdsp::Tnmp => &TNMP,
        }
    }

    pub fn id(self) -> &'static str {
        self.record().id
    }

    pub fn name(self) -> &'static str {
        self.record().name
    }

    pub fn zone(self) -> Zone {
        self.record().zone
    }

    /// Look up a utility by its DUNS identifier.
    ///
    /// Registries sometimes pad Oncor's id with a `-` or drop leading zeros,
    /// so comparison ignores non-digits and leading zeros.
    pub fn from_id(id: &str) -> Option<Tdsp> {
        let wanted = canonical_id(id);
        if wanted.is_empty() {
            return None;
        }
        Tdsp::ALL
            .into_iter()
            .find(|t| canonical_id(t.id()) == wanted)
    }
}

fn canonical_id(id: &str) -> String {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').to_string()
}

impl fmt::Display for Tdsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record().short_name)
    }
}

impl Serialize for Tdsp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for a in Tdsp::ALL {
            for b in Tdsp::ALL {
                if a != b {
                    assert_ne!(a.id(), b.id());
                }
            }
        }
    }

    #[test]
    fn tiers_follow_probe_order() {
        let tiers: Vec<u8> = Tdsp::ALL.iter().map(|t| t.record().tier).collect();
        assert_eq!(tiers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_id_exact() {
        assert_eq!(Tdsp::from_id("957877905"), Some(Tdsp::CenterPoint));
        assert_eq!(Tdsp::from_id("1039940674000"), Some(Tdsp::Oncor));
    }

    #[test]
    fn from_id_tolerates_leading_zeros_and_separators() {
        assert_eq!(Tdsp::from_id("7924772"), Some(Tdsp::AepCentral));
        assert_eq!(Tdsp::from_id("007-923-311"), Some(Tdsp::AepNorth));
    }

    #[test]
    fn from_id_unknown() {
        assert_eq!(Tdsp::from_id("123"), None);
        assert_eq!(Tdsp::from_id(""), None);
        assert_eq!(Tdsp::from_id("000"), None);
    }

    #[test]
    fn serializes_as_record() {
        let json = serde_json::to_value(Tdsp::Tnmp).unwrap();
        assert_eq!(json["id"], "007929441");
        assert_eq!(json["zone"], "central");
    }
}
