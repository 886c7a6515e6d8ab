//! Built-in reference tables.
//!
//! Assignments list ZIPs served by a single TDSP. Boundary entries list ZIPs
//! split between territories. Municipal and pattern tables are range based.

use crate::reference::BoundaryPrecision;
use crate::utility::{Tdsp, Zone};

pub(crate) const ZIP_ASSIGNMENTS: &[(Tdsp, &[&str])] = &[
    (
        Tdsp::Oncor,
        &[
            // Dallas
            "75201", "75202", "75203", "75204", "75205", "75206", "75207", "75208", "75209",
            "75210", "75211", "75212", "75214", "75215", "75216", "75217", "75218", "75219",
            "75220", "75223", "75224", "75225", "75226", "75227", "75228", "75229", "75230",
            "75231", "75232", "75233", "75234", "75235", "75236", "75237", "75238", "75240",
            "75241", "75243", "75244", "75246", "75247", "75248", "75249", "75251", "75252",
            "75254",
            // Plano, Irving, Richardson, Frisco, McKinney, Mesquite
            "75023", "75024", "75025", "75074", "75075", "75093", "75094", "75038", "75039",
            "75060", "75061", "75062", "75063", "75080", "75081", "75082", "75033", "75034",
            "75035", "75069", "75070", "75071", "75149", "75150",
            // Fort Worth, Arlington
            "76102", "76104", "76105", "76107", "76109", "76110", "76111", "76112", "76116",
            "76117", "76118", "76119", "76120", "76123", "76132", "76133", "76134", "76137",
            "76010", "76011", "76012", "76013", "76014", "76015", "76016", "76017", "76018",
            // Waco, Tyler, Killeen
            "76701", "76704", "76705", "76706", "76707", "76708", "76710", "76711", "75701",
            "75702", "75703", "76541", "76542", "76543",
            // Midland, Odessa
            "79701", "79703", "79705", "79707", "79761", "79762", "79763", "79764",
        ],
    ),
    (
        Tdsp::CenterPoint,
        &[
            // Houston
            "77002", "77003", "77004", "77005", "77006", "77007", "77008", "77009", "77010",
            "77011", "77012", "77013", "77014", "77015", "77016", "77017", "77018", "77019",
            "77020", "77021", "77022", "77023", "77024", "77025", "77026", "77027", "77028",
            "77029", "77030", "77031", "77032", "77033", "77034", "77035", "77036", "77037",
            "77038", "77039", "77040", "77041", "77042", "77043", "77044", "77045", "77046",
            "77047", "77048", "77049", "77050", "77051", "77053", "77054", "77055", "77056",
            "77057", "77058", "77059", "77060", "77061", "77062", "77063", "77064", "77065",
            "77066", "77067", "77068", "77069", "77070", "77071", "77072", "77073", "77074",
            "77075", "77076", "77077", "77078", "77079", "77080", "77081", "77082", "77083",
            "77084", "77085", "77086", "77087", "77088", "77089", "77090", "77091", "77092",
            "77093", "77094", "77095", "77096", "77098", "77099",
            // Sugar Land, Pasadena, Baytown, Katy, The Woodlands, Pearland
            "77478", "77479", "77502", "77503", "77504", "77505", "77506", "77520", "77521",
            "77449", "77450", "77380", "77381", "77382", "77584",
        ],
    ),
    (
        Tdsp::AepCentral,
        &[
            // Corpus Christi
            "78401", "78404", "78405", "78406", "78407", "78408", "78409", "78410", "78411",
            "78412", "78413", "78414", "78415", "78416", "78418",
            // Laredo, Rio Grande Valley, Victoria
            "78040", "78041", "78043", "78045", "78046", "78501", "78503", "78504", "78539",
            "78550", "78552", "78596", "77901", "77904",
        ],
    ),
    (
        Tdsp::AepNorth,
        &[
            // Abilene, San Angelo, West Texas
            "79601", "79602", "79603", "79605", "79606", "76901", "76903", "76905", "76384",
            "79556", "79830", "79735",
        ],
    ),
    (
        Tdsp::Tnmp,
        &[
            // Texas City, La Marque, Alvin, Pecos, Monahans, Glen Rose
            "77590", "77591", "77568", "77511", "79772", "79756", "76043",
        ],
    ),
];

pub(crate) struct BoundarySeed {
    pub zip: &'static str,
    pub primary: Tdsp,
    pub alternatives: &'static [Tdsp],
    pub requires_address: bool,
    pub precision: BoundaryPrecision,
    pub notes: &'static str,
}

pub(crate) const BOUNDARY_ZIPS: &[BoundarySeed] = &[
    BoundarySeed {
        zip: "75001",
        primary: Tdsp::Oncor,
        alternatives: &[Tdsp::Tnmp],
        requires_address: true,
        precision: BoundaryPrecision::StreetLevel,
        notes: "Addison. TNMP serves pockets along the western edge.",
    },
    BoundarySeed {
        zip: "75067",
        primary: Tdsp::Oncor,
        alternatives: &[Tdsp::Tnmp],
        requires_address: true,
        precision: BoundaryPrecision::StreetLevel,
        notes: "Lewisville. TNMP territory interleaves with Oncor east of I-35E.",
    },
    BoundarySeed {
        zip: "77573",
        primary: Tdsp::Tnmp,
        alternatives: &[Tdsp::CenterPoint],
        requires_address: true,
        precision: BoundaryPrecision::StreetLevel,
        notes: "League City. Northern subdivisions are CenterPoint.",
    },
    BoundarySeed {
        zip: "77546",
        primary: Tdsp::CenterPoint,
        alternatives: &[Tdsp::Tnmp],
        requires_address: true,
        precision: BoundaryPrecision::BlockLevel,
        notes: "Friendswood. Galveston County side is TNMP.",
    },
    BoundarySeed {
        zip: "77539",
        primary: Tdsp::Tnmp,
        alternatives: &[Tdsp::CenterPoint],
        requires_address: true,
        precision: BoundaryPrecision::BlockLevel,
        notes: "Dickinson. CenterPoint along the FM 517 corridor.",
    },
    BoundarySeed {
        zip: "76645",
        primary: Tdsp::Oncor,
        alternatives: &[Tdsp::Tnmp],
        requires_address: true,
        precision: BoundaryPrecision::BlockLevel,
        notes: "Hillsboro. Rural TNMP feeders outside city limits.",
    },
    BoundarySeed {
        zip: "76904",
        primary: Tdsp::AepNorth,
        alternatives: &[Tdsp::Oncor],
        requires_address: false,
        precision: BoundaryPrecision::Zip4Level,
        notes: "San Angelo south. Oncor serves a handful of rural premises.",
    },
    BoundarySeed {
        zip: "79512",
        primary: Tdsp::AepNorth,
        alternatives: &[Tdsp::Oncor],
        requires_address: false,
        precision: BoundaryPrecision::Zip4Level,
        notes: "Colorado City. Oncor limited to oilfield service points.",
    },
];

pub(crate) struct MunicipalSeed {
    pub utility: &'static str,
    pub city: &'static str,
    pub ranges: &'static [(u32, u32)],
}

pub(crate) const MUNICIPAL_AREAS: &[MunicipalSeed] = &[
    MunicipalSeed {
        utility: "Austin Energy",
        city: "Austin",
        ranges: &[(78701, 78759)],
    },
    MunicipalSeed {
        utility: "CPS Energy",
        city: "San Antonio",
        ranges: &[(78201, 78266)],
    },
    MunicipalSeed {
        utility: "Bryan Texas Utilities",
        city: "Bryan",
        ranges: &[(77801, 77808)],
    },
    MunicipalSeed {
        utility: "College Station Utilities",
        city: "College Station",
        ranges: &[(77840, 77845)],
    },
    MunicipalSeed {
        utility: "Denton Municipal Electric",
        city: "Denton",
        ranges: &[(76201, 76210)],
    },
    MunicipalSeed {
        utility: "Garland Power & Light",
        city: "Garland",
        ranges: &[(75040, 75049)],
    },
    MunicipalSeed {
        utility: "New Braunfels Utilities",
        city: "New Braunfels",
        ranges: &[(78130, 78135)],
    },
    MunicipalSeed {
        utility: "Georgetown Utility Systems",
        city: "Georgetown",
        ranges: &[(78626, 78628)],
    },
    MunicipalSeed {
        utility: "San Marcos Electric Utility",
        city: "San Marcos",
        ranges: &[(78666, 78667)],
    },
    MunicipalSeed {
        utility: "Brownsville Public Utilities Board",
        city: "Brownsville",
        ranges: &[(78520, 78526)],
    },
];

/// Numeric ZIP range with its dominant city and utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRange {
    pub start: u32,
    pub end: u32,
    pub region: &'static str,
    pub utility: Tdsp,
    pub zone: Zone,
}

const fn range(start: u32, end: u32, region: &'static str, utility: Tdsp, zone: Zone) -> PatternRange {
    PatternRange {
        start,
        end,
        region,
        utility,
        zone,
    }
}

pub(crate) const PATTERN_RANGES: &[PatternRange] = &[
    range(75000, 75099, "Dallas suburbs", Tdsp::Oncor, Zone::North),
    range(75100, 75199, "South Dallas County / Ellis County", Tdsp::Oncor, Zone::North),
    range(75200, 75399, "Dallas", Tdsp::Oncor, Zone::North),
    range(75400, 75499, "Northeast Texas", Tdsp::Oncor, Zone::North),
    range(75600, 75799, "East Texas (Tyler/Longview)", Tdsp::Oncor, Zone::North),
    range(76000, 76199, "Fort Worth / Arlington", Tdsp::Oncor, Zone::North),
    range(76200, 76299, "Denton County", Tdsp::Oncor, Zone::North),
    range(76400, 76499, "Stephenville / Brownwood", Tdsp::Oncor, Zone::Central),
    range(76500, 76599, "Temple / Killeen", Tdsp::Oncor, Zone::Central),
    range(76600, 76799, "Waco", Tdsp::Oncor, Zone::Central),
    range(76800, 76899, "Brady / Hill Country west", Tdsp::AepNorth, Zone::West),
    range(76900, 76999, "San Angelo", Tdsp::AepNorth, Zone::West),
    range(77000, 77299, "Houston", Tdsp::CenterPoint, Zone::Coast),
    range(77300, 77499, "Greater Houston", Tdsp::CenterPoint, Zone::Coast),
    range(77500, 77599, "Bay Area / Galveston", Tdsp::CenterPoint, Zone::Coast),
    range(77590, 77592, "Texas City", Tdsp::Tnmp, Zone::Coast),
    range(77900, 77999, "Victoria", Tdsp::AepCentral, Zone::South),
    range(78000, 78099, "Laredo", Tdsp::AepCentral, Zone::South),
    range(78300, 78499, "Corpus Christi / Coastal Bend", Tdsp::AepCentral, Zone::South),
    range(78500, 78599, "Rio Grande Valley", Tdsp::AepCentral, Zone::Valley),
    range(79500, 79699, "Abilene", Tdsp::AepNorth, Zone::West),
    range(79700, 79799, "Midland / Odessa", Tdsp::Oncor, Zone::West),
    range(79750, 79779, "Pecos / Monahans", Tdsp::Tnmp, Zone::West),
    range(79800, 79899, "Alpine / Fort Stockton", Tdsp::AepNorth, Zone::West),
];

/// Three-digit ZIP prefixes with deregulated retail choice.
pub(crate) const DEREGULATED_PREFIXES: &[(u32, u32)] = &[
    (750, 754),
    (756, 769),
    (770, 779),
    (780, 785),
    (795, 798),
];
