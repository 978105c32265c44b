// 🗺️ Reference Tables - Census regions, divisions, FIPS codes
// Immutable, process-wide lookups. Unknown keys yield "" instead of failing.

use std::collections::HashMap;
use std::sync::LazyLock;

// ============================================================================
// CENSUS REGION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Northeast,
    Midwest,
    South,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Northeast, Region::Midwest, Region::South, Region::West];

    /// Census Bureau name, as written to the dataset
    pub fn name(&self) -> &'static str {
        match self {
            Region::Northeast => "Northeast",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::West => "West",
        }
    }

    /// Census Bureau region number (1-4)
    pub fn number(&self) -> &'static str {
        match self {
            Region::Northeast => "1",
            Region::Midwest => "2",
            Region::South => "3",
            Region::West => "4",
        }
    }

    pub fn from_name(name: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|r| r.name() == name)
    }
}

// ============================================================================
// CENSUS DIVISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    NewEngland,
    MiddleAtlantic,
    EastNorthCentral,
    WestNorthCentral,
    SouthAtlantic,
    EastSouthCentral,
    WestSouthCentral,
    Mountain,
    Pacific,
}

impl Division {
    pub const ALL: [Division; 9] = [
        Division::NewEngland,
        Division::MiddleAtlantic,
        Division::EastNorthCentral,
        Division::WestNorthCentral,
        Division::SouthAtlantic,
        Division::EastSouthCentral,
        Division::WestSouthCentral,
        Division::Mountain,
        Division::Pacific,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Division::NewEngland => "New England",
            Division::MiddleAtlantic => "Middle Atlantic",
            Division::EastNorthCentral => "East North Central",
            Division::WestNorthCentral => "West North Central",
            Division::SouthAtlantic => "South Atlantic",
            Division::EastSouthCentral => "East South Central",
            Division::WestSouthCentral => "West South Central",
            Division::Mountain => "Mountain",
            Division::Pacific => "Pacific",
        }
    }

    /// Census Bureau division number (1-9)
    pub fn number(&self) -> &'static str {
        match self {
            Division::NewEngland => "1",
            Division::MiddleAtlantic => "2",
            Division::EastNorthCentral => "3",
            Division::WestNorthCentral => "4",
            Division::SouthAtlantic => "5",
            Division::EastSouthCentral => "6",
            Division::WestSouthCentral => "7",
            Division::Mountain => "8",
            Division::Pacific => "9",
        }
    }

    /// Every division belongs to exactly one region
    pub fn region(&self) -> Region {
        match self {
            Division::NewEngland | Division::MiddleAtlantic => Region::Northeast,
            Division::EastNorthCentral | Division::WestNorthCentral => Region::Midwest,
            Division::SouthAtlantic | Division::EastSouthCentral | Division::WestSouthCentral => {
                Region::South
            }
            Division::Mountain | Division::Pacific => Region::West,
        }
    }

    pub fn from_name(name: &str) -> Option<Division> {
        Division::ALL.into_iter().find(|d| d.name() == name)
    }
}

// ============================================================================
// STATE TABLE (50 states + DC)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub abbr: &'static str,
    pub name: &'static str,
    pub division: Division,
    pub fips: &'static str,
}

impl StateEntry {
    pub fn region(&self) -> Region {
        self.division.region()
    }
}

const fn entry(abbr: &'static str, name: &'static str, division: Division, fips: &'static str) -> StateEntry {
    StateEntry { abbr, name, division, fips }
}

use Division::*;

/// One row per state. Abbreviation, region/division and FIPS live in the
/// same row, so the tables cannot drift apart.
pub static STATES: [StateEntry; 51] = [
    // Northeast - New England
    entry("CT", "Connecticut", NewEngland, "09"),
    entry("ME", "Maine", NewEngland, "23"),
    entry("MA", "Massachusetts", NewEngland, "25"),
    entry("NH", "New Hampshire", NewEngland, "33"),
    entry("RI", "Rhode Island", NewEngland, "44"),
    entry("VT", "Vermont", NewEngland, "50"),
    // Northeast - Middle Atlantic
    entry("NJ", "New Jersey", MiddleAtlantic, "34"),
    entry("NY", "New York", MiddleAtlantic, "36"),
    entry("PA", "Pennsylvania", MiddleAtlantic, "42"),
    // Midwest - East North Central
    entry("IL", "Illinois", EastNorthCentral, "17"),
    entry("IN", "Indiana", EastNorthCentral, "18"),
    entry("MI", "Michigan", EastNorthCentral, "26"),
    entry("OH", "Ohio", EastNorthCentral, "39"),
    entry("WI", "Wisconsin", EastNorthCentral, "55"),
    // Midwest - West North Central
    entry("IA", "Iowa", WestNorthCentral, "19"),
    entry("KS", "Kansas", WestNorthCentral, "20"),
    entry("MN", "Minnesota", WestNorthCentral, "27"),
    entry("MO", "Missouri", WestNorthCentral, "29"),
    entry("NE", "Nebraska", WestNorthCentral, "31"),
    entry("ND", "North Dakota", WestNorthCentral, "38"),
    entry("SD", "South Dakota", WestNorthCentral, "46"),
    // South - South Atlantic
    entry("DE", "Delaware", SouthAtlantic, "10"),
    entry("FL", "Florida", SouthAtlantic, "12"),
    entry("GA", "Georgia", SouthAtlantic, "13"),
    entry("MD", "Maryland", SouthAtlantic, "24"),
    entry("NC", "North Carolina", SouthAtlantic, "37"),
    entry("SC", "South Carolina", SouthAtlantic, "45"),
    entry("VA", "Virginia", SouthAtlantic, "51"),
    entry("WV", "West Virginia", SouthAtlantic, "54"),
    entry("DC", "District of Columbia", SouthAtlantic, "11"),
    // South - East South Central
    entry("AL", "Alabama", EastSouthCentral, "01"),
    entry("KY", "Kentucky", EastSouthCentral, "21"),
    entry("MS", "Mississippi", EastSouthCentral, "28"),
    entry("TN", "Tennessee", EastSouthCentral, "47"),
    // South - West South Central
    entry("AR", "Arkansas", WestSouthCentral, "05"),
    entry("LA", "Louisiana", WestSouthCentral, "22"),
    entry("OK", "Oklahoma", WestSouthCentral, "40"),
    entry("TX", "Texas", WestSouthCentral, "48"),
    // West - Mountain
    entry("AZ", "Arizona", Mountain, "04"),
    entry("CO", "Colorado", Mountain, "08"),
    entry("ID", "Idaho", Mountain, "16"),
    entry("MT", "Montana", Mountain, "30"),
    entry("NV", "Nevada", Mountain, "32"),
    entry("NM", "New Mexico", Mountain, "35"),
    entry("UT", "Utah", Mountain, "49"),
    entry("WY", "Wyoming", Mountain, "56"),
    // West - Pacific
    entry("AK", "Alaska", Pacific, "02"),
    entry("CA", "California", Pacific, "06"),
    entry("HI", "Hawaii", Pacific, "15"),
    entry("OR", "Oregon", Pacific, "41"),
    entry("WA", "Washington", Pacific, "53"),
];

static BY_ABBR: LazyLock<HashMap<&'static str, &'static StateEntry>> =
    LazyLock::new(|| STATES.iter().map(|s| (s.abbr, s)).collect());

// Keyed by lowercase full name
static BY_NAME: LazyLock<HashMap<String, &'static StateEntry>> =
    LazyLock::new(|| STATES.iter().map(|s| (s.name.to_lowercase(), s)).collect());

// ============================================================================
// LOOKUPS
// ============================================================================

/// Look up a state by 2-letter abbreviation (case-insensitive)
pub fn state_by_abbr(abbr: &str) -> Option<&'static StateEntry> {
    BY_ABBR.get(abbr.trim().to_ascii_uppercase().as_str()).copied()
}

/// Look up a state by full English name (case-insensitive)
pub fn state_by_name(name: &str) -> Option<&'static StateEntry> {
    BY_NAME.get(&name.trim().to_lowercase()).copied()
}

pub fn region_of(abbr: &str) -> &'static str {
    state_by_abbr(abbr).map(|s| s.region().name()).unwrap_or("")
}

pub fn division_of(abbr: &str) -> &'static str {
    state_by_abbr(abbr).map(|s| s.division.name()).unwrap_or("")
}

pub fn fips_of(abbr: &str) -> &'static str {
    state_by_abbr(abbr).map(|s| s.fips).unwrap_or("")
}

/// Region name → number. Empty for an empty or unknown name.
pub fn region_number(region: &str) -> &'static str {
    Region::from_name(region).map(|r| r.number()).unwrap_or("")
}

/// Division name → number. Empty for an empty or unknown name.
pub fn division_number(division: &str) -> &'static str {
    Division::from_name(division).map(|d| d.number()).unwrap_or("")
}

// ============================================================================
// STATE NORMALIZATION
// ============================================================================

/// Normalize free-text state input toward a 2-letter abbreviation.
///
/// - 2 characters: uppercased and accepted without an existence check
/// - otherwise: full-name lookup (case-insensitive)
/// - no match: the trimmed input is passed through unchanged
pub fn normalize_state(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.chars().count() == 2 {
        return trimmed.to_uppercase();
    }

    match state_by_name(trimmed) {
        Some(state) => state.abbr.to_string(),
        None => trimmed.to_string(),
    }
}

/// Outcome of resolving a state against the reference tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateResolution {
    /// Known state or DC
    Resolved(&'static StateEntry),
    /// Normalized text that matches no table entry
    Unresolved(String),
}

impl StateResolution {
    pub fn abbr(&self) -> Option<&'static str> {
        match self {
            StateResolution::Resolved(state) => Some(state.abbr),
            StateResolution::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, StateResolution::Resolved(_))
    }
}

pub fn resolve_state(raw: &str) -> StateResolution {
    let normalized = normalize_state(raw);
    match state_by_abbr(&normalized) {
        Some(state) => StateResolution::Resolved(state),
        None => StateResolution::Unresolved(normalized),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_fifty_states_plus_dc() {
        let abbrs: HashSet<_> = STATES.iter().map(|s| s.abbr).collect();
        assert_eq!(abbrs.len(), 51, "Abbreviations must be unique");
        assert!(abbrs.contains("DC"));

        let fips: HashSet<_> = STATES.iter().map(|s| s.fips).collect();
        assert_eq!(fips.len(), 51, "FIPS codes must be unique");

        let names: HashSet<_> = STATES.iter().map(|s| s.name.to_lowercase()).collect();
        assert_eq!(names.len(), 51, "Full names must be unique");
    }

    #[test]
    fn test_tables_mutually_consistent() {
        for state in STATES.iter() {
            assert_eq!(state.abbr.len(), 2);
            assert!(!region_of(state.abbr).is_empty(), "{} has no region", state.abbr);
            assert!(!division_of(state.abbr).is_empty(), "{} has no division", state.abbr);
            assert_eq!(fips_of(state.abbr).len(), 2, "{} FIPS must be 2 digits", state.abbr);
            assert!(fips_of(state.abbr).chars().all(|c| c.is_ascii_digit()));
            assert_eq!(state_by_name(state.name).map(|s| s.abbr), Some(state.abbr));
        }
    }

    #[test]
    fn test_every_division_used_and_numbered() {
        for division in Division::ALL {
            assert!(STATES.iter().any(|s| s.division == division), "{} unused", division.name());
            assert_eq!(division_number(division.name()), division.number());
        }
        for region in Region::ALL {
            assert_eq!(region_number(region.name()), region.number());
        }
    }

    #[test]
    fn test_unknown_keys_yield_empty() {
        assert_eq!(region_of("ZZ"), "");
        assert_eq!(division_of(""), "");
        assert_eq!(fips_of("Nowhereland"), "");
        assert_eq!(region_number(""), "");
        assert_eq!(division_number("Atlantis"), "");
    }

    #[test]
    fn test_known_values() {
        assert_eq!(region_of("MA"), "Northeast");
        assert_eq!(division_of("MA"), "New England");
        assert_eq!(fips_of("MA"), "25");
        assert_eq!(fips_of("al"), "01");
        assert_eq!(region_of("DC"), "South");
        assert_eq!(division_number("Pacific"), "9");
        assert_eq!(region_number("West"), "4");
    }

    #[test]
    fn test_normalize_state() {
        assert_eq!(normalize_state("california"), "CA");
        assert_eq!(normalize_state("CA"), "CA");
        assert_eq!(normalize_state(" ca "), "CA");
        assert_eq!(normalize_state("NEW YORK"), "NY");
        assert_eq!(normalize_state("district of columbia"), "DC");
        assert_eq!(normalize_state("Nowhereland"), "Nowhereland");
        assert_eq!(normalize_state(""), "");
        // 2 characters are accepted as-is, even when unknown
        assert_eq!(normalize_state("zz"), "ZZ");
    }

    #[test]
    fn test_resolve_state() {
        assert_eq!(resolve_state("california").abbr(), Some("CA"));
        assert!(resolve_state("ma").is_resolved());
        assert_eq!(
            resolve_state("Nowhereland"),
            StateResolution::Unresolved("Nowhereland".to_string())
        );
        assert_eq!(resolve_state("zz"), StateResolution::Unresolved("ZZ".to_string()));
        assert!(!resolve_state("").is_resolved());
    }
}
