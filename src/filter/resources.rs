//! # Resource Catalog
//!
//! Filter tables for every resource served under `/v1`.

use super::query::SortDirective;
use super::spec::{FilterSpec, IdShape, IdentifierSpec, Paging, ResourceName, ResourceSpec};

/// Continent codes
pub const CONTINENT_CODES: &[&str] = &["AFR", "ASI", "AUS", "EUR", "NAR", "SOP", "LAM"];

/// Region codes run 1 to 12
pub const REGION_MIN: i64 = 1;
pub const REGION_MAX: i64 = 12;

/// Religion codes; 3 is retired
pub const RELIGION_MIN: i64 = 1;
pub const RELIGION_MAX: i64 = 9;
pub const RETIRED_RELIGIONS: &[i64] = &[3];

const MAX_POPULATION: i64 = 2_000_000_000;

const PEOPLE_TABLE: &str = "jppeoples";

pub fn people_groups() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::PeopleGroups,
        PEOPLE_TABLE,
        IdentifierSpec {
            column: "PeopleID3",
            shape: IdShape::Integer { min: 1, max: 99_999 },
        },
    )
    .filter(FilterSpec::integer_set("people_id1", &["PeopleID1"], 1, 99, &[]))
    .filter(FilterSpec::code_set("rop1", &["ROP1"], 4))
    .filter(FilterSpec::integer_set("people_id2", &["PeopleID2"], 1, 999, &[]))
    .filter(FilterSpec::code_set("rop2", &["ROP2"], 5))
    .filter(FilterSpec::integer_set("people_id3", &["PeopleID3"], 1, 99_999, &[]))
    .filter(FilterSpec::integer_set("rop3", &["ROP3"], 100_000, 999_999, &[]))
    .filter(FilterSpec::code_set("countries", &["ROG3"], 2))
    .filter(FilterSpec::enum_set("continents", &["ROG2"], CONTINENT_CODES))
    .filter(FilterSpec::integer_set(
        "regions",
        &["RegionCode"],
        REGION_MIN,
        REGION_MAX,
        &[],
    ))
    .filter(FilterSpec::code_set("languages", &["ROL3"], 3))
    .filter(FilterSpec::integer_set(
        "primary_religions",
        &["RLG3"],
        RELIGION_MIN,
        RELIGION_MAX,
        RETIRED_RELIGIONS,
    ))
    .filter(FilterSpec::integer_range(
        "population",
        &["Population"],
        0,
        MAX_POPULATION,
    ))
    .filter(FilterSpec::decimal_range(
        "pc_christianity",
        &["PercentChristianity"],
        0,
        100,
    ))
    .filter(FilterSpec::decimal_range(
        "pc_evangelical",
        &["PercentEvangelical"],
        0,
        100,
    ))
    .filter(FilterSpec::integer_set("jpscale", &["JPScale"], 1, 5, &[]))
    .filter(FilterSpec::flag("least_reached", &["LeastReached"]))
    .filter(FilterSpec::flag("indigenous", &["IndigenousCode"]))
    .filter(FilterSpec::flag("window1040", &["Window1040"]))
    .retired(&["pc_adherent", "unengaged"])
    .sortable(
        &[
            ("people_name", "PeopNameInCountry"),
            ("people_id3", "PeopleID3"),
            ("country", "Ctry"),
            ("population", "Population"),
            ("jpscale", "JPScale"),
            ("pc_christianity", "PercentChristianity"),
        ],
        SortDirective::asc("PeopNameInCountry"),
    )
    .paging(Paging {
        default_limit: 250,
        max_limit: 1000,
    })
}

/// People group of the day, selected by month and day
pub fn daily_unreached() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::DailyUnreached,
        PEOPLE_TABLE,
        IdentifierSpec {
            column: "PeopleID3",
            shape: IdShape::Integer { min: 1, max: 99_999 },
        },
    )
    .filter(FilterSpec::integer_range("month", &["LRofTheDayMonth"], 1, 12))
    .filter(FilterSpec::integer_range("day", &["LRofTheDayDay"], 1, 31))
    .required(&["month", "day"])
    .sortable(
        &[("people_name", "PeopNameInCountry")],
        SortDirective::asc("PeopNameInCountry"),
    )
    .paging(Paging {
        default_limit: 1,
        max_limit: 10,
    })
}

pub fn countries() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::Countries,
        "countries",
        IdentifierSpec {
            column: "ROG3",
            shape: IdShape::Code { len: 2 },
        },
    )
    .filter(FilterSpec::code_set("ids", &["ROG3", "ISO2"], 2))
    .filter(FilterSpec::enum_set("continents", &["ROG2"], CONTINENT_CODES))
    .filter(FilterSpec::integer_set(
        "regions",
        &["RegionCode"],
        REGION_MIN,
        REGION_MAX,
        &[],
    ))
    .filter(FilterSpec::integer_set(
        "primary_religions",
        &["RLG3Primary"],
        RELIGION_MIN,
        RELIGION_MAX,
        RETIRED_RELIGIONS,
    ))
    .filter(FilterSpec::integer_range(
        "population",
        &["Population"],
        0,
        MAX_POPULATION,
    ))
    .filter(FilterSpec::decimal_range(
        "pc_christianity",
        &["PercentChristianity"],
        0,
        100,
    ))
    .filter(FilterSpec::decimal_range(
        "pc_evangelical",
        &["PercentEvangelical"],
        0,
        100,
    ))
    .filter(FilterSpec::integer_range("cnt_peoples_lr", &["CntPeoplesLR"], 0, 10_000))
    .filter(FilterSpec::integer_set("jpscale", &["JPScaleCtry"], 1, 3, &[]))
    .filter(FilterSpec::flag("window1040", &["Window1040"]))
    .retired(&["pc_adherent"])
    .sortable(
        &[
            ("name", "Ctry"),
            ("population", "Population"),
            ("cnt_peoples_lr", "CntPeoplesLR"),
            ("pc_christianity", "PercentChristianity"),
        ],
        SortDirective::asc("Ctry"),
    )
}

pub fn languages() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::Languages,
        "languages",
        IdentifierSpec {
            column: "ROL3",
            shape: IdShape::Code { len: 3 },
        },
    )
    .filter(FilterSpec::code_set("ids", &["ROL3"], 3))
    .filter(FilterSpec::exact("language", &["Language"]))
    .filter(FilterSpec::code_set("countries", &["ROG3"], 2))
    .filter(FilterSpec::integer_set("bible_status", &["BibleStatus"], 0, 5, &[]))
    .filter(FilterSpec::integer_set("jpscale", &["JPScale"], 1, 3, &[]))
    .filter(FilterSpec::flag("has_jesus_film", &["JF"]))
    .filter(FilterSpec::flag("has_audio_recordings", &["AudioRecordings"]))
    .filter(FilterSpec::flag("has_four_laws", &["FourLaws"]))
    .filter(FilterSpec::flag("has_gods_story", &["GodsStory"]))
    .filter(FilterSpec::flag("least_reached", &["LeastReached"]))
    .filter(FilterSpec::decimal_range(
        "pc_christianity",
        &["PercentChristianity"],
        0,
        100,
    ))
    .retired(&["has_new_testament"])
    .sortable(
        &[
            ("language", "Language"),
            ("population", "Population"),
            ("bible_status", "BibleStatus"),
        ],
        SortDirective::asc("Language"),
    )
    .paging(Paging {
        default_limit: 250,
        max_limit: 1000,
    })
}

pub fn regions() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::Regions,
        "regions",
        IdentifierSpec {
            column: "RegionCode",
            shape: IdShape::Integer {
                min: REGION_MIN,
                max: REGION_MAX,
            },
        },
    )
    .filter(FilterSpec::integer_set(
        "ids",
        &["RegionCode"],
        REGION_MIN,
        REGION_MAX,
        &[],
    ))
    .filter(FilterSpec::enum_set("continents", &["ROG2"], CONTINENT_CODES))
    .sortable(
        &[("name", "RegionName"), ("id", "RegionCode")],
        SortDirective::asc("RegionCode"),
    )
}

pub fn continents() -> ResourceSpec {
    ResourceSpec::new(
        ResourceName::Continents,
        "continents",
        IdentifierSpec {
            column: "ROG2",
            shape: IdShape::Code { len: 3 },
        },
    )
    .filter(FilterSpec::enum_set("ids", &["ROG2"], CONTINENT_CODES))
    .sortable(
        &[("name", "Continent"), ("id", "ROG2")],
        SortDirective::asc("ROG2"),
    )
}
