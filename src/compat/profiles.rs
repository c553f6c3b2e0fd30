//! Published v1 column contracts.

use super::{scalar_number, scalar_text, ApiVersion, CompatProfile, ComputedField, LinkConfig, Row};
use crate::filter::ResourceName;

/// Internal scheduling and bookkeeping columns
const PEOPLE_GROUP_INTERNAL: &[&str] = &["LRofTheDayMonth", "LRofTheDayDay", "InternalNotes"];
const COUNTRY_INTERNAL: &[&str] = &["InternalNotes"];

/// v1 publishes "percent adherents" under its historical name
const PERCENT_RENAME: &[(&str, &str)] = &[("PercentChristianity", "PercentAdherents")];

pub fn standard_profiles() -> Vec<(ResourceName, ApiVersion, CompatProfile)> {
    let people = CompatProfile {
        removed: PEOPLE_GROUP_INTERNAL,
        renamed: PERCENT_RENAME,
        computed: vec![
            ComputedField {
                name: "PeopleGroupURL",
                compute: people_group_url,
            },
            ComputedField {
                name: "PeopleGroupPhotoURL",
                compute: people_group_photo_url,
            },
            ComputedField {
                name: "CountryURL",
                compute: country_url,
            },
            ComputedField {
                name: "JPScaleImageURL",
                compute: jpscale_image_url,
            },
        ],
    };

    vec![
        (ResourceName::PeopleGroups, ApiVersion::V1, people.clone()),
        (ResourceName::DailyUnreached, ApiVersion::V1, people),
        (
            ResourceName::Countries,
            ApiVersion::V1,
            CompatProfile {
                removed: COUNTRY_INTERNAL,
                renamed: PERCENT_RENAME,
                computed: vec![
                    ComputedField {
                        name: "CountryURL",
                        compute: country_url,
                    },
                    ComputedField {
                        name: "CntPeoplesNonLR",
                        compute: non_least_reached_count,
                    },
                ],
            },
        ),
        (
            ResourceName::Languages,
            ApiVersion::V1,
            CompatProfile {
                removed: &[],
                renamed: PERCENT_RENAME,
                computed: vec![ComputedField {
                    name: "JPScaleImageURL",
                    compute: jpscale_image_url,
                }],
            },
        ),
        (ResourceName::Regions, ApiVersion::V1, CompatProfile::default()),
        (ResourceName::Continents, ApiVersion::V1, CompatProfile::default()),
    ]
}

fn people_group_url(row: &Row, links: &LinkConfig) -> String {
    match (scalar_text(row, "PeopleID3"), scalar_text(row, "ROG3")) {
        (Some(id), Some(country)) => {
            format!("{}/people_groups/{}/{}", links.site_base_url, id, country)
        }
        _ => String::new(),
    }
}

fn people_group_photo_url(row: &Row, links: &LinkConfig) -> String {
    scalar_text(row, "PhotoAddress")
        .map(|file| format!("{}/profiles/photos/{}", links.media_base_url, file))
        .unwrap_or_default()
}

fn country_url(row: &Row, links: &LinkConfig) -> String {
    scalar_text(row, "ROG3")
        .map(|country| format!("{}/countries/{}", links.site_base_url, country))
        .unwrap_or_default()
}

fn jpscale_image_url(row: &Row, links: &LinkConfig) -> String {
    scalar_text(row, "JPScale")
        .map(|scale| format!("{}/images/gauge/gauge-{}.png", links.media_base_url, scale))
        .unwrap_or_default()
}

fn non_least_reached_count(row: &Row, _: &LinkConfig) -> String {
    match (scalar_number(row, "CntPeoples"), scalar_number(row, "CntPeoplesLR")) {
        (Some(total), Some(lr)) => format!("{}", (total - lr) as i64),
        _ => String::new(),
    }
}
