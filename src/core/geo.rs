// LogAtlas - core/geo.rs
//
// Geographic place records and name normalisation.
//
// Three record kinds, each embedding the previous one's fields:
//   Place -> AdministrativeArea -> Country
// Containment references (country_id, admin1_id, admin2_id, city) are plain
// ids resolved elsewhere, never owned records.

use crate::util::constants::ALTERNATE_NAMES_SEPARATOR;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Capabilities shared by every place record kind.
pub trait Named {
    /// The base place fields.
    fn place(&self) -> &Place;

    /// Display names, primary first, without blanks.
    fn names(&self) -> Vec<String>;

    /// Present coordinates keyed by `longitude`, `latitude`, `elevation`.
    fn coordinates(&self) -> BTreeMap<&'static str, f64> {
        self.place().coordinates()
    }
}

// =============================================================================
// Place
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub name: String,
    pub geonames_id: Option<String>,
    pub feature_cat: Option<String>,
    pub feature_subcat: Option<String>,

    /// ISO 3166 two-letter id ("us", "mx", ...), lowercase.
    pub country_id: Option<String>,
    /// First-level administrative area ("state") containing this place. The
    /// UK and a few others use it for their component nations.
    pub admin1_id: Option<String>,
    /// Second-level administrative area ("county") containing this place.
    pub admin2_id: Option<String>,
    /// City containing this place.
    pub city: Option<String>,

    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub elevation: Option<f64>,
    pub quadkey: Option<String>,
    pub timezone: Option<String>,

    /// `|`-separated list of other names.
    pub alternate_names: String,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn coordinates(&self) -> BTreeMap<&'static str, f64> {
        [
            ("longitude", self.longitude),
            ("latitude", self.latitude),
            ("elevation", self.elevation),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

impl Named for Place {
    fn place(&self) -> &Place {
        self
    }

    fn names(&self) -> Vec<String> {
        std::iter::once(self.name.as_str())
            .chain(self.alternate_names.split(ALTERNATE_NAMES_SEPARATOR))
            .filter(|name| !is_blank(name))
            .map(str::to_string)
            .collect()
    }
}

// =============================================================================
// Administrative area
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdministrativeArea {
    #[serde(flatten)]
    pub place: Place,
    pub population: Option<i64>,
    pub official_name: Option<String>,
}

impl Named for AdministrativeArea {
    fn place(&self) -> &Place {
        &self.place
    }

    /// The place's names with `official_name` placed right after the
    /// primary name, then de-duplicated in first-seen order.
    fn names(&self) -> Vec<String> {
        let mut names = self.place.names();
        if let Some(official) = &self.official_name {
            names.insert(names.len().min(1), official.clone());
        }
        let mut seen = HashSet::new();
        names.retain(|name| !is_blank(name) && seen.insert(name.clone()));
        names
    }
}

// =============================================================================
// Country
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    #[serde(flatten)]
    pub area: AdministrativeArea,
    /// ISO 3166 three-letter id ("usa", "mex", ...), lowercase.
    pub country_al3id: Option<String>,
    /// ISO 3166 numeric id (840 for "usa").
    pub country_numid: Option<i64>,
    /// Top-level domain id.
    pub tld_id: Option<String>,
}

impl Named for Country {
    fn place(&self) -> &Place {
        &self.area.place
    }

    fn names(&self) -> Vec<String> {
        self.area.names()
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// =============================================================================
// Slugs
// =============================================================================

fn slug_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A whole run of separators (spaced "and", spaced hyphens, or anything
    // that is not an ASCII lowercase letter) collapses to one hyphen.
    RE.get_or_init(|| {
        Regex::new(r"(?:\s+and\s+|\s+-\s+|[^a-z])+").expect("slug separator: invalid regex")
    })
}

/// Normalise a display name into a lowercase, hyphen-separated slug.
///
/// `"Bosnia and Herzegovina"` -> `"bosnia-herzegovina"`. Letters outside
/// ASCII `a`-`z` are treated as separators. The result never starts or ends
/// with a hyphen and never contains two in a row, so slugifying a slug
/// returns it unchanged.
pub fn slugify_name(val: &str) -> String {
    let lowered = val.to_lowercase();
    slug_separator_re()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(name: &str, official: Option<&str>, alternates: &str) -> AdministrativeArea {
        AdministrativeArea {
            place: Place {
                alternate_names: alternates.to_string(),
                ..Place::new(name)
            },
            official_name: official.map(str::to_string),
            ..AdministrativeArea::default()
        }
    }

    #[test]
    fn test_place_names_split_alternates_and_drop_blanks() {
        let place = Place {
            alternate_names: "Big Apple||  |NYC".to_string(),
            ..Place::new("New York")
        };
        assert_eq!(place.names(), ["New York", "Big Apple", "NYC"]);
    }

    #[test]
    fn test_place_names_keep_duplicates() {
        let place = Place {
            alternate_names: "Paris".to_string(),
            ..Place::new("Paris")
        };
        assert_eq!(place.names(), ["Paris", "Paris"]);
    }

    #[test]
    fn test_place_names_blank_name() {
        assert!(Place::new("  ").names().is_empty());
    }

    #[test]
    fn test_area_inserts_official_name_second() {
        let a = area("Bavaria", Some("Freistaat Bayern"), "Bayern|Baviera");
        assert_eq!(
            a.names(),
            ["Bavaria", "Freistaat Bayern", "Bayern", "Baviera"]
        );
    }

    #[test]
    fn test_area_names_dedupe_first_seen() {
        let a = area("Texas", Some("State of Texas"), "State of Texas|TX|Texas|TX");
        assert_eq!(a.names(), ["Texas", "State of Texas", "TX"]);
    }

    #[test]
    fn test_area_blank_or_missing_official_name() {
        assert_eq!(area("Ohio", Some(" "), "OH").names(), ["Ohio", "OH"]);
        assert_eq!(area("Ohio", None, "OH").names(), ["Ohio", "OH"]);
    }

    #[test]
    fn test_area_with_no_base_names() {
        assert_eq!(area("", Some("Official"), "").names(), ["Official"]);
    }

    #[test]
    fn test_country_inherits_area_names() {
        let country = Country {
            area: area(
                "Bosnia and Herzegovina",
                Some("Bosna i Hercegovina"),
                "BiH",
            ),
            country_al3id: Some("bih".to_string()),
            country_numid: Some(70),
            tld_id: Some("ba".to_string()),
        };
        assert_eq!(country.names(), country.area.names());
        assert_eq!(country.names()[1], "Bosna i Hercegovina");
        assert_eq!(country.place().name, "Bosnia and Herzegovina");
    }

    #[test]
    fn test_coordinates_omit_absent_values() {
        let place = Place {
            latitude: Some(48.85),
            ..Place::new("Paris")
        };
        let coords = place.coordinates();
        assert_eq!(coords.len(), 1);
        assert_eq!(coords.get("latitude"), Some(&48.85));

        assert!(Place::new("Nowhere").coordinates().is_empty());

        let full = Place {
            longitude: Some(2.35),
            latitude: Some(48.85),
            elevation: Some(35.0),
            ..Place::new("Paris")
        };
        assert_eq!(full.coordinates().len(), 3);
    }

    #[test]
    fn test_coordinates_through_trait() {
        let country = Country {
            area: AdministrativeArea {
                place: Place {
                    elevation: Some(1.0),
                    ..Place::new("X")
                },
                ..AdministrativeArea::default()
            },
            ..Country::default()
        };
        assert_eq!(Named::coordinates(&country).get("elevation"), Some(&1.0));
    }

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify_name("Bosnia and Herzegovina"), "bosnia-herzegovina");
        assert_eq!(slugify_name("Trinidad AND Tobago"), "trinidad-tobago");
        assert_eq!(slugify_name("Guinea - Bissau"), "guinea-bissau");
        assert_eq!(slugify_name("  -Côte d'Ivoire- "), "c-te-d-ivoire");
        assert_eq!(slugify_name("Andorra"), "andorra");
        assert_eq!(slugify_name("Sandand"), "sandand");
        assert_eq!(slugify_name("St. Kitts & Nevis"), "st-kitts-nevis");
        assert_eq!(slugify_name("a--b"), "a-b");
        assert_eq!(slugify_name("---"), "");
        assert_eq!(slugify_name(""), "");
    }

    #[test]
    fn test_slugify_is_idempotent_and_well_formed() {
        let inputs = [
            "Bosnia and Herzegovina",
            "  -Côte d'Ivoire- ",
            "x and 1 y",
            "and and and",
            " and ",
            "Hello,   World!!",
            "Ελλάδα",
            "São Tomé and Príncipe",
            "--a - b--",
            "1234",
            "Korea, Republic of",
        ];
        for input in inputs {
            let once = slugify_name(input);
            assert_eq!(slugify_name(&once), once, "not idempotent for {input:?}");
            assert!(
                once.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "{once:?} has characters outside a-z and '-'"
            );
            assert!(!once.starts_with('-') && !once.ends_with('-'), "{once:?}");
            assert!(!once.contains("--"), "{once:?}");
        }
    }

    #[test]
    fn test_place_json_round_trip_uses_flat_fields() {
        let json = r#"{"name":"Texas","official_name":"State of Texas","population":29000000,"latitude":31.0}"#;
        let a: AdministrativeArea = serde_json::from_str(json).unwrap();
        assert_eq!(a.place.name, "Texas");
        assert_eq!(a.population, Some(29_000_000));
        assert_eq!(a.place.latitude, Some(31.0));
        assert_eq!(a.names(), ["Texas", "State of Texas"]);
    }
}
