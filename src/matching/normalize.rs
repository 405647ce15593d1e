//! Address normalization for matching keys.

use regex::Regex;
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.,#]").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// "n hwy 21", "north highway 21"
static HIGHWAY_LEADING_DIRECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:n|s|e|w|north|south|east|west)\s+(?:highway|hwy)\s+(\d+)\b")
        .expect("valid regex")
});

/// "highway 21", "state highway 21", "sc highway 21", "us hwy 1", "sc-21",
/// "us 1", "route 9", with an optional trailing direction ("hwy 21 n")
static HIGHWAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?:(?:us|[a-z]{2})[\s-]+)?(?:state\s+highway|state\s+road|state\s+route|highway|hwy|route|rte)|us|[a-z]{2}-)\s*-?\s*(\d+)(?:\s+(?:n|s|e|w|north|south|east|west)\b)?\b",
    )
    .expect("valid regex")
});

const STREET_TYPES: &[(&str, &str)] = &[
    ("street", "st"),
    ("avenue", "ave"),
    ("drive", "dr"),
    ("road", "rd"),
    ("lane", "ln"),
    ("court", "ct"),
    ("place", "pl"),
    ("boulevard", "blvd"),
    ("circle", "cir"),
    ("parkway", "pkwy"),
];

const DIRECTIONS: &[(&str, &str)] = &[
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
];

static STREET_TYPE_WORDS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| word_replacements(STREET_TYPES));

static DIRECTION_WORDS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| word_replacements(DIRECTIONS));

fn word_replacements(pairs: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    pairs
        .iter()
        .map(|(word, abbr)| {
            (
                Regex::new(&format!(r"\b{}\b", word)).expect("valid regex"),
                *abbr,
            )
        })
        .collect()
}

/// Normalize an address string into a comparison key.
///
/// Lowercases, strips `.`, `,` and `#`, collapses whitespace, folds highway
/// spellings into `hwy N`, and abbreviates street types and directions.
pub fn normalize_address(address: &str) -> String {
    let lowered = address.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    let mut text = WHITESPACE.replace_all(stripped.trim(), " ").into_owned();

    text = HIGHWAY_LEADING_DIRECTION
        .replace_all(&text, "hwy $1")
        .into_owned();
    text = HIGHWAY.replace_all(&text, "hwy $1").into_owned();

    for (pattern, abbr) in STREET_TYPE_WORDS.iter() {
        text = pattern.replace_all(&text, *abbr).into_owned();
    }
    for (pattern, abbr) in DIRECTION_WORDS.iter() {
        text = pattern.replace_all(&text, *abbr).into_owned();
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highway_direction_equivalence() {
        assert_eq!(
            normalize_address("123 N Highway 21"),
            normalize_address("123 Hwy 21 N")
        );
        assert_eq!(normalize_address("123 N Highway 21"), "123 hwy 21");
    }

    #[test]
    fn test_highway_variants() {
        for variant in [
            "500 Highway 21",
            "500 HWY 21",
            "500 SC-21",
            "500 S Hwy 21",
            "500 State Highway 21",
            "500 Hwy. 21 South",
            "500 SC Highway 21",
            "500 SC Hwy 21",
            "500 sc-hwy 21",
        ] {
            assert_eq!(normalize_address(variant), "500 hwy 21", "variant: {}", variant);
        }
    }

    #[test]
    fn test_us_highway_prefix() {
        for variant in ["123 US Highway 1", "123 US-1", "123 US 1", "123 Highway 1", "123 US Hwy 1"] {
            assert_eq!(normalize_address(variant), "123 hwy 1", "variant: {}", variant);
        }
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(
            normalize_address("  12 Oak St.,   Suite #4 "),
            "12 oak st suite 4"
        );
    }

    #[test]
    fn test_street_types_and_directions() {
        assert_eq!(
            normalize_address("45 North Lake Boulevard"),
            "45 n lake blvd"
        );
        assert_eq!(normalize_address("9 West Pine Street"), "9 w pine st");
        assert_eq!(normalize_address("3 Cedar Parkway"), "3 cedar pkwy");
    }

    #[test]
    fn test_whole_words_only() {
        // "placement" and "roadhouse" must survive intact
        assert_eq!(normalize_address("1 Placement Roadhouse Rd"), "1 placement roadhouse rd");
    }

    #[test]
    fn test_zip_plus_four_untouched() {
        assert_eq!(normalize_address("1 Main St, SC 29201-1234"), "1 main st sc 29201-1234");
    }
}
