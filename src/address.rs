use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub const DIRECTIONALS: &[(&str, &str)] = &[
    ("N", "North"),
    ("NE", "Northeast"),
    ("E", "East"),
    ("SE", "Southeast"),
    ("S", "South"),
    ("SW", "Southwest"),
    ("W", "West"),
    ("NW", "Northwest"),
];

pub const STREET_TYPES: &[(&str, &str)] = &[
    ("ST", "Street"),
    ("AVE", "Avenue"),
    ("RD", "Road"),
    ("BLVD", "Boulevard"),
    ("DR", "Drive"),
    ("PKWY", "Parkway"),
    ("PL", "Place"),
    ("CIR", "Circle"),
    ("CT", "Court"),
    ("TER", "Terrace"),
    ("LN", "Lane"),
    ("SQ", "Square"),
    ("MALL", "Mall"),
    ("CRES", "Crescent"),
    ("EXT", "Extension"),
    ("OVAL", "Oval"),
    ("WALK", "Walk"),
    ("WAY", "Way"),
    ("PATH", "Path"),
    ("RTE", "Route"),
    ("HTS", "Heights"),
    ("GDN", "Garden"),
    ("GDNS", "Gardens"),
    ("PLZ", "Plaza"),
    ("HWY", "Highway"),
    ("BCH", "Beach"),
    ("VLG", "Village"),
    ("ROW", "Row"),
    ("MNR", "Manor"),
    ("EST", "Estate"),
    ("ESTS", "Estates"),
    ("EXPY", "Expressway"),
];

static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(st|nd|rd|th)\b").expect("hardcoded ordinal regex is valid")
});

static HALF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.5$").expect("hardcoded half-number regex is valid"));

fn expand_token(token: &str) -> &str {
    DIRECTIONALS
        .iter()
        .chain(STREET_TYPES)
        .find(|(abbr, _)| *abbr == token)
        .map_or(token, |(_, full)| *full)
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Expands and cleans a raw street name plus optional suffix or directional.
///
/// `("123 ST", None)` becomes `123 Street`; ordinals keep lower-case
/// suffixes (`12TH` becomes `12th`). A missing street yields `None`.
#[must_use]
pub fn clean_street_name(street: Option<&str>, suffix: Option<&str>) -> Option<String> {
    let street = present(street)?.to_uppercase();
    let joined = match present(suffix) {
        Some(suffix) => format!("{street} {}", suffix.to_uppercase()),
        None => street,
    };

    let expanded = joined
        .split_whitespace()
        .map(expand_token)
        .collect::<Vec<_>>()
        .join(" ");

    let titled = title_case(&expanded);
    let fixed = ORDINAL_RE.replace_all(&titled, |caps: &regex::Captures<'_>| {
        format!("{}{}", &caps[1], caps[2].to_lowercase())
    });
    Some(fixed.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Rewrites `<digits>.5` building numbers as `<digits> 1/2`.
#[must_use]
pub fn fraction_building_number(raw: &str) -> Cow<'_, str> {
    HALF_RE.replace(raw, "$1 1/2")
}
