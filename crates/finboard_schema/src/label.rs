// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Well-known financial abbreviations.
const DICTIONARY: [(&str, &str); 20] = [
    ("c", "Current Price"),
    ("o", "Open Price"),
    ("h", "High Price"),
    ("l", "Low Price"),
    ("pc", "Previous Close"),
    ("d", "Change"),
    ("dp", "Percent Change"),
    ("v", "Volume"),
    ("t", "Timestamp"),
    ("s", "Status"),
    ("vw", "Volume Weighted Price"),
    ("C", "Close Price"),
    ("O", "Open Price"),
    ("H", "High Price"),
    ("L", "Low Price"),
    ("V", "Volume"),
    ("pe", "P/E Ratio"),
    ("marketCap", "Market Capitalization"),
    ("sector", "Sector"),
    ("industry", "Industry"),
];

const MAX_ACRONYM_LEN: usize = 4;

/// Turns a field key or flattened path into a display label.
///
/// Known financial abbreviations come from a fixed dictionary (`c` is "Current Price").
/// Flattened paths are labelled segment by segment. Otherwise `snake_case` and `camelCase`
/// keys are split into capitalised words, short upper-case acronyms are kept and anything
/// else gets its first letter capitalised.
///
/// ```
/// use finboard_schema::humanize_label;
///
/// assert_eq!(humanize_label("pc"), "Previous Close");
/// assert_eq!(humanize_label("market_cap_usd"), "Market Cap Usd");
/// assert_eq!(humanize_label("peRatio"), "Pe Ratio");
/// assert_eq!(humanize_label("EPS"), "EPS");
/// assert_eq!(humanize_label("quote.dp"), "Quote Percent Change");
/// ```
#[must_use]
pub fn humanize_label(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }

    if let Some((_, label)) = DICTIONARY.iter().find(|(abbreviation, _)| *abbreviation == key) {
        return (*label).to_string();
    }

    if key.contains('.') {
        return key
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(humanize_label)
            .collect::<Vec<_>>()
            .join(" ");
    }

    if key.contains('_') {
        return key
            .split('_')
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
    }

    if is_acronym(key) {
        return key.to_string();
    }

    let words = split_camel_case(key);
    if words.len() > 1 {
        return words
            .into_iter()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
    }

    capitalize(key)
}

fn is_acronym(key: &str) -> bool {
    key.chars().count() <= MAX_ACRONYM_LEN
        && key.chars().any(|c| c.is_ascii_uppercase())
        && key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Splits on lower-to-upper transitions and before the last capital of an upper-case run that
/// is followed by a lower-case letter (`peRatio` -> `pe Ratio`, `HTTPServer` -> `HTTP Server`).
fn split_camel_case(key: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = key.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for window in 1..chars.len() {
        let (index, current) = chars[window];
        let previous = chars[window - 1].1;
        let next = chars.get(window + 1).map(|(_, c)| *c);

        let lower_to_upper =
            (previous.is_lowercase() || previous.is_ascii_digit()) && current.is_uppercase();
        let acronym_end = previous.is_uppercase()
            && current.is_uppercase()
            && next.is_some_and(char::is_lowercase);

        if lower_to_upper || acronym_end {
            words.push(&key[start..index]);
            start = index;
        }
    }

    words.push(&key[start..]);
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
