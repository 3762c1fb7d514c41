//! Accept-language parsing and supported-language matching.
//!
//! Two entry points:
//! - [`pick`]: choose the best supported language for a locale-preference
//!   string, either strictly (script and region must agree when the request
//!   carries them) or loosely (primary language subtag only).
//! - [`client_locales`]: turn raw `Accept-Language` header values into a
//!   quality-ordered list of canonical tags.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// One entry of a parsed locale-preference list.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    pub code: String,
    pub script: Option<String>,
    pub region: Option<String>,
    pub quality: f32,
}

impl LanguageRange {
    /// Split a tag such as `zh-Hant-TW` into code, script and region.
    ///
    /// Two subtags are read as code + region, three as code + script + region.
    fn from_tag(tag: &str, quality: f32) -> Self {
        let bits: Vec<&str> = tag.split('-').collect();
        let has_script = bits.len() == 3;
        Self {
            code: bits[0].to_string(),
            script: if has_script {
                Some(bits[1].to_string())
            } else {
                None
            },
            region: if has_script {
                Some(bits[2].to_string())
            } else {
                bits.get(1).map(|s| s.to_string())
            },
            quality,
        }
    }
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:[a-zA-Z]+(?:-[a-zA-Z0-9]+){0,2}|\*)(?:;q=[0-1](?:\.[0-9]+)?)?")
            .expect("language range regex is valid")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,8}(?:-[A-Za-z0-9]{1,8})*$").expect("language tag regex is valid")
    })
}

/// Parse a locale-preference string (`"en-GB,en;q=0.8"`) into ranges,
/// highest quality first. Entries with equal quality keep their order.
pub fn parse(accept_language: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = range_regex()
        .find_iter(accept_language)
        .map(|m| {
            let mut bits = m.as_str().split(';');
            let tag = bits.next().unwrap_or_default();
            let quality = bits
                .next()
                .and_then(|q| q.split('=').nth(1))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            LanguageRange::from_tag(tag, quality)
        })
        .collect();

    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    ranges
}

/// Return the first supported language that satisfies the preference list.
///
/// Preferences are walked in quality order; for each one the supported list
/// is scanned in its configured order. In strict mode a requested script or
/// region has to match the supported entry's; a request without them matches
/// any variant of the same language (`en` picks `en-US`). In loose mode only
/// the primary subtag is compared (`en-ZZ` picks `en`).
pub fn pick<S: AsRef<str>>(supported: &[S], accept_language: &str, loose: bool) -> Option<String> {
    if supported.is_empty() || accept_language.is_empty() {
        return None;
    }

    let supported_ranges: Vec<LanguageRange> = supported
        .iter()
        .map(|s| LanguageRange::from_tag(s.as_ref(), 1.0))
        .collect();

    for requested in parse(accept_language) {
        let code = requested.code.to_lowercase();
        let script = requested.script.as_deref().map(str::to_lowercase);
        let region = requested.region.as_deref().map(str::to_lowercase);

        for (index, candidate) in supported_ranges.iter().enumerate() {
            let candidate_script = candidate.script.as_deref().map(str::to_lowercase);
            let candidate_region = candidate.region.as_deref().map(str::to_lowercase);

            if code == candidate.code.to_lowercase()
                && (loose || script.is_none() || script == candidate_script)
                && (loose || region.is_none() || region == candidate_region)
            {
                return Some(supported[index].as_ref().to_string());
            }
        }
    }

    None
}

/// Canonical casing for a well-formed tag: `EN-us` → `en-US`,
/// `zh-hant-tw` → `zh-Hant-TW`.
pub fn canonicalize(tag: &str) -> String {
    tag.split('-')
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = part.chars();
                let first = chars.next().map(|c| c.to_ascii_uppercase());
                first
                    .into_iter()
                    .chain(chars.map(|c| c.to_ascii_lowercase()))
                    .collect()
            } else if (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
            {
                part.to_ascii_uppercase()
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Locales a client asked for via one or more `Accept-Language` values.
///
/// Wildcards, malformed tags and `q=0` entries are dropped, duplicates keep
/// their first position, and the result is ordered by quality. Returns
/// `None` when nothing usable remains.
pub fn client_locales<S: AsRef<str>>(header_values: &[S]) -> Option<Vec<String>> {
    let mut entries: Vec<(String, f32)> = Vec::new();

    for value in header_values {
        for part in value.as_ref().split(',') {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next().unwrap_or_default().trim();
            if tag == "*" || !tag_regex().is_match(tag) {
                continue;
            }

            let quality = pieces
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                continue;
            }

            let tag = canonicalize(tag);
            if !entries.iter().any(|(existing, _)| *existing == tag) {
                entries.push((tag, quality));
            }
        }
    }

    if entries.is_empty() {
        return None;
    }

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    Some(entries.into_iter().map(|(tag, _)| tag).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse Tests ====================

    #[test]
    fn test_parse_orders_by_quality() {
        let ranges = parse("en;q=0.5,nb-NO,sv;q=0.8");
        let codes: Vec<&str> = ranges.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["nb", "sv", "en"]);
        assert_eq!(ranges[0].region.as_deref(), Some("NO"));
    }

    #[test]
    fn test_parse_script_and_region() {
        let ranges = parse("zh-Hant-TW");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].code, "zh");
        assert_eq!(ranges[0].script.as_deref(), Some("Hant"));
        assert_eq!(ranges[0].region.as_deref(), Some("TW"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
    }

    // ==================== pick Tests ====================

    #[test]
    fn test_pick_exact() {
        assert_eq!(pick(&["nb", "en"], "en", false), Some("en".to_string()));
    }

    #[test]
    fn test_pick_strict_matches_region_variant_when_request_has_none() {
        assert_eq!(pick(&["en-US", "nb"], "en", false), Some("en-US".to_string()));
    }

    #[test]
    fn test_pick_strict_rejects_other_region() {
        assert_eq!(pick(&["en", "nb"], "en-ZZ", false), None);
    }

    #[test]
    fn test_pick_loose_ignores_region() {
        assert_eq!(pick(&["en", "nb"], "en-ZZ", true), Some("en".to_string()));
    }

    #[test]
    fn test_pick_is_case_insensitive_and_returns_configured_form() {
        assert_eq!(pick(&["en-GB"], "EN-gb", false), Some("en-GB".to_string()));
    }

    #[test]
    fn test_pick_respects_quality() {
        assert_eq!(
            pick(&["en", "nb"], "en;q=0.2,nb;q=0.9", false),
            Some("nb".to_string())
        );
    }

    #[test]
    fn test_pick_none_when_unsupported() {
        assert_eq!(pick(&["en", "nb"], "fr-FR,de", true), None);
    }

    #[test]
    fn test_pick_empty_inputs() {
        let empty: [&str; 0] = [];
        assert_eq!(pick(&empty, "en", true), None);
        assert_eq!(pick(&["en"], "", true), None);
    }

    // ==================== client_locales Tests ====================

    #[test]
    fn test_client_locales_sorted_and_canonical() {
        let locales = client_locales(&["en-us;q=0.7, nb-no, *;q=0.1"]).unwrap();
        assert_eq!(locales, vec!["nb-NO".to_string(), "en-US".to_string()]);
    }

    #[test]
    fn test_client_locales_joins_multiple_values() {
        let locales = client_locales(&["nb", "en;q=0.5"]).unwrap();
        assert_eq!(locales, vec!["nb".to_string(), "en".to_string()]);
    }

    #[test]
    fn test_client_locales_drops_invalid_and_zero_quality() {
        assert_eq!(client_locales(&["en;q=0, 1234, *"]), None);
    }

    #[test]
    fn test_client_locales_deduplicates() {
        let locales = client_locales(&["en, EN, en;q=0.3"]).unwrap();
        assert_eq!(locales, vec!["en".to_string()]);
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("ZH-hant-tw"), "zh-Hant-TW");
        assert_eq!(canonicalize("es-419"), "es-419");
        assert_eq!(canonicalize("NB"), "nb");
    }
}
