//! County-key normalization from free text.
//!
//! Two source conventions are handled:
//!
//! - **Prefix pattern**: test centre descriptors such as
//!   `"Athlone, Co. Westmeath"` carry the county after a `Co.` marker.
//! - **Suffix strip**: the age table spells administrative areas as
//!   `"Cork City"` / `"Cork County"`; removing the qualifier leaves the county.
//!
//! Both produce a [`CountyKey`], which is canonicalized on construction, so
//! keys from either convention compare equal when they name the same county.

use county_model::{CountyKey, PrefixPattern};
use regex::Regex;

use crate::error::Result;

const ASCII_PREFIX: &str = r"Co\.?\s+([A-Za-z]+)";
const UNICODE_PREFIX: &str = r"Co\.?\s+(\p{L}+(?:-\p{L}+)*)";

/// Qualifiers removed by suffix stripping, in the order they are tried.
pub const COUNTY_QUALIFIERS: [&str; 2] = [" City", " County"];

/// Which normalization rule a column is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// `Co. <Name>` anywhere in the text.
    Prefix,
    /// Trailing ` City` / ` County` removed.
    SuffixStrip,
    /// Prefix pattern, falling back to suffix stripping when the text has no
    /// `Co.` marker. Used for population labels, which mix both styles.
    PrefixOrSuffix,
}

/// Compiled normalizer for one prefix pattern.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pattern: PrefixPattern,
    prefix: Regex,
}

impl Normalizer {
    pub fn new(pattern: PrefixPattern) -> Result<Self> {
        let source = match pattern {
            PrefixPattern::Ascii => ASCII_PREFIX,
            PrefixPattern::Unicode => UNICODE_PREFIX,
        };
        Ok(Self {
            pattern,
            prefix: Regex::new(source)?,
        })
    }

    pub fn pattern(&self) -> PrefixPattern {
        self.pattern
    }

    /// County named by the first `Co. <Name>` match, if any.
    ///
    /// Only the first alphabetic run after the marker is taken, so
    /// multi-word names are cut at the first space.
    pub fn extract_prefix(&self, text: &str) -> Option<CountyKey> {
        let captures = self.prefix.captures(text)?;
        CountyKey::new(captures.get(1)?.as_str())
    }

    pub fn normalize(&self, text: &str, mode: NormalizeMode) -> Option<CountyKey> {
        match mode {
            NormalizeMode::Prefix => self.extract_prefix(text),
            NormalizeMode::SuffixStrip => suffix_key(text),
            NormalizeMode::PrefixOrSuffix => {
                self.extract_prefix(text).or_else(|| suffix_key(text))
            }
        }
    }
}

/// Remove at most one trailing qualifier and trim.
///
/// `" City"` is tried before `" County"`, against the text with only its
/// trailing whitespace removed, so a bare `" City"` leaves nothing. Returns
/// `None` when nothing is left. Stripping is idempotent for labels carrying at most one qualifier;
/// a stacked label such as `"X City County"` loses one qualifier per call.
pub fn strip_suffix(text: &str) -> Option<String> {
    let body = text.trim_end();
    let stripped = COUNTY_QUALIFIERS
        .iter()
        .find_map(|qualifier| body.strip_suffix(qualifier))
        .unwrap_or(body)
        .trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Suffix-stripped label as a canonical key.
pub fn suffix_key(text: &str) -> Option<CountyKey> {
    CountyKey::new(&strip_suffix(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii() -> Normalizer {
        Normalizer::new(PrefixPattern::Ascii).unwrap()
    }

    #[test]
    fn prefix_extracts_county_after_marker() {
        let n = ascii();
        assert_eq!(
            n.extract_prefix("Athlone, Co. Westmeath").unwrap().as_str(),
            "Westmeath"
        );
        assert_eq!(n.extract_prefix("Mallow Co Cork").unwrap().as_str(), "Cork");
        assert!(n.extract_prefix("All driving test centres").is_none());
        assert!(n.extract_prefix("Cobh").is_none());
    }

    #[test]
    fn ascii_prefix_cuts_accented_names() {
        let n = ascii();
        assert_eq!(
            n.extract_prefix("Deansgrange, Co. Dún Laoghaire").unwrap().as_str(),
            "D"
        );
    }

    #[test]
    fn unicode_prefix_keeps_accents_and_hyphens() {
        let n = Normalizer::new(PrefixPattern::Unicode).unwrap();
        assert_eq!(
            n.extract_prefix("Deansgrange, Co. Dún Laoghaire").unwrap().as_str(),
            "Dún"
        );
        assert_eq!(
            n.extract_prefix("Co. Dún-Laoghaire").unwrap().as_str(),
            "Dún-Laoghaire"
        );
    }

    #[test]
    fn suffix_strip_removes_one_qualifier() {
        assert_eq!(strip_suffix("Cork City").as_deref(), Some("Cork"));
        assert_eq!(strip_suffix("Cork").as_deref(), Some("Cork"));
        assert_eq!(strip_suffix(" Galway County ").as_deref(), Some("Galway"));
        assert_eq!(strip_suffix("X City County").as_deref(), Some("X City"));
        assert_eq!(strip_suffix("   ").as_deref(), None);
        assert_eq!(strip_suffix("City").as_deref(), Some("City"));
    }

    #[test]
    fn bare_qualifier_strips_to_nothing() {
        assert_eq!(strip_suffix(" City"), None);
        assert_eq!(strip_suffix(" County  "), None);
        assert!(suffix_key(" City").is_none());
    }

    #[test]
    fn repeated_marker_uses_first_match() {
        let n = ascii();
        assert_eq!(n.extract_prefix("Co. Cork and Co. Kerry").unwrap().as_str(), "Cork");
        assert_eq!(
            n.normalize("Mallow, Co. Cork / Co. Kerry", NormalizeMode::Prefix)
                .unwrap()
                .as_str(),
            "Cork"
        );
    }

    #[test]
    fn prefix_or_suffix_falls_back() {
        let n = ascii();
        assert_eq!(
            n.normalize("Co. Kerry", NormalizeMode::PrefixOrSuffix)
                .unwrap()
                .as_str(),
            "Kerry"
        );
        assert_eq!(
            n.normalize("Dublin City", NormalizeMode::PrefixOrSuffix)
                .unwrap()
                .as_str(),
            "Dublin"
        );
        assert!(n.normalize("Dublin City", NormalizeMode::Prefix).is_none());
    }
}
