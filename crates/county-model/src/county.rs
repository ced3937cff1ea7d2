//! Canonical county identifiers.
//!
//! Every source table names counties slightly differently ("CORK", " cork ",
//! "Cork"). A [`CountyKey`] is the single canonical spelling used as the join
//! key between aggregated tables and the boundary dataset: title-cased with
//! surrounding whitespace removed and inner whitespace collapsed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical, case/whitespace-normalized county name.
///
/// Construction always canonicalizes, so two keys built from spellings that
/// differ only in case or whitespace compare equal.
///
/// # Example
///
/// ```
/// use county_model::CountyKey;
///
/// let a = CountyKey::new("  westmeath ").unwrap();
/// let b = CountyKey::new("WESTMEATH").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "Westmeath");
/// assert!(CountyKey::new("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountyKey(String);

impl CountyKey {
    /// Canonicalize `raw` into a key. Returns `None` when nothing but
    /// whitespace remains.
    pub fn new(raw: &str) -> Option<Self> {
        let canonical = canonicalize(raw);
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CountyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CountyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountyKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("empty county key: {value:?}"))
    }
}

impl From<CountyKey> for String {
    fn from(key: CountyKey) -> Self {
        key.0
    }
}

/// Canonical comparison form: trimmed, inner whitespace collapsed to single
/// spaces, title-cased.
pub fn canonicalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Title-case a string: the first letter of every alphabetic run is
/// uppercased and the remaining letters lowercased.
///
/// Non-letters (spaces, hyphens, apostrophes) start a new run, so
/// `"dún laoghaire-rathdown"` becomes `"Dún Laoghaire-Rathdown"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(ch);
            previous_alpha = false;
        }
    }
    out
}
