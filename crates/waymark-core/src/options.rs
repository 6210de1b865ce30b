#![forbid(unsafe_code)]

//! Layered option sets and the compact option mini-language.
//!
//! Every component resolves its options by stacking four layers, lowest
//! priority first:
//!
//! 1. the component's compiled defaults,
//! 2. the guide-wide options, section keyed by component id,
//! 3. the owning tour's options, section keyed by component id,
//! 4. the component's own overrides.
//!
//! Merging is shallow per key. Resolution clones into a fresh set and
//! never touches the layers it reads from.
//!
//! # Mini-language
//!
//! ```text
//! placement:overlay, marker.position:right | autoScroll:false
//! ```
//!
//! Pairs are separated by `,` or `|`. Whitespace around keys and after the
//! colon is ignored. `true`/`false` become booleans, finite numerics become
//! numbers, everything else stays a string. Dotted keys build nested sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Str(String),
    Map(OptionSet),
}

impl OptionValue {
    /// Coerce a raw mini-language token.
    #[must_use]
    pub fn coerce(token: &str) -> Self {
        match token {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        match token.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Str(token.to_owned()),
        }
    }

    /// Truthiness: `false`, `0`, `""` are off; everything else is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Map(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OptionSet> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
            Self::Map(m) => write!(f, "{{{} keys}}", m.len()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<OptionSet> for OptionValue {
    fn from(v: OptionSet) -> Self {
        Self::Map(v)
    }
}

/// Malformed mini-language input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// A pair had no `:` separator.
    MissingSeparator(String),
    /// A pair had an empty key (or an empty dotted segment).
    EmptyKey(String),
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator(pair) => write!(f, "option pair '{pair}' has no ':'"),
            Self::EmptyKey(pair) => write!(f, "option pair '{pair}' has an empty key"),
        }
    }
}

impl std::error::Error for OptionError {}

/// A string-keyed mapping of option values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    entries: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the mini-language.
    pub fn parse(input: &str) -> Result<Self, OptionError> {
        let mut set = Self::new();
        for pair in input.split([',', '|']) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once(':') else {
                return Err(OptionError::MissingSeparator(pair.to_owned()));
            };
            let key = key.trim();
            if key.is_empty() || key.split('.').any(|seg| seg.trim().is_empty()) {
                return Err(OptionError::EmptyKey(pair.to_owned()));
            }
            set.set_path(key, OptionValue::coerce(value.trim()));
        }
        Ok(set)
    }

    /// Builder form of [`OptionSet::set_path`].
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<OptionValue>) -> Self {
        self.set_path(path, value.into());
        self
    }

    /// Assign through a dotted path, creating intermediate sets as needed.
    ///
    /// Only the terminal key is overwritten; a non-map intermediate is
    /// replaced by a fresh set.
    pub fn set_path(&mut self, path: &str, value: OptionValue) {
        match path.split_once('.') {
            None => {
                self.entries.insert(path.trim().to_owned(), value);
            }
            Some((head, rest)) => {
                let slot = self
                    .entries
                    .entry(head.trim().to_owned())
                    .or_insert_with(|| OptionValue::Map(OptionSet::new()));
                if !matches!(slot, OptionValue::Map(_)) {
                    *slot = OptionValue::Map(OptionSet::new());
                }
                if let OptionValue::Map(inner) = slot {
                    inner.set_path(rest, value);
                }
            }
        }
    }

    /// Read through a dotted path. Missing segments yield `None`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&OptionValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut value = self.entries.get(first.trim())?;
        for seg in segments {
            value = value.as_map()?.entries.get(seg.trim())?;
        }
        Some(value)
    }

    /// Whether a dotted path resolves to any value.
    #[must_use]
    pub fn has_option(&self, path: &str) -> bool {
        self.get_path(path).is_some()
    }

    /// Whether a dotted path resolves to a truthy value.
    #[must_use]
    pub fn is_option_on(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(OptionValue::is_on)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get_path(path).and_then(OptionValue::as_bool)
    }

    #[must_use]
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get_path(path).and_then(OptionValue::as_f64)
    }

    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(OptionValue::as_str)
    }

    /// Nested set stored under `key`, if it is a map.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<&OptionSet> {
        self.get_path(key).and_then(OptionValue::as_map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.entries.remove(key)
    }

    /// Shallow merge: every key of `other` replaces the same key here.
    pub fn merge(&mut self, other: &OptionSet) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for OptionSet {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            let key: String = k.into();
            set.set_path(&key, v.into());
        }
        set
    }
}

/// Merge the four option layers for one component.
///
/// `global` and `container` are the *whole* guide-level and tour-level
/// sets; the section named `component` is picked out of each.
#[must_use]
pub fn resolve(
    component: &str,
    defaults: &OptionSet,
    global: Option<&OptionSet>,
    container: Option<&OptionSet>,
    own: Option<&OptionSet>,
) -> OptionSet {
    let mut out = defaults.clone();
    for layer in [
        global.and_then(|g| g.section(component)),
        container.and_then(|c| c.section(component)),
        own,
    ]
    .into_iter()
    .flatten()
    {
        out.merge(layer);
    }
    out
}

/// Anything that resolves a layered option set and can be switched off.
pub trait Optionable {
    /// Component id used to pick this component's section out of the
    /// guide-level and tour-level sets.
    fn component_id(&self) -> &str;

    /// Fully merged options.
    fn resolved_options(&self) -> &OptionSet;

    /// Whether the component is enabled (`enabled` defaults to on).
    fn is_enabled(&self) -> bool {
        self.resolved_options()
            .get_path("enabled")
            .is_none_or(OptionValue::is_on)
    }
}
