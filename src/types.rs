use crate::error::{GenQuakemlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

static PICK_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pick(\d+)_([A-Za-z_]+)$").expect("valid pick key regex"));

/// Split `pick3_station` into `(3, "station")`
pub fn split_pick_key(key: &str) -> Option<(u32, &str)> {
    let captures = PICK_KEY_RE.captures(key)?;
    let index = captures.get(1)?.as_str().parse().ok()?;
    Some((index, captures.get(2)?.as_str()))
}

/// Flat field-name to raw-value mapping that flows through the parse,
/// normalize and derive stages. Keys are case-sensitive as written in the
/// input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the key was already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }

    /// Present and non-empty after trimming
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.fields.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pick numbers mentioned anywhere in the record, ascending
    pub fn pick_indices(&self) -> BTreeSet<u32> {
        self.keys()
            .filter_map(split_pick_key)
            .map(|(index, _)| index)
            .collect()
    }

    /// Required string field
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get_non_empty(key)
            .ok_or_else(|| GenQuakemlError::missing(key))
    }

    /// Required finite floating point field
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        let raw = self.require(key)?;
        parse_f64(key, raw)
    }

    /// Optional floating point field; present-but-malformed is still an error
    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get_non_empty(key).map(|raw| parse_f64(key, raw)).transpose()
    }

    /// Optional non-negative integer field
    pub fn optional_u32(&self, key: &str) -> Result<Option<u32>> {
        self.get_non_empty(key)
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| {
                    GenQuakemlError::validation(
                        key,
                        format!("'{}' is not a non-negative integer", raw),
                    )
                })
            })
            .transpose()
    }
}

fn parse_f64(key: &str, raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(GenQuakemlError::validation(
            key,
            format!("'{}' is not a finite number", raw),
        )),
    }
}

impl FromIterator<(String, String)> for EventRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for EventRecord {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}
