//! Dynamic metadata values.
//!
//! Front matter carries loosely typed values; they are converted into the
//! [`MetaValue`] variant eagerly at extraction time so the resolver's typed
//! accessors can pattern-match instead of juggling untyped data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rustc_hash::FxHashMap;

use super::MetaError;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Date(DateTime<Utc>),
    List(Vec<String>),
}

impl MetaValue {
    /// Convert a YAML scalar or string sequence.
    ///
    /// Nested mappings are flattened to their YAML string form; extractors
    /// only promise scalars and lists.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Bool(b) => Self::Bool(*b),
            serde_yaml::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Str(n.to_string()), Self::Int),
            serde_yaml::Value::String(s) => Self::Str(s.clone()),
            serde_yaml::Value::Sequence(seq) => {
                Self::List(seq.iter().map(yaml_scalar_to_string).collect())
            }
            serde_yaml::Value::Null => Self::Str(String::new()),
            other => Self::Str(yaml_scalar_to_string(other)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Date(_) => "date",
            Self::List(_) => "list",
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
}

// ============================================================================
// Metadata Map
// ============================================================================

/// Case-insensitive field map. Keys are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaMap {
    fields: FxHashMap<String, MetaValue>,
}

impl MetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: MetaValue) {
        self.fields.insert(key.to_lowercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl FromIterator<(String, MetaValue)> for MetaMap {
    fn from_iter<T: IntoIterator<Item = (String, MetaValue)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(&k, v);
        }
        map
    }
}

// ============================================================================
// Fallback-Chained Lookup
// ============================================================================

/// Field reader over a primary (content-declared) map with a filesystem
/// fallback. Every read checks the primary map first.
pub struct FallbackChain<'a> {
    primary: &'a MetaMap,
    fallback: &'a MetaMap,
    /// File path used in error messages.
    path: &'a str,
}

impl<'a> FallbackChain<'a> {
    pub fn new(primary: &'a MetaMap, fallback: &'a MetaMap, path: &'a str) -> Self {
        Self {
            primary,
            fallback,
            path,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.primary.get(key).or_else(|| self.fallback.get(key))
    }

    /// Read a field as a string; non-string scalars are stringified.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            MetaValue::Str(s) => Some(s.clone()),
            MetaValue::Int(i) => Some(i.to_string()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Date(d) => Some(d.to_rfc3339()),
            MetaValue::List(items) => Some(items.join(", ")),
        }
    }

    /// Read a field as a string, requiring it to be present and non-empty.
    pub fn required_string(&self, key: &str) -> Result<String, MetaError> {
        match self.string(key) {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(MetaError::MissingField {
                field: key.to_string(),
                path: self.path.to_string(),
            }),
        }
    }

    /// Read a boolean: accepts `Bool` or the exact strings `"true"`/`"false"`.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, MetaError> {
        match self.get(key) {
            None => Ok(None),
            Some(MetaValue::Bool(b)) => Ok(Some(*b)),
            Some(MetaValue::Str(s)) if s == "true" => Ok(Some(true)),
            Some(MetaValue::Str(s)) if s == "false" => Ok(Some(false)),
            Some(other) => Err(self.mismatch(key, "boolean", other)),
        }
    }

    /// Read a date: accepts `Date` or a parseable string.
    ///
    /// An empty or whitespace-only string parses to "absent".
    pub fn date(&self, key: &str) -> Result<Option<DateTime<Utc>>, MetaError> {
        match self.get(key) {
            None => Ok(None),
            Some(MetaValue::Date(d)) => Ok(Some(*d)),
            Some(MetaValue::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(MetaValue::Str(s)) => parse_date(s)
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "date", &MetaValue::Str(s.clone()))),
            Some(other) => Err(self.mismatch(key, "date", other)),
        }
    }

    /// Read a date, requiring it to be present.
    pub fn required_date(&self, key: &str) -> Result<DateTime<Utc>, MetaError> {
        self.date(key)?.ok_or_else(|| MetaError::MissingField {
            field: key.to_string(),
            path: self.path.to_string(),
        })
    }

    /// Read a number: accepts `Int` or a numeric string.
    pub fn number(&self, key: &str) -> Result<Option<i64>, MetaError> {
        match self.get(key) {
            None => Ok(None),
            Some(MetaValue::Int(i)) => Ok(Some(*i)),
            Some(MetaValue::Str(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.mismatch(key, "number", &MetaValue::Str(s.clone()))),
            Some(other) => Err(self.mismatch(key, "number", other)),
        }
    }

    /// Read a number, requiring it to be present.
    pub fn required_number(&self, key: &str) -> Result<i64, MetaError> {
        self.number(key)?.ok_or_else(|| MetaError::MissingField {
            field: key.to_string(),
            path: self.path.to_string(),
        })
    }

    /// Read a tag list: accepts a list or a single string.
    ///
    /// Output is always sorted case-insensitively regardless of input order.
    pub fn tags(&self, key: &str) -> Result<Vec<String>, MetaError> {
        let mut tags = match self.get(key) {
            None => Vec::new(),
            Some(MetaValue::List(items)) => items.clone(),
            Some(MetaValue::Str(s)) => vec![s.clone()],
            Some(other) => return Err(self.mismatch(key, "list of strings", other)),
        };
        tags.sort_by_key(|t| t.to_lowercase());
        Ok(tags)
    }

    fn mismatch(&self, key: &str, expected: &'static str, got: &MetaValue) -> MetaError {
        MetaError::TypeMismatch {
            field: key.to_string(),
            expected,
            got: got.type_name(),
            path: self.path.to_string(),
        }
    }
}

/// Parse an ISO-ish date string.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
