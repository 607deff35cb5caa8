use crate::error::Error;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

/// Label under which keyword, pattern and custom strategies collect
/// addresses that no rule claimed.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Ordered mapping from category label to the addresses assigned to it.
///
/// Labels keep the order in which they were first created; each address list
/// keeps assignment order.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map pre-seeded with empty categories, in the given order.
    pub fn with_labels(labels: &[&str]) -> Self {
        let mut map = Self::new();
        for label in labels {
            map.slot(label);
        }
        map
    }

    pub fn push(&mut self, label: &str, email: impl Into<String>) {
        let idx = self.slot(label);
        self.entries[idx].1.push(email.into());
    }

    fn slot(&mut self, label: &str) -> usize {
        if let Some(idx) = self.index.get(label) {
            return *idx;
        }
        self.entries.push((label.to_string(), Vec::new()));
        let idx = self.entries.len() - 1;
        self.index.insert(label.to_string(), idx);
        idx
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.index
            .get(label)
            .map(|idx| self.entries[*idx].1.as_slice())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(label, emails)| (label.as_str(), emails.as_slice()))
    }

    /// Number of categories, including empty ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of addresses across all categories.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, emails)| emails.len()).sum()
    }
}

impl PartialEq for CategoryMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for CategoryMap {}

impl FromIterator<(String, Vec<String>)> for CategoryMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        let mut map = CategoryMap::new();
        for (label, emails) in iter {
            let idx = map.slot(&label);
            map.entries[idx].1.extend(emails);
        }
        map
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, emails) in &self.entries {
            map.serialize_entry(label, emails)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = deserializer.deserialize_map(OrderedVisitor::<Vec<String>>::new())?;
        Ok(entries.into_iter().collect())
    }
}

/// Per-category address counts, in the order of the map they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics(Vec<(String, usize)>);

impl Statistics {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&CategoryMap> for Statistics {
    fn from(map: &CategoryMap) -> Self {
        Statistics(
            map.iter()
                .map(|(label, emails)| (label.to_string(), emails.len()))
                .collect(),
        )
    }
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Statistics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedVisitor::<usize>::new())
            .map(Statistics)
    }
}

struct OrderedVisitor<V>(PhantomData<V>);

impl<V> OrderedVisitor<V> {
    fn new() -> Self {
        OrderedVisitor(PhantomData)
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map keyed by category label")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((label, value)) = access.next_entry::<String, V>()? {
            out.push((label, value));
        }
        Ok(out)
    }
}

/// How the engine should interpret a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Text,
    File,
    Files,
    Directory,
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SourceType::Text),
            "file" => Ok(SourceType::File),
            "files" => Ok(SourceType::Files),
            "directory" => Ok(SourceType::Directory),
            other => Err(Error::InvalidArgument(format!(
                "invalid source type: {other}. Must be one of: 'text', 'file', 'files', 'directory'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    Path(PathBuf),
    Paths(Vec<PathBuf>),
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::Text(s.to_string())
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Source::Text(s)
    }
}

impl From<PathBuf> for Source {
    fn from(p: PathBuf) -> Self {
        Source::Path(p)
    }
}

impl From<Vec<PathBuf>> for Source {
    fn from(paths: Vec<PathBuf>) -> Self {
        Source::Paths(paths)
    }
}

/// Categorization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Domain,
    Type,
    Keywords,
    Pattern,
    Custom,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Domain => "domain",
            Method::Type => "type",
            Method::Keywords => "keywords",
            Method::Pattern => "pattern",
            Method::Custom => "custom",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(Method::Domain),
            "type" => Ok(Method::Type),
            "keywords" => Ok(Method::Keywords),
            "pattern" => Ok(Method::Pattern),
            "custom" => Ok(Method::Custom),
            other => Err(Error::InvalidArgument(format!(
                "invalid method: {other}. Must be one of: 'domain', 'type', 'keywords', 'pattern', 'custom'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        KeywordRule {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub label: String,
    pub pattern: String,
}

impl PatternRule {
    pub fn new(label: &str, pattern: &str) -> Self {
        PatternRule {
            label: label.to_string(),
            pattern: pattern.to_string(),
        }
    }
}
