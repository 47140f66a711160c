//! # Repository Records
//!
//! The data fetched from the code-hosting platform. A `RepositoryRecord` is
//! created once per search result entry and never mutated afterwards, apart
//! from the fetcher attaching its language map before handing it on.
//!
//! Fields the inventory pipeline does not interpret are kept verbatim in
//! `extra` as `HostVar` values so they can be passed through as host
//! variables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a repository, used as the inventory host key.
///
/// GitHub uses numeric ids; other sources may hand out strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryId::Number(n) => write!(f, "{}", n),
            RepositoryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RepositoryId {
    fn from(id: u64) -> Self {
        RepositoryId::Number(id)
    }
}

impl From<&str> for RepositoryId {
    fn from(id: &str) -> Self {
        RepositoryId::Text(id.to_string())
    }
}

/// A host variable value.
///
/// Mirrors the shapes a JSON document can hold, so any field of a repository
/// record can be assigned to a host without losing structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostVar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<HostVar>),
    Map(BTreeMap<String, HostVar>),
}

impl HostVar {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostVar::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for HostVar {
    fn from(value: &str) -> Self {
        HostVar::Str(value.to_string())
    }
}

impl From<String> for HostVar {
    fn from(value: String) -> Self {
        HostVar::Str(value)
    }
}

impl From<bool> for HostVar {
    fn from(value: bool) -> Self {
        HostVar::Bool(value)
    }
}

impl From<i64> for HostVar {
    fn from(value: i64) -> Self {
        HostVar::Int(value)
    }
}

impl From<u64> for HostVar {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(HostVar::Int)
            .unwrap_or(HostVar::Float(value as f64))
    }
}

impl From<&RepositoryId> for HostVar {
    fn from(id: &RepositoryId) -> Self {
        match id {
            RepositoryId::Number(n) => HostVar::from(*n),
            RepositoryId::Text(s) => HostVar::Str(s.clone()),
        }
    }
}

impl<T: Into<HostVar>> From<Vec<T>> for HostVar {
    fn from(values: Vec<T>) -> Self {
        HostVar::List(values.into_iter().map(Into::into).collect())
    }
}

/// One repository as returned by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: RepositoryId,
    pub name: String,
    /// Topics in the order the API returned them.
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub archived: bool,
    /// Language name to byte count.
    ///
    /// `None` means enrichment was not requested, which is different from an
    /// empty map.
    #[serde(default)]
    pub languages: Option<BTreeMap<String, u64>>,
    /// Every other field of the API entry, passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, HostVar>,
}

impl RepositoryRecord {
    pub fn new(id: impl Into<RepositoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topics: Vec::new(),
            archived: false,
            languages: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        self.languages = Some(
            languages
                .into_iter()
                .map(|(name, bytes)| (name.into(), bytes))
                .collect(),
        );
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<HostVar>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// The `owner/name` path of the repository.
    ///
    /// Taken from the API's `full_name` field when present; otherwise built
    /// from `owner`.
    pub fn full_name(&self, owner: &str) -> String {
        self.extra
            .get("full_name")
            .and_then(HostVar::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/{}", owner, self.name))
    }

    /// The host key of this repository in the inventory.
    pub fn host_key(&self) -> String {
        self.id.to_string()
    }

    /// Every field of the record as host variables.
    pub fn host_vars(&self) -> BTreeMap<String, HostVar> {
        let mut vars = self.extra.clone();
        vars.insert("id".to_string(), HostVar::from(&self.id));
        vars.insert("name".to_string(), HostVar::from(self.name.as_str()));
        vars.insert("topics".to_string(), HostVar::from(self.topics.clone()));
        vars.insert("archived".to_string(), HostVar::Bool(self.archived));
        let languages = match &self.languages {
            Some(map) => HostVar::Map(
                map.iter()
                    .map(|(lang, bytes)| (lang.clone(), HostVar::from(*bytes)))
                    .collect(),
            ),
            None => HostVar::Null,
        };
        vars.insert("languages".to_string(), languages);
        vars
    }
}
