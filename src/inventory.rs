//! # Inventory Sink
//!
//! The populator writes groups, hosts and host variables through the
//! [`InventorySink`] trait. [`Inventory`] is the in-memory implementation the
//! binary uses; it renders the JSON document Ansible expects from a dynamic
//! inventory executable.
//!
//! Group and host creation is idempotent: adding something that already
//! exists is a no-op and leaves existing variables alone.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::HostVar;

/// Destination of inventory mutations.
pub trait InventorySink {
    /// Creates `group` unless it exists.
    fn add_group(&mut self, group: &str) -> Result<()>;

    /// Creates `host` unless it exists and makes it a member of `group`.
    ///
    /// The group must exist.
    fn add_host(&mut self, host: &str, group: &str) -> Result<()>;

    /// Sets one variable on an existing host, replacing any previous value.
    fn set_variable(&mut self, host: &str, key: &str, value: HostVar) -> Result<()>;
}

/// Top-level keys of the `--list` document that a group must not shadow.
pub const RESERVED_GROUP_NAMES: [&str; 2] = ["_meta", "all"];

/// Checks that `name` is usable as a group name.
pub fn validate_group_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("group name is empty".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("group name '{}' contains whitespace", name));
    }
    if RESERVED_GROUP_NAMES.contains(&name) {
        return Err(format!("group name '{}' is reserved", name));
    }
    Ok(())
}

/// In-memory inventory: groups with their hosts, and per-host variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    groups: BTreeMap<String, BTreeSet<String>>,
    hosts: BTreeMap<String, BTreeMap<String, HostVar>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Hosts of `group`, sorted. Empty when the group does not exist.
    pub fn hosts_in(&self, group: &str) -> Vec<&str> {
        self.groups
            .get(group)
            .map(|hosts| hosts.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Groups `host` belongs to, sorted.
    pub fn groups_of(&self, host: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, hosts)| hosts.contains(host))
            .map(|(group, _)| group.as_str())
            .collect()
    }

    pub fn host_vars(&self, host: &str) -> Option<&BTreeMap<String, HostVar>> {
        self.hosts.get(host)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The `--list` document.
    pub fn to_list_json(&self) -> Result<Value> {
        let mut doc = Map::new();

        let mut hostvars = Map::new();
        for (host, vars) in &self.hosts {
            hostvars.insert(host.clone(), serde_json::to_value(vars)?);
        }
        doc.insert("_meta".to_string(), json!({ "hostvars": hostvars }));

        let children: Vec<&String> = self.groups.keys().collect();
        doc.insert("all".to_string(), json!({ "children": children }));

        for (group, hosts) in &self.groups {
            doc.insert(group.clone(), json!({ "hosts": hosts }));
        }
        Ok(Value::Object(doc))
    }

    /// The `--host <host>` document. Unknown hosts get an empty object.
    pub fn host_vars_json(&self, host: &str) -> Result<Value> {
        match self.hosts.get(host) {
            Some(vars) => Ok(serde_json::to_value(vars)?),
            None => Ok(json!({})),
        }
    }
}

impl InventorySink for Inventory {
    fn add_group(&mut self, group: &str) -> Result<()> {
        validate_group_name(group).map_err(|message| Error::Population {
            host: String::new(),
            message,
        })?;
        self.groups.entry(group.to_string()).or_default();
        Ok(())
    }

    fn add_host(&mut self, host: &str, group: &str) -> Result<()> {
        let members = self.groups.get_mut(group).ok_or_else(|| Error::Population {
            host: host.to_string(),
            message: format!("group '{}' does not exist", group),
        })?;
        members.insert(host.to_string());
        self.hosts.entry(host.to_string()).or_default();
        Ok(())
    }

    fn set_variable(&mut self, host: &str, key: &str, value: HostVar) -> Result<()> {
        let vars = self.hosts.get_mut(host).ok_or_else(|| Error::Population {
            host: host.to_string(),
            message: format!("cannot set '{}' on unknown host", key),
        })?;
        vars.insert(key.to_string(), value);
        Ok(())
    }
}
