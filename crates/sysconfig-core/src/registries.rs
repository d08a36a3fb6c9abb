//! Registry entries and the `registries.conf` document.
//!
//! The runtime reads this file on every image pull, so the model keeps a
//! stable ordering of entries: new registries are appended, never
//! reordered, and entries are never dropped once created.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;

/// Registries searched for unqualified image names when nothing else is
/// configured.
pub const DEFAULT_SEARCH_REGISTRIES: [&str; 2] = ["registry.access.redhat.com", "docker.io"];

/// A single `[[registry]]` block.
///
/// The access flags are tri-state in the rendered file: a flag is either
/// absent or `true`. The model never stores an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    location: String,

    prefix: String,

    #[serde(rename = "mirror")]
    mirrors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    blocked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    allowed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    insecure: Option<bool>,
}

impl RegistryEntry {
    /// Creates an entry with no mirrors and no access flags.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Registry location, the unique key of the entry.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Prefix used by the runtime to match image references.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ordered mirror locations.
    #[must_use]
    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// `Some(true)` if pulls from this registry are explicitly allowed.
    #[must_use]
    pub const fn allowed(&self) -> Option<bool> {
        self.allowed
    }

    /// `Some(true)` if pulls from this registry are blocked.
    #[must_use]
    pub const fn blocked(&self) -> Option<bool> {
        self.blocked
    }

    /// `Some(true)` if the registry may be reached without TLS verification.
    #[must_use]
    pub const fn insecure(&self) -> Option<bool> {
        self.insecure
    }

    /// Replaces the mirror list wholesale.
    pub fn set_mirrors(&mut self, mirrors: Vec<String>) {
        self.mirrors = mirrors;
    }

    /// Empties the mirror list.
    pub fn clear_mirrors(&mut self) {
        self.mirrors.clear();
    }

    /// Marks the registry allowed. Clears any block.
    pub fn allow(&mut self) {
        self.allowed = Some(true);
        self.blocked = None;
    }

    /// Marks the registry blocked. Clears any allow.
    pub fn block(&mut self) {
        self.allowed = None;
        self.blocked = Some(true);
    }

    /// Marks the registry insecure.
    pub fn mark_insecure(&mut self) {
        self.insecure = Some(true);
    }

    /// Unsets allowed, blocked and insecure.
    pub fn reset_access(&mut self) {
        self.allowed = None;
        self.blocked = None;
        self.insecure = None;
    }
}

/// The whole `registries.conf` document.
///
/// `index` maps a location to its position in `registries`. Entries are
/// only ever appended, so positions stay valid for the life of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistriesModel {
    #[serde(rename = "unqualified-search-registries")]
    unqualified_search_registries: Vec<String>,

    #[serde(rename = "short-name-mode")]
    short_name_mode: String,

    #[serde(rename = "registry")]
    registries: Vec<RegistryEntry>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Default for RegistriesModel {
    fn default() -> Self {
        Self {
            unqualified_search_registries: DEFAULT_SEARCH_REGISTRIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            short_name_mode: String::new(),
            registries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl RegistriesModel {
    /// Registries searched for unqualified image names.
    #[must_use]
    pub fn unqualified_search_registries(&self) -> &[String] {
        &self.unqualified_search_registries
    }

    /// Short-name resolution mode; empty means the runtime default.
    #[must_use]
    pub fn short_name_mode(&self) -> &str {
        &self.short_name_mode
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.registries
    }

    /// Number of known registries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    /// Returns true if no registry has been configured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Looks up an entry by location.
    #[must_use]
    pub fn get(&self, location: &str) -> Option<&RegistryEntry> {
        self.index.get(location).map(|&pos| &self.registries[pos])
    }

    /// Looks up an entry by location for mutation.
    pub fn get_mut(&mut self, location: &str) -> Option<&mut RegistryEntry> {
        match self.index.get(location) {
            Some(&pos) => self.registries.get_mut(pos),
            None => None,
        }
    }

    /// Returns the entry for `location`, appending a fresh one if absent.
    pub fn get_or_create(&mut self, location: &str) -> &mut RegistryEntry {
        let pos = match self.index.get(location) {
            Some(&pos) => pos,
            None => {
                self.registries.push(RegistryEntry::new(location));
                let pos = self.registries.len() - 1;
                self.index.insert(location.to_string(), pos);
                pos
            }
        };
        &mut self.registries[pos]
    }

    /// Unsets the access flags on every entry.
    pub fn reset_access(&mut self) {
        for entry in &mut self.registries {
            entry.reset_access();
        }
    }

    /// Empties the mirror list of every entry.
    pub fn clear_all_mirrors(&mut self) {
        for entry in &mut self.registries {
            entry.clear_mirrors();
        }
    }

    /// Returns true if some entry is allowed and some (possibly other)
    /// entry is blocked.
    #[must_use]
    pub fn has_allowed_and_blocked(&self) -> bool {
        let any_allowed = self.registries.iter().any(|e| e.allowed.is_some());
        let any_blocked = self.registries.iter().any(|e| e.blocked.is_some());
        any_allowed && any_blocked
    }

    /// Renders the document as `registries.conf` TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
