//! Participant identities and the name resolution seam
//!
//! Free-text labels ("ana", "Ana S.", "  Ana ") are reduced to one canonical
//! identity by an external resolver (fuzzy matching lives outside this
//! workspace). The engine only ever sees the resolved identities.

use std::collections::HashMap;

/// Canonical string naming one participant
pub type Identity = String;

/// Maps an arbitrary raw label to a canonical identity
///
/// A total function: labels that cannot be resolved yield `None` and are
/// dropped by the caller, never passed on to the engine.
pub trait IdentityResolver {
    fn resolve(&self, raw: &str) -> Option<Identity>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&str) -> Option<Identity>,
{
    fn resolve(&self, raw: &str) -> Option<Identity> {
        self(raw)
    }
}

/// Exact-match lookup table produced by the external resolver
///
/// Holds two kinds of entries:
/// - aliases: raw label → canonical name, as reported by the resolver
/// - participants: canonical names that resolve to themselves (every voter)
///
/// Lookups try the label verbatim first, then with surrounding whitespace
/// trimmed. Blank labels never resolve.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: HashMap<String, Identity>,
}

impl NameMap {
    /// Create an empty name map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a name map from resolver output (raw label → canonical name)
    pub fn from_aliases<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (raw, canonical) in aliases {
            map.insert_alias(raw, canonical);
        }
        map
    }

    /// Record that `raw` resolves to `canonical`
    ///
    /// Blank canonical names are ignored.
    pub fn insert_alias(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        let canonical = canonical.into().trim().to_string();
        if canonical.is_empty() {
            return;
        }
        self.entries.insert(raw.into(), canonical);
    }

    /// Register a participant whose own name is canonical
    ///
    /// Overrides any alias previously recorded for the same label.
    pub fn register_participant(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.entries.insert(name.to_string(), name.to_string());
    }

    /// Builder-style variant of [`NameMap::register_participant`]
    pub fn with_participants<'a, I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.register_participant(name);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityResolver for NameMap {
    fn resolve(&self, raw: &str) -> Option<Identity> {
        if let Some(canonical) = self.entries.get(raw) {
            return Some(canonical.clone());
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.entries.get(trimmed).cloned()
    }
}
