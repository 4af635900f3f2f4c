//! Application to Profile Bindings
//!
//! Maps application package identifiers to profile ids. The switch engine
//! only reads the mapping; ownership (and the surface that edits it) sits
//! with the embedder.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::config::ProfileId;

/// Read-only lookup consumed by the profile switch engine
pub trait ProfileBindings: Send + Sync {
    /// Profile bound to a package, or `None` if unassigned
    fn profile_for(&self, package: &str) -> Option<ProfileId>;
}

/// Mutable binding table shared between the configuration surface and the
/// switch engine
#[derive(Default)]
pub struct BindingTable {
    map: RwLock<HashMap<String, ProfileId>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a package to a profile, replacing any previous binding
    pub fn bind(&self, package: &str, profile: ProfileId) {
        self.map.write().insert(package.to_string(), profile);
    }

    /// Remove a package's binding (back to unassigned)
    pub fn unbind(&self, package: &str) {
        self.map.write().remove(package);
    }

    /// Snapshot of all current bindings
    pub fn bindings(&self) -> Vec<(String, ProfileId)> {
        self.map
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

impl ProfileBindings for BindingTable {
    fn profile_for(&self, package: &str) -> Option<ProfileId> {
        self.map.read().get(package).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_lookup() {
        let table = BindingTable::new();
        table.bind("com.example.player", 2);

        assert_eq!(table.profile_for("com.example.player"), Some(2));
        assert_eq!(table.profile_for("com.other.app"), None);
    }

    #[test]
    fn test_rebind_replaces() {
        let table = BindingTable::new();
        table.bind("com.example.player", 2);
        table.bind("com.example.player", 3);

        assert_eq!(table.profile_for("com.example.player"), Some(3));
        assert_eq!(table.bindings().len(), 1);
    }

    #[test]
    fn test_unbind() {
        let table = BindingTable::new();
        table.bind("com.example.player", 1);
        table.unbind("com.example.player");

        assert_eq!(table.profile_for("com.example.player"), None);

        // Unbinding an absent package is a no-op
        table.unbind("com.missing");
    }
}
