use std::collections::HashMap;

use crate::artifacts::ArtifactError;
use crate::models::role::normalize_role;

/// Ordered, deduplicated list of canonical role names.
///
/// Position `i` here is position `i` in the `EmbeddingIndex`; the resolver
/// maps search hits back to names through this ordering.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RoleCatalog {
    /// Builds a catalog from raw names, normalizing each one.
    /// Rejects blank names and names that collide after normalization.
    pub fn new<I, S>(raw_roles: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = Vec::new();
        let mut positions = HashMap::new();

        for raw in raw_roles {
            let role = normalize_role(raw.as_ref());
            if role.is_empty() {
                return Err(ArtifactError::Invalid(format!(
                    "catalog entry {} is blank",
                    roles.len()
                )));
            }
            if let Some(first) = positions.get(&role) {
                return Err(ArtifactError::Invalid(format!(
                    "catalog entry {} duplicates entry {first} ('{role}')",
                    roles.len()
                )));
            }
            positions.insert(role.clone(), roles.len());
            roles.push(role);
        }

        Ok(Self { roles, positions })
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Catalog position of an already-normalized role name.
    pub fn position(&self, role: &str) -> Option<usize> {
        self.positions.get(role).copied()
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.roles.get(position).map(String::as_str)
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Role names in alphabetical order, for listing to users.
    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.roles.clone();
        sorted.sort();
        sorted
    }
}
