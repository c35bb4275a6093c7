//! Agent Profile Registry
//!
//! Holds the persona definitions the orchestrator can put on the floor.
//! Profiles are registered during bootstrap; the orchestrator seals the
//! registry when it is built, after which it is shared read-only.

use crate::error::{Error, Result};
use pcos_llm::ModelParams;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// A single agent persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique name; also the label used in transcripts and hand-off markers
    pub name: String,
    /// Short capability description shown to other agents
    #[serde(default)]
    pub description: String,
    /// System prompt
    pub system_prompt: String,
    /// Generation parameters passed through to the provider
    #[serde(default)]
    pub params: ModelParams,
}

impl AgentProfile {
    /// Create a profile with default generation parameters
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            params: ModelParams::default(),
        }
    }

    /// Set generation parameters
    #[must_use]
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }
}

/// Check that a name can appear in a hand-off marker
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Configuration("agent name must not be empty".to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::Configuration(format!(
            "agent name '{}' must contain only letters, digits and underscores",
            name
        )));
    }
    if name.eq_ignore_ascii_case("user") {
        return Err(Error::Configuration(
            "'user' is reserved for the human participant".to_string(),
        ));
    }
    Ok(())
}

/// Registry of agent profiles, in registration order
#[derive(Debug, Default)]
pub struct AgentRegistry {
    profiles: RwLock<Vec<AgentProfile>>,
    sealed: AtomicBool,
}

impl AgentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile
    pub fn register(&self, profile: AgentProfile) -> Result<()> {
        validate_name(&profile.name)?;

        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        // Checked under the write lock so it cannot interleave with `seal`
        if self.sealed.load(Ordering::Acquire) {
            return Err(Error::RegistrySealed(profile.name));
        }
        if profiles.iter().any(|p| p.name == profile.name) {
            return Err(Error::DuplicateName(profile.name));
        }

        debug!(agent = %profile.name, "Registered agent profile");
        profiles.push(profile);
        Ok(())
    }

    /// Look up a profile by exact name
    pub fn get(&self, name: &str) -> Result<AgentProfile> {
        self.read()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Look up a profile ignoring ASCII case
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<AgentProfile> {
        find_ignoring_case(&self.read(), name).cloned()
    }

    /// Snapshot of all profiles in registration order.
    ///
    /// The iterator is `Clone`, so it can be restarted without touching the
    /// registry again.
    pub fn list(&self) -> impl Iterator<Item = AgentProfile> + Clone {
        self.read().clone().into_iter()
    }

    /// Number of registered profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no profile is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Make the registry read-only. Idempotent.
    pub fn seal(&self) {
        let profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        if !self.sealed.swap(true, Ordering::AcqRel) {
            debug!(agents = profiles.len(), "Agent registry sealed");
        }
    }

    /// Whether `seal` has been called
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<AgentProfile>> {
        self.profiles.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Find a profile by name, ignoring ASCII case.
///
/// Shared by registry lookups and hand-off resolution so both accept the
/// same spellings.
pub(crate) fn find_ignoring_case<'a>(
    profiles: &'a [AgentProfile],
    name: &str,
) -> Option<&'a AgentProfile> {
    profiles.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> AgentProfile {
        AgentProfile::new(name, format!("{name} description"), format!("You are {name}."))
    }

    #[test]
    fn test_register_and_get() {
        let registry = AgentRegistry::new();
        registry.register(profile("Specialist")).unwrap();

        let found = registry.get("Specialist").unwrap();
        assert_eq!(found.system_prompt, "You are Specialist.");
        assert!(matches!(registry.get("Coach"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = AgentRegistry::new();
        registry.register(profile("Coach")).unwrap();
        let err = registry.register(profile("Coach")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(ref n) if n == "Coach"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = AgentRegistry::new();
        for name in ["", "Fitness Coach", "coach!", "User"] {
            assert!(
                matches!(registry.register(profile(name)), Err(Error::Configuration(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_is_ordered_and_restartable() {
        let registry = AgentRegistry::new();
        for name in ["Specialist", "Nutritionist", "Coach"] {
            registry.register(profile(name)).unwrap();
        }

        let listing = registry.list();
        let first: Vec<_> = listing.clone().map(|p| p.name).collect();
        let second: Vec<_> = listing.map(|p| p.name).collect();
        assert_eq!(first, vec!["Specialist", "Nutritionist", "Coach"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_snapshot_unaffected_by_later_registration() {
        let registry = AgentRegistry::new();
        registry.register(profile("Specialist")).unwrap();
        let listing = registry.list();
        registry.register(profile("Coach")).unwrap();
        assert_eq!(listing.count(), 1);
    }

    #[test]
    fn test_resolve_ignores_case() {
        let registry = AgentRegistry::new();
        registry.register(profile("PCOS_Nutritionist")).unwrap();
        assert_eq!(
            registry.resolve("pcos_nutritionist").map(|p| p.name),
            Some("PCOS_Nutritionist".to_string())
        );
        assert!(registry.resolve("nutritionist").is_none());
    }

    #[test]
    fn test_sealed_registry_rejects_registration() {
        let registry = AgentRegistry::new();
        registry.register(profile("Specialist")).unwrap();
        registry.seal();
        registry.seal();

        assert!(registry.is_sealed());
        let err = registry.register(profile("Coach")).unwrap_err();
        assert!(matches!(err, Error::RegistrySealed(_)));
        assert!(registry.get("Specialist").is_ok());
    }
}
