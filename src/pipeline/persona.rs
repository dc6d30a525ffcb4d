//! Aggression profiles and the backstory table for the adversarial stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::prompts::{SHARK_DIPLOMAT_BACKSTORY, SHARK_KILLER_BACKSTORY, SHARK_PROFESSIONAL_BACKSTORY};

/// Persona intensity for the adversarial stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggressionProfile {
    Diplomat,
    #[default]
    Professional,
    Killer,
}

impl AggressionProfile {
    /// Look up a profile by name, case-insensitively.
    ///
    /// Unknown names resolve to [`AggressionProfile::Professional`].
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "diplomat" => AggressionProfile::Diplomat,
            "professional" => AggressionProfile::Professional,
            "killer" => AggressionProfile::Killer,
            _ => AggressionProfile::Professional,
        }
    }

    /// Profile name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggressionProfile::Diplomat => "diplomat",
            AggressionProfile::Professional => "professional",
            AggressionProfile::Killer => "killer",
        }
    }

    fn builtin_backstory(&self) -> &'static str {
        match self {
            AggressionProfile::Diplomat => SHARK_DIPLOMAT_BACKSTORY,
            AggressionProfile::Professional => SHARK_PROFESSIONAL_BACKSTORY,
            AggressionProfile::Killer => SHARK_KILLER_BACKSTORY,
        }
    }
}

impl std::fmt::Display for AggressionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AggressionProfile {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AggressionProfile::resolve(s))
    }
}

/// Backstory templates per aggression profile.
///
/// Templates may contain a `{counter_party}` placeholder.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    backstories: HashMap<AggressionProfile, String>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        let backstories = [
            AggressionProfile::Diplomat,
            AggressionProfile::Professional,
            AggressionProfile::Killer,
        ]
        .into_iter()
        .map(|p| (p, p.builtin_backstory().to_string()))
        .collect();
        Self { backstories }
    }
}

impl PersonaConfig {
    /// Replace the backstory template for one profile.
    pub fn with_backstory(mut self, profile: AggressionProfile, template: impl Into<String>) -> Self {
        self.backstories.insert(profile, template.into());
        self
    }

    /// Backstory template for `profile`.
    pub fn backstory(&self, profile: AggressionProfile) -> &str {
        self.backstories
            .get(&profile)
            .map(String::as_str)
            .unwrap_or_else(|| profile.builtin_backstory())
    }

    /// Backstory template for a profile given by name; unknown names get the
    /// Professional backstory.
    pub fn resolve_profile(&self, name: &str) -> &str {
        self.backstory(AggressionProfile::resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_profiles() {
        assert_eq!(AggressionProfile::resolve("diplomat"), AggressionProfile::Diplomat);
        assert_eq!(AggressionProfile::resolve("KILLER"), AggressionProfile::Killer);
        assert_eq!(
            AggressionProfile::resolve(" Professional "),
            AggressionProfile::Professional
        );
    }

    #[test]
    fn test_unknown_profile_falls_back_to_professional() {
        assert_eq!(
            AggressionProfile::resolve("unknown-value"),
            AggressionProfile::Professional
        );
        let parsed: AggressionProfile = "".parse().unwrap();
        assert_eq!(parsed, AggressionProfile::Professional);
    }

    #[test]
    fn test_resolve_profile_unknown_returns_professional_backstory() {
        let personas = PersonaConfig::default();
        assert_eq!(
            personas.resolve_profile("unknown-value"),
            personas.backstory(AggressionProfile::Professional)
        );
        assert_eq!(
            personas.resolve_profile("unknown-value"),
            SHARK_PROFESSIONAL_BACKSTORY
        );
    }

    #[test]
    fn test_profiles_have_distinct_backstories() {
        let personas = PersonaConfig::default();
        assert_ne!(
            personas.backstory(AggressionProfile::Diplomat),
            personas.backstory(AggressionProfile::Killer)
        );
    }

    #[test]
    fn test_with_backstory_overrides_one_profile() {
        let personas =
            PersonaConfig::default().with_backstory(AggressionProfile::Killer, "custom");
        assert_eq!(personas.backstory(AggressionProfile::Killer), "custom");
        assert_eq!(
            personas.backstory(AggressionProfile::Diplomat),
            SHARK_DIPLOMAT_BACKSTORY
        );
    }

    #[test]
    fn test_profile_display() {
        assert_eq!(AggressionProfile::Killer.to_string(), "killer");
        assert_eq!(AggressionProfile::default(), AggressionProfile::Professional);
    }
}
