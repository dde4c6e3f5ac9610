//! Scenario definitions
//!
//! A scenario is a static dialogue script: the caller turns that get replayed
//! to the model, plus the outcomes the agent's reply is expected to show.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{DialcheckError, Result};

/// A scripted dialogue scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// What the scenario exercises
    #[serde(default)]
    pub description: String,

    /// Scripted turns, in order
    #[serde(default)]
    pub messages: Vec<ScriptedTurn>,

    /// Outcome identifiers the reply is expected to meet
    #[serde(default)]
    pub expected_outcomes: Vec<String>,

    /// Category tag (identification, payment, emotions, ...)
    #[serde(default)]
    pub category: String,
}

impl Scenario {
    /// Create an empty scenario
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            messages: Vec::new(),
            expected_outcomes: Vec::new(),
            category: String::new(),
        }
    }

    /// Append a caller turn
    pub fn with_user_turn(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ScriptedTurn::user(content));
        self
    }

    /// Append an agent placeholder turn (never replayed)
    pub fn with_agent_turn(mut self, content: Option<String>) -> Self {
        self.messages.push(ScriptedTurn {
            role: TurnRole::Assistant,
            content,
        });
        self
    }

    /// Add an expected outcome
    pub fn expecting(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcomes.push(outcome.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Caller turns sent to the model: user role, content present and non-empty.
    pub fn replayed_turns(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|turn| match (&turn.role, &turn.content) {
            (TurnRole::User, Some(content)) if !content.is_empty() => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Who speaks a scripted turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    #[serde(alias = "agent")]
    Assistant,
}

/// One scripted turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedTurn {
    pub role: TurnRole,
    #[serde(default)]
    pub content: Option<String>,
}

impl ScriptedTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: Some(content.into()),
        }
    }
}

/// An ordered set of scenarios, as stored in a scenario file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Load and validate a scenario file (`{"scenarios": [...]}`)
    ///
    /// # Errors
    ///
    /// Returns `DialcheckError::Scenario` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DialcheckError::Scenario(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate scenarios from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let set: ScenarioSet = serde_json::from_str(json)
            .map_err(|e| DialcheckError::Scenario(format!("malformed scenario file: {}", e)))?;
        validate_scenarios(&set.scenarios)?;
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Reject scenario lists containing a scenario without an id.
pub fn validate_scenarios(scenarios: &[Scenario]) -> Result<()> {
    if let Some(index) = scenarios.iter().position(|s| s.id.trim().is_empty()) {
        return Err(DialcheckError::Scenario(format!(
            "scenario at index {} has an empty id",
            index
        )));
    }
    Ok(())
}

/// Ids used by more than one scenario, in sorted order.
///
/// Results are positional, so duplicates still run; callers may warn about them.
pub fn duplicate_ids(scenarios: &[Scenario]) -> BTreeSet<&str> {
    let mut seen = HashSet::new();
    scenarios
        .iter()
        .map(|s| s.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect()
}
