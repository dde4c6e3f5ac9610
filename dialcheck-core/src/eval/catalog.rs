//! Outcome pattern catalog
//!
//! Maps each outcome identifier to an ordered list of case-insensitive match
//! rules. The table is data: the built-in one is embedded from
//! `outcomes.toml`, and a replacement file with the same shape can be loaded
//! instead:
//!
//! ```toml
//! [outcomes]
//! polite_closure = ["merci", "bonne journée", "au revoir"]
//! ```

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{DialcheckError, Result};

const BUILTIN_CATALOG: &str = include_str!("../../outcomes.toml");

/// A single case-insensitive match rule
#[derive(Debug, Clone)]
pub struct OutcomeRule {
    pattern: String,
    regex: Regex,
}

impl OutcomeRule {
    /// Compile a rule.
    ///
    /// # Errors
    ///
    /// Returns `DialcheckError::Catalog` for empty or invalid patterns.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(DialcheckError::Catalog(
                "empty rule would match every reply".to_string(),
            ));
        }
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| DialcheckError::Catalog(format!("invalid rule '{}': {}", pattern, e)))?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    outcomes: BTreeMap<String, Vec<String>>,
}

/// Outcome identifier to match rules
#[derive(Debug, Clone, Default)]
pub struct OutcomeCatalog {
    outcomes: BTreeMap<String, Vec<OutcomeRule>>,
}

impl OutcomeCatalog {
    /// The built-in catalog
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DialcheckError::Catalog(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let file: CatalogFile = Figment::from(Toml::string(text))
            .extract()
            .map_err(|e| DialcheckError::Catalog(format!("malformed catalog: {}", e)))?;

        let mut catalog = Self::default();
        for (outcome, patterns) in file.outcomes {
            let rules = patterns
                .into_iter()
                .map(OutcomeRule::new)
                .collect::<Result<Vec<_>>>()?;
            catalog.outcomes.insert(outcome, rules);
        }
        Ok(catalog)
    }

    /// Load the catalog at `path`, or the built-in one when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Add or replace an outcome's rules
    pub fn with_outcome<I, S>(mut self, outcome: impl Into<String>, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .map(OutcomeRule::new)
            .collect::<Result<Vec<_>>>()?;
        self.outcomes.insert(outcome.into(), rules);
        Ok(self)
    }

    /// Rules for an outcome; unknown outcomes have none.
    pub fn lookup(&self, outcome: &str) -> &[OutcomeRule] {
        self.outcomes.get(outcome).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, outcome: &str) -> bool {
        self.outcomes.contains_key(outcome)
    }

    /// Outcome identifiers, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
