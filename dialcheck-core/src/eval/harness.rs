//! Batch harness for running scenario sets
//!
//! The harness coordinates:
//! - Validating the scenario list
//! - Running every scenario, one after another
//! - Aggregating results into a [`RunSummary`]

use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::catalog::OutcomeCatalog;
use super::evaluator::{OutcomeEvaluator, SuccessPolicy};
use super::runner::ScenarioRunner;
use super::scenario::{Scenario, duplicate_ids, validate_scenarios};
use super::summary::RunSummary;
use crate::config::{DialcheckConfig, HarnessConfig};
use crate::error::Result;
use crate::llm::LLMProvider;

/// Scenario batch harness
pub struct TestHarness {
    config: HarnessConfig,
    runner: ScenarioRunner,
}

impl TestHarness {
    /// Create a harness with default configuration
    pub fn new(provider: Arc<dyn LLMProvider>, catalog: Arc<OutcomeCatalog>) -> Self {
        Self::with_config(provider, catalog, HarnessConfig::default())
    }

    /// Create a harness with custom harness configuration
    pub fn with_config(
        provider: Arc<dyn LLMProvider>,
        catalog: Arc<OutcomeCatalog>,
        config: HarnessConfig,
    ) -> Self {
        let runner = ScenarioRunner::new(provider, OutcomeEvaluator::new(catalog))
            .with_policy(SuccessPolicy::new(config.success_ratio))
            .with_call_timeout(config.call_timeout);
        Self { config, runner }
    }

    /// Build a harness from a full configuration, loading the catalog it names.
    ///
    /// # Errors
    ///
    /// Returns a run-fatal error if the configuration is invalid or the
    /// catalog cannot be loaded.
    pub fn from_config(config: &DialcheckConfig, provider: Arc<dyn LLMProvider>) -> Result<Self> {
        config.validate()?;
        let catalog = OutcomeCatalog::load(config.catalog_path.as_deref())?;
        let harness = Self::with_config(provider, Arc::new(catalog), config.harness.clone())
            .with_sampling(config.llm.temperature, config.llm.max_tokens);
        Ok(harness)
    }

    /// Sampling parameters sent with every request
    pub fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.runner = self.runner.with_sampling(temperature, max_tokens);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every scenario in order and summarise the run.
    ///
    /// Scenario-level failures are recorded in their results. Only invalid
    /// scenario input aborts the run, before any backend call is made.
    /// Duplicate ids are allowed: every input scenario gets its own result.
    pub async fn run_all(&self, scenarios: &[Scenario], system_prompt: &str) -> Result<RunSummary> {
        validate_scenarios(scenarios)?;
        self.warn_unknown_outcomes(scenarios);

        let duplicates = duplicate_ids(scenarios);
        if !duplicates.is_empty() {
            warn!(?duplicates, "scenario ids are not unique; results are reported by position");
        }

        info!("Running {} test scenarios", scenarios.len());

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            results.push(self.runner.run(scenario, system_prompt).await);
        }

        let summary = RunSummary::from_results(
            results,
            &self.config.handoff_outcomes,
            self.config.sample_size,
            Utc::now(),
        );

        info!(
            success_rate = summary.success_rate,
            p95_ms = summary.p95_response_time_ms,
            "Test run complete: {}/{} passed",
            summary.successful,
            summary.total_scenarios
        );

        Ok(summary)
    }

    fn warn_unknown_outcomes(&self, scenarios: &[Scenario]) {
        let catalog = self.runner.evaluator().catalog();
        let unknown: BTreeSet<&str> = scenarios
            .iter()
            .flat_map(|s| s.expected_outcomes.iter())
            .map(String::as_str)
            .filter(|outcome| !catalog.contains(outcome))
            .collect();

        if !unknown.is_empty() {
            warn!(?unknown, "expected outcomes missing from catalog will always be missed");
        }
    }
}
