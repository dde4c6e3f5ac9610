//! Scenario replay and outcome scoring
//!
//! This module provides the test harness for a conversational agent's
//! scripted behavior:
//! - A data-driven catalog of outcome match rules
//! - An evaluator partitioning expected outcomes into met and missed
//! - A runner replaying one scenario against an LLM backend
//! - A batch harness aggregating results into a run summary
//!
//! # Architecture
//!
//! Scenarios run strictly one after another. Each makes exactly one backend
//! call; failures of that call are contained to the scenario's result and
//! never abort the batch. Only invalid input (malformed scenarios, a broken
//! catalog, missing credentials) fails a run as a whole.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialcheck_core::eval::{OutcomeCatalog, ScenarioSet, TestHarness};
//! use dialcheck_core::llm::OpenAIProvider;
//! use dialcheck_core::config::DialcheckConfig;
//!
//! # async fn example() -> dialcheck_core::error::Result<()> {
//! let config = DialcheckConfig::load()?;
//! let provider = Arc::new(OpenAIProvider::from_config(&config.llm)?);
//! let harness = TestHarness::from_config(&config, provider)?;
//!
//! let set = ScenarioSet::load("scenarios.json")?;
//! let summary = harness.run_all(&set.scenarios, "Tu es une conseillère...").await?;
//! println!("{}/{} passed", summary.successful, summary.total_scenarios);
//! # Ok(())
//! # }
//! ```

mod catalog;
mod evaluator;
mod harness;
mod runner;
mod scenario;
mod stub;
mod summary;

pub use catalog::{OutcomeCatalog, OutcomeRule};
pub use evaluator::{OutcomeEvaluation, OutcomeEvaluator, SuccessPolicy};
pub use harness::TestHarness;
pub use runner::ScenarioRunner;
pub use scenario::{Scenario, ScenarioSet, ScriptedTurn, TurnRole, duplicate_ids, validate_scenarios};
pub use stub::{StubLLMProvider, StubReply};
pub use summary::{RunSummary, ScenarioResult, mean, percentile};
