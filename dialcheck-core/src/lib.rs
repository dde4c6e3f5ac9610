//! # dialcheck - Scenario testing for conversational voice agents
//!
//! dialcheck replays scripted dialogue scenarios against a language-model
//! backend and scores the replies against expected behavioral outcomes:
//! - Data-driven outcome catalog of case-insensitive match rules
//! - Lenient, configurable pass rule per scenario
//! - Sequential batch runs with per-scenario failure containment
//! - Run summaries with success rate, latency percentiles, and handoff rate
//! - Markdown reports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialcheck_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = DialcheckConfig::load()?;
//!     let provider = Arc::new(OpenAIProvider::from_config(&config.llm)?);
//!     let harness = TestHarness::from_config(&config, provider)?;
//!
//!     let scenarios = ScenarioSet::load("scenarios.json")?;
//!     let summary = harness.run_all(&scenarios.scenarios, "Tu es une conseillère...").await?;
//!     println!("{}", render_markdown(&summary));
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod llm;
pub mod report;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DialcheckConfig, HarnessConfig, LLMProviderConfig};
    pub use crate::error::{DialcheckError, Result};
    pub use crate::eval::{
        OutcomeCatalog, OutcomeEvaluation, OutcomeEvaluator, OutcomeRule, RunSummary, Scenario,
        ScenarioResult, ScenarioRunner, ScenarioSet, ScriptedTurn, StubLLMProvider, StubReply,
        SuccessPolicy, TestHarness, TurnRole,
    };
    pub use crate::llm::{
        LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo, OpenAIProvider,
    };
    pub use crate::report::{render_markdown, report_file_name};
}
