//! Per-scenario results and run-level aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluator::OutcomeEvaluation;
use super::scenario::Scenario;
use crate::llm::Message;

/// Outcome of replaying one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub scenario_name: String,

    /// Category tag of the scenario, omitted when untagged
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    pub success: bool,

    /// Backend latency; 0 when the call failed
    pub response_time_ms: u64,

    /// Turns actually exchanged, ending with the model reply when there was one
    pub transcript: Vec<Message>,

    pub outcomes_met: Vec<String>,
    pub outcomes_missed: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Result of a scenario whose reply was evaluated
    pub fn evaluated(
        scenario: &Scenario,
        success: bool,
        response_time_ms: u64,
        transcript: Vec<Message>,
        evaluation: OutcomeEvaluation,
    ) -> Self {
        Self {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            category: scenario.category.clone(),
            success,
            response_time_ms,
            transcript,
            outcomes_met: evaluation.met,
            outcomes_missed: evaluation.missed,
            error: None,
        }
    }

    /// Result of a scenario whose backend call failed
    pub fn failed(scenario: &Scenario, transcript: Vec<Message>, error: impl Into<String>) -> Self {
        let evaluation = OutcomeEvaluation::all_missed(&scenario.expected_outcomes);
        Self {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            category: scenario.category.clone(),
            success: false,
            response_time_ms: 0,
            transcript,
            outcomes_met: evaluation.met,
            outcomes_missed: evaluation.missed,
            error: Some(error.into()),
        }
    }

    /// Whether any of `handoff_outcomes` was met
    pub fn has_handoff(&self, handoff_outcomes: &[String]) -> bool {
        self.outcomes_met
            .iter()
            .any(|outcome| handoff_outcomes.contains(outcome))
    }
}

/// Aggregate report for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_scenarios: usize,
    pub successful: usize,
    pub failed: usize,

    /// successful / total, 0 for an empty run
    pub success_rate: f64,

    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: u64,

    /// Fraction of all scenarios that met a handoff outcome
    pub handoff_rate: f64,

    pub results: Vec<ScenarioResult>,

    /// First failed results, in scenario order
    pub notable_failures: Vec<ScenarioResult>,

    /// First successful results, in scenario order
    pub example_transcripts: Vec<ScenarioResult>,

    pub run_at: DateTime<Utc>,
}

impl RunSummary {
    /// Aggregate results, in scenario order, into a summary.
    ///
    /// Every result's `response_time_ms` feeds the latency statistics,
    /// including the zeros recorded for failed calls.
    pub fn from_results(
        results: Vec<ScenarioResult>,
        handoff_outcomes: &[String],
        sample_size: usize,
        run_at: DateTime<Utc>,
    ) -> Self {
        let total_scenarios = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        let failed = total_scenarios - successful;
        let handoffs = results
            .iter()
            .filter(|r| r.has_handoff(handoff_outcomes))
            .count();

        let latencies: Vec<u64> = results.iter().map(|r| r.response_time_ms).collect();

        let notable_failures = results
            .iter()
            .filter(|r| !r.success)
            .take(sample_size)
            .cloned()
            .collect();
        let example_transcripts = results
            .iter()
            .filter(|r| r.success)
            .take(sample_size)
            .cloned()
            .collect();

        Self {
            total_scenarios,
            successful,
            failed,
            success_rate: ratio(successful, total_scenarios),
            avg_response_time_ms: mean(&latencies),
            p95_response_time_ms: percentile(&latencies, 0.95),
            handoff_rate: ratio(handoffs, total_scenarios),
            results,
            notable_failures,
            example_transcripts,
            run_at,
        }
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Arithmetic mean, 0 for no samples
pub fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64
}

/// Nearest-rank style percentile: sorted ascending, index `floor(q * n)`.
/// 0 for no samples.
pub fn percentile(samples: &[u64], q: f64) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let idx = (sorted.len() as f64 * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}
