//! Single-scenario runner
//!
//! Replays a scenario's caller turns to the backend in one request, times the
//! call, and scores the reply. Backend failures never escape: they become a
//! failed [`ScenarioResult`].

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::evaluator::{OutcomeEvaluator, SuccessPolicy};
use super::scenario::Scenario;
use super::summary::ScenarioResult;
use crate::error::{DialcheckError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message};

/// Runs one scenario against the backend
pub struct ScenarioRunner {
    provider: Arc<dyn LLMProvider>,
    evaluator: OutcomeEvaluator,
    policy: SuccessPolicy,
    temperature: f32,
    max_tokens: usize,
    call_timeout: Option<Duration>,
}

impl ScenarioRunner {
    pub fn new(provider: Arc<dyn LLMProvider>, evaluator: OutcomeEvaluator) -> Self {
        Self {
            provider,
            evaluator,
            policy: SuccessPolicy::default(),
            temperature: 0.7,
            max_tokens: 500,
            call_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: SuccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sampling parameters sent with every request
    pub fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn evaluator(&self) -> &OutcomeEvaluator {
        &self.evaluator
    }

    /// Replay `scenario` under `system_prompt`.
    pub async fn run(&self, scenario: &Scenario, system_prompt: &str) -> ScenarioResult {
        let history: Vec<Message> = scenario.replayed_turns().map(Message::user).collect();
        let mut transcript = history.clone();

        let request = LLMRequest::with_system_prompt(system_prompt, history)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let start = Instant::now();
        let response = match self.call(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(scenario = %scenario.id, error = %e, "scenario backend call failed");
                return ScenarioResult::failed(scenario, transcript, e.to_string());
            }
        };
        let response_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let evaluation = self
            .evaluator
            .evaluate(&response.content, &scenario.expected_outcomes);
        transcript.push(Message::assistant(response.content));

        let success = self.policy.is_success(&evaluation);
        if success {
            info!(
                scenario = %scenario.id,
                met = evaluation.met.len(),
                expected = evaluation.expected_count(),
                "Scenario {}: PASS ({}ms)",
                scenario.id,
                response_time_ms
            );
        } else {
            warn!(
                scenario = %scenario.id,
                missed = ?evaluation.missed,
                "Scenario {}: FAIL ({}ms)",
                scenario.id,
                response_time_ms
            );
        }

        ScenarioResult::evaluated(scenario, success, response_time_ms, transcript, evaluation)
    }

    async fn call(&self, request: &LLMRequest) -> Result<LLMResponse> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.generate_request(request))
                .await
                .map_err(|_| {
                    DialcheckError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
                })?,
            None => self.provider.generate_request(request).await,
        }
    }
}
