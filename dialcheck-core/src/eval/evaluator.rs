//! Outcome evaluation and the scenario success policy

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::catalog::OutcomeCatalog;

/// Expected outcomes partitioned by whether the reply met them.
///
/// Both lists keep the order of the expected outcomes and are not
/// deduplicated: an outcome expected twice is reported twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvaluation {
    pub met: Vec<String>,
    pub missed: Vec<String>,
}

impl OutcomeEvaluation {
    /// Every expected outcome missed, nothing evaluated
    pub fn all_missed(expected: &[String]) -> Self {
        Self {
            met: Vec::new(),
            missed: expected.to_vec(),
        }
    }

    /// Number of expected outcomes evaluated
    pub fn expected_count(&self) -> usize {
        self.met.len() + self.missed.len()
    }
}

/// Scores replies against the outcome catalog
#[derive(Debug, Clone)]
pub struct OutcomeEvaluator {
    catalog: Arc<OutcomeCatalog>,
}

impl OutcomeEvaluator {
    pub fn new(catalog: Arc<OutcomeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &OutcomeCatalog {
        &self.catalog
    }

    /// Whether any rule of `outcome` matches `reply`
    pub fn is_met(&self, outcome: &str, reply: &str) -> bool {
        self.catalog
            .lookup(outcome)
            .iter()
            .any(|rule| rule.is_match(reply))
    }

    /// Partition `expected` into met and missed for `reply`
    pub fn evaluate(&self, reply: &str, expected: &[String]) -> OutcomeEvaluation {
        let (met, missed): (Vec<String>, Vec<String>) = expected
            .iter()
            .cloned()
            .partition(|outcome| self.is_met(outcome, reply));
        OutcomeEvaluation { met, missed }
    }
}

/// Lenient pass rule: nothing missed, or at least `ratio` of the expected
/// outcomes met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessPolicy {
    pub ratio: f64,
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

impl SuccessPolicy {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// All expected outcomes must be met
    pub fn strict() -> Self {
        Self { ratio: 1.0 }
    }

    pub fn is_success(&self, evaluation: &OutcomeEvaluation) -> bool {
        evaluation.missed.is_empty()
            || evaluation.met.len() as f64 >= evaluation.expected_count() as f64 * self.ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> OutcomeEvaluator {
        OutcomeEvaluator::new(Arc::new(OutcomeCatalog::builtin().unwrap()))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_closing_reply_meets_both_outcomes() {
        let evaluation = evaluator().evaluate(
            "Merci, bonne journée, au revoir.",
            &ids(&["wrong_person_handled", "polite_closure"]),
        );
        assert_eq!(evaluation.met, ids(&["wrong_person_handled", "polite_closure"]));
        assert!(evaluation.missed.is_empty());
    }

    #[test]
    fn test_greeting_misses_payment_link() {
        let evaluation = evaluator().evaluate("Bonjour.", &ids(&["payment_link_offered"]));
        assert!(evaluation.met.is_empty());
        assert_eq!(evaluation.missed, ids(&["payment_link_offered"]));
        assert!(!SuccessPolicy::default().is_success(&evaluation));
    }

    #[test]
    fn test_unknown_outcome_is_missed() {
        let evaluation = evaluator().evaluate("Merci beaucoup", &ids(&["not_in_catalog"]));
        assert_eq!(evaluation.missed, ids(&["not_in_catalog"]));
    }

    #[test]
    fn test_empty_reply_misses_everything() {
        let expected = ids(&["polite_closure", "empathy_shown"]);
        let evaluation = evaluator().evaluate("", &expected);
        assert_eq!(evaluation, OutcomeEvaluation::all_missed(&expected));
    }

    #[test]
    fn test_order_follows_expected_outcomes() {
        let expected = ids(&["payment_link_offered", "polite_closure", "empathy_shown", "proceed_to_payment"]);
        let evaluation = evaluator().evaluate("Je comprends. Votre solde est de 40 euros.", &expected);
        assert_eq!(evaluation.met, ids(&["empathy_shown", "proceed_to_payment"]));
        assert_eq!(evaluation.missed, ids(&["payment_link_offered", "polite_closure"]));
    }

    #[test]
    fn test_duplicates_are_not_collapsed() {
        let expected = ids(&["polite_closure", "polite_closure", "payment_link_offered", "payment_link_offered"]);
        let evaluation = evaluator().evaluate("Au revoir", &expected);
        assert_eq!(evaluation.met, ids(&["polite_closure", "polite_closure"]));
        assert_eq!(evaluation.missed.len(), 2);
        assert_eq!(evaluation.expected_count(), expected.len());
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let evaluator = evaluator();
        let expected = ids(&["callback_offered", "escalation_offered", "calm_response"]);
        let reply = "Un responsable peut vous rappeler à un moment qui vous convient.";
        assert_eq!(evaluator.evaluate(reply, &expected), evaluator.evaluate(reply, &expected));
    }

    #[test]
    fn test_half_met_passes_default_policy() {
        let evaluation = OutcomeEvaluation {
            met: ids(&["a"]),
            missed: ids(&["b"]),
        };
        assert!(SuccessPolicy::default().is_success(&evaluation));
        assert!(!SuccessPolicy::strict().is_success(&evaluation));
    }

    #[test]
    fn test_one_of_three_fails_default_policy() {
        let evaluation = OutcomeEvaluation {
            met: ids(&["a"]),
            missed: ids(&["b", "c"]),
        };
        assert!(!SuccessPolicy::default().is_success(&evaluation));
        assert!(SuccessPolicy::new(0.3).is_success(&evaluation));
    }

    #[test]
    fn test_no_expected_outcomes_passes() {
        assert!(SuccessPolicy::strict().is_success(&OutcomeEvaluation::default()));
    }
}
