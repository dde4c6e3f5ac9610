//! Markdown test report
//!
//! Layout: header with run date, statistics table, scenario coverage by
//! category, per-scenario breakdown, example transcripts, and notable failures.
//! Report text is in French, the language the agent is tested in.

use chrono::{DateTime, Utc};

use crate::eval::{RunSummary, ScenarioResult};
use crate::llm::MessageRole;

/// Transcripts rendered in the examples section
const MAX_TRANSCRIPTS: usize = 3;

const UNCATEGORIZED: &str = "Sans catégorie";

/// Render a run summary as a Markdown document
pub fn render_markdown(summary: &RunSummary) -> String {
    let mut lines = Vec::new();

    lines.push("# Rapport de Test - Agent de Recouvrement".to_string());
    lines.push(String::new());
    lines.push(format!("**Date:** {}", summary.run_at.format("%d/%m/%Y %H:%M:%S UTC")));
    lines.push(String::new());

    lines.push("## Résumé".to_string());
    lines.push(String::new());
    lines.push("| Métrique | Valeur |".to_string());
    lines.push("|----------|--------|".to_string());
    lines.push(format!("| Scénarios totaux | {} |", summary.total_scenarios));
    lines.push(format!("| Réussis | {} |", summary.successful));
    lines.push(format!("| Échoués | {} |", summary.failed));
    lines.push(format!("| **Taux de succès** | **{:.1}%** |", summary.success_rate * 100.0));
    lines.push(format!("| Temps de réponse moyen | {:.0}ms |", summary.avg_response_time_ms));
    lines.push(format!("| Temps de réponse P95 | {}ms |", summary.p95_response_time_ms));
    lines.push(format!("| Taux de transfert | {:.1}% |", summary.handoff_rate * 100.0));
    lines.push(String::new());

    lines.push("## Justification des scénarios".to_string());
    lines.push(String::new());
    lines.extend(coverage_section(&summary.results));

    lines.push("## Résultats détaillés".to_string());
    lines.push(String::new());
    for result in &summary.results {
        lines.extend(result_section(result));
    }

    lines.push("## Exemples de transcriptions".to_string());
    lines.push(String::new());
    let transcripts: Vec<String> = summary
        .example_transcripts
        .iter()
        .take(MAX_TRANSCRIPTS)
        .map(transcript_section)
        .collect();
    if !transcripts.is_empty() {
        lines.push(transcripts.join("\n---\n\n"));
    }

    lines.push("## Échecs notables".to_string());
    lines.push(String::new());
    if summary.notable_failures.is_empty() {
        lines.push("Aucun échec notable.".to_string());
        lines.push(String::new());
    } else {
        for failure in &summary.notable_failures {
            lines.push(format!("### {}", failure.scenario_name));
            lines.push(format!("- **Objectifs manqués:** {}", list_or_none(&failure.outcomes_missed)));
            if let Some(error) = &failure.error {
                lines.push(format!("- **Erreur:** {}", error));
            }
            lines.push(String::new());
        }
    }

    lines.push("---".to_string());
    lines.push("*Rapport généré automatiquement par dialcheck*".to_string());
    lines.push(String::new());

    lines.join("\n")
}

/// Dated file name for a report, e.g. `test-report-2025-01-31.md`
pub fn report_file_name(run_at: DateTime<Utc>) -> String {
    format!("test-report-{}.md", run_at.format("%Y-%m-%d"))
}

/// Scenario names grouped by category, categories in order of first appearance
fn coverage_section(results: &[ScenarioResult]) -> Vec<String> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for result in results {
        let category = match result.category.trim() {
            "" => UNCATEGORIZED,
            category => category,
        };
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, names)) => names.push(result.scenario_name.as_str()),
            None => groups.push((category, vec![result.scenario_name.as_str()])),
        }
    }

    if groups.is_empty() {
        return vec!["Aucun scénario exécuté.".to_string(), String::new()];
    }

    let mut lines = vec![format!("Les {} scénarios couvrent:", results.len())];
    for (category, names) in groups {
        lines.push(format!("- **{}** : {}", category, names.join(", ")));
    }
    lines.push(String::new());
    lines.push(
        "Cette couverture assure que l'agent gère correctement les situations courantes ET exceptionnelles."
            .to_string(),
    );
    lines.push(String::new());
    lines
}

fn result_section(result: &ScenarioResult) -> Vec<String> {
    let mut lines = vec![
        format!("### {}", result.scenario_name),
        format!(
            "- **Statut:** {}",
            if result.success { "✅ Réussi" } else { "❌ Échoué" }
        ),
        format!("- **Temps de réponse:** {}ms", result.response_time_ms),
        format!("- **Objectifs atteints:** {}", list_or_none(&result.outcomes_met)),
        format!("- **Objectifs manqués:** {}", list_or_none(&result.outcomes_missed)),
    ];
    if let Some(error) = &result.error {
        lines.push(format!("- **Erreur:** {}", error));
    }
    lines.push(String::new());
    lines
}

fn transcript_section(result: &ScenarioResult) -> String {
    let turns: Vec<String> = result
        .transcript
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                MessageRole::User => "Utilisateur",
                MessageRole::Assistant | MessageRole::System => "Agent",
            };
            format!("**{}:** {}", speaker, turn.content)
        })
        .collect();
    format!("### {}\n\n{}\n", result.scenario_name, turns.join("\n\n"))
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "Aucun".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;
    use chrono::TimeZone;

    fn result(id: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_id: id.to_string(),
            scenario_name: format!("Scenario {}", id),
            category: String::new(),
            success,
            response_time_ms: if success { 840 } else { 0 },
            transcript: vec![Message::user("Allô ?"), Message::assistant("Bonjour, je suis Claire.")],
            outcomes_met: if success { vec!["human_like_response".to_string()] } else { Vec::new() },
            outcomes_missed: if success { Vec::new() } else { vec!["polite_closure".to_string()] },
            error: (!success).then(|| "LLM backend error (500): boom".to_string()),
        }
    }

    fn categorized(id: &str, category: &str) -> ScenarioResult {
        ScenarioResult {
            category: category.to_string(),
            ..result(id, true)
        }
    }

    fn summary(results: Vec<ScenarioResult>) -> RunSummary {
        let run_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        RunSummary::from_results(results, &["escalation_offered".to_string()], 3, run_at)
    }

    #[test]
    fn test_report_sections() {
        let report = render_markdown(&summary(vec![result("a", true), result("b", false)]));

        assert!(report.starts_with("# Rapport de Test - Agent de Recouvrement\n"));
        assert!(report.contains("**Date:** 14/03/2025 09:30:00 UTC"));
        assert!(report.contains("| Scénarios totaux | 2 |"));
        assert!(report.contains("| **Taux de succès** | **50.0%** |"));
        assert!(report.contains("| Temps de réponse moyen | 420ms |"));
        assert!(report.contains("- **Statut:** ✅ Réussi"));
        assert!(report.contains("- **Statut:** ❌ Échoué"));
        assert!(report.contains("- **Objectifs manqués:** Aucun"));
        assert!(report.contains("**Utilisateur:** Allô ?"));
        assert!(report.contains("**Agent:** Bonjour, je suis Claire."));
        assert!(report.contains("- **Erreur:** LLM backend error (500): boom"));
    }

    #[test]
    fn test_report_without_failures() {
        let report = render_markdown(&summary(vec![result("a", true)]));
        assert!(report.contains("Aucun échec notable."));
        assert!(!report.contains("- **Erreur:**"));
    }

    #[test]
    fn test_report_for_empty_run() {
        let report = render_markdown(&summary(Vec::new()));
        assert!(report.contains("| **Taux de succès** | **0.0%** |"));
        assert!(report.contains("Aucun scénario exécuté."));
        assert!(report.contains("## Exemples de transcriptions\n\n## Échecs notables"));
    }

    #[test]
    fn test_coverage_groups_by_category() {
        let report = render_markdown(&summary(vec![
            categorized("1", "identification"),
            categorized("2", "paiement"),
            categorized("3", "identification"),
            result("4", true),
        ]));

        assert!(report.contains("Les 4 scénarios couvrent:"));
        assert!(report.contains("- **identification** : Scenario 1, Scenario 3\n- **paiement** : Scenario 2\n"));
        assert!(report.contains("- **Sans catégorie** : Scenario 4"));
        let coverage = report.find("## Justification des scénarios").unwrap();
        let details = report.find("## Résultats détaillés").unwrap();
        assert!(coverage < details);
    }

    #[test]
    fn test_transcripts_separated_by_rules() {
        let results = (0..5).map(|i| result(&i.to_string(), true)).collect();
        let report = render_markdown(&summary(results));
        assert_eq!(report.matches("\n---\n\n### ").count(), 2);
    }

    #[test]
    fn test_report_file_name() {
        let run_at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 0, 0).unwrap();
        assert_eq!(report_file_name(run_at), "test-report-2025-01-31.md");
    }
}
