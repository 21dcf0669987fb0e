//! Turn an `/improve` response into the view model shown after a submission.

pub mod extract;
pub mod rules;
pub mod score;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::api::types::{Evaluation, ImproveResponse};
pub use extract::RequirementCard;
pub use score::{CategoryComparison, ScoreDelta, ScoreSummary};

/// Per-rule comparison row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RuleRow {
    pub rule_id: String,
    pub name: String,
    pub original: u32,
    pub improved: u32,
    pub diff: i64,
}

/// One backend explanation, cleaned up and joined with its score change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImprovementNote {
    pub rule_id: String,
    pub title: String,
    pub content: String,
    pub original: u32,
    pub improved: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub original_text: String,
    pub improved_text: String,
    pub original: ScoreSummary,
    pub improved: ScoreSummary,
    pub delta: ScoreDelta,
    pub categories: Vec<CategoryComparison>,
    pub rule_rows: Vec<RuleRow>,
    pub improvement_notes: Vec<ImprovementNote>,
    pub requirements: Vec<RequirementCard>,
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    pub fn build(response: &ImproveResponse) -> Self {
        let original = &response.original_scores;
        let improved = &response.improved_scores;
        let improved_text = &response.improved_result.improved;

        Self {
            original_text: response.improved_result.original.clone(),
            improved_text: improved_text.clone(),
            original: ScoreSummary::from_total(original.total),
            improved: ScoreSummary::from_total(improved.total),
            delta: score::score_delta(original.total, improved.total),
            categories: score::compare_categories(&original.scores, &improved.scores),
            rule_rows: rule_rows(original, improved),
            improvement_notes: improvement_notes(response),
            requirements: extract::requirement_cards(improved_text),
            recommendations: extract::recommendations(improved_text),
        }
    }
}

/// Summary of a single evaluation: total plus category bars.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub summary: ScoreSummary,
    pub categories: Vec<CategoryComparison>,
}

impl EvaluationReport {
    pub fn build(evaluation: &Evaluation) -> Self {
        Self {
            summary: ScoreSummary::from_total(evaluation.total),
            categories: score::compare_categories(&evaluation.scores, &evaluation.scores),
        }
    }
}

fn rule_score(evaluation: &Evaluation, rule_id: &str) -> u32 {
    evaluation.scores.get(rule_id).map(|s| s.score).unwrap_or(0)
}

fn rule_rows(original: &Evaluation, improved: &Evaluation) -> Vec<RuleRow> {
    let ids: BTreeSet<&str> = original
        .scores
        .keys()
        .chain(improved.scores.keys())
        .map(String::as_str)
        .collect();

    let mut rows: Vec<RuleRow> = ids
        .into_iter()
        .map(|id| {
            let name = rules::display_name(id)
                .or_else(|| {
                    original
                        .scores
                        .get(id)
                        .or_else(|| improved.scores.get(id))
                        .and_then(|s| s.name.clone())
                })
                .unwrap_or_else(|| id.to_string());
            let before = rule_score(original, id);
            let after = rule_score(improved, id);
            RuleRow {
                rule_id: id.to_string(),
                name,
                original: before,
                improved: after,
                diff: after as i64 - before as i64,
            }
        })
        .collect();
    rows.sort_by(|a, b| rules::compare_rule_ids(&a.rule_id, &b.rule_id));
    rows
}

fn improvement_notes(response: &ImproveResponse) -> Vec<ImprovementNote> {
    response
        .explanations
        .iter()
        .map(|exp| {
            let rule_id = exp.rule_id.trim().to_string();
            ImprovementNote {
                title: clean_title(&exp.title, &rule_id),
                content: strip_bold(&exp.content).trim().to_string(),
                original: rule_score(&response.original_scores, &rule_id),
                improved: rule_score(&response.improved_scores, &rule_id),
                rule_id,
            }
        })
        .collect()
}

fn strip_bold(text: &str) -> String {
    text.replace("**", "")
}

/// `**R7: Vague Terms**` → `Vague Terms`.
fn clean_title(title: &str, rule_id: &str) -> String {
    let title = strip_bold(title);
    let mut title = title.trim();
    if !rule_id.is_empty() {
        if let Some(rest) = title.strip_prefix(rule_id) {
            title = rest.trim_start().trim_start_matches(['-', ':']).trim_start();
        }
    }
    title.trim().to_string()
}
