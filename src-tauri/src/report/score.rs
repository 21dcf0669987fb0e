use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::types::RuleScore;

/// Maximum raw score: 64 rules x 5 points.
pub const MAX_SCORE: u32 = 320;

/// Points a single rule can earn.
pub const POINTS_PER_RULE: u32 = 5;

/// `round(raw / 320 * 100)`, capped at 100.
pub fn to_percentage(raw: u32) -> u32 {
    percent_of(raw, MAX_SCORE).min(100)
}

/// `round(score / max * 100)`; 0 when `max` is 0.
pub fn percent_of(score: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (score as f64 / max as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ScoreSummary {
    pub total: u32,
    pub max: u32,
    pub percent: u32,
}

impl ScoreSummary {
    pub fn from_total(total: u32) -> Self {
        Self {
            total,
            max: MAX_SCORE,
            percent: percent_of(total, MAX_SCORE),
        }
    }
}

/// Change between two raw totals, in points and in percent of the maximum.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ScoreDelta {
    pub points: i64,
    pub percent: i64,
}

pub fn score_delta(original_total: u32, improved_total: u32) -> ScoreDelta {
    let points = improved_total as i64 - original_total as i64;
    let percent = (points as f64 / MAX_SCORE as f64 * 100.0).round() as i64;
    ScoreDelta { points, percent }
}

/// A group of rules rendered as one progress bar.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub rules: &'static [&'static str],
}

impl Category {
    pub fn max_score(&self) -> u32 {
        self.rules.len() as u32 * POINTS_PER_RULE
    }
}

pub const CATEGORIES: &[Category] = &[
    Category { key: "P", label: "Patterns P1-P7", rules: &["P1", "P2", "P3", "P4", "P5", "P6", "P7"] },
    Category { key: "C_IND", label: "Individual C1-C9", rules: &["C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9"] },
    Category { key: "C_SET", label: "Set C10-C15", rules: &["C10", "C11", "C12", "C13", "C14", "C15"] },
    Category { key: "Accuracy", label: "Accuracy R1-R9", rules: &["R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8", "R9"] },
    Category { key: "Concision", label: "Concision R10-R11", rules: &["R10", "R11"] },
    Category { key: "NonAmbiguity", label: "Non-Ambiguity R12-R17", rules: &["R12", "R13", "R14", "R15", "R16", "R17"] },
    Category { key: "Singularity", label: "Singularity R18-R23", rules: &["R18", "R19", "R20", "R21", "R22", "R23"] },
    Category { key: "Completeness", label: "Completeness R24-R25", rules: &["R24", "R25"] },
    Category { key: "Realism", label: "Realism R26", rules: &["R26"] },
    Category { key: "Conditions", label: "Conditions R27-R28", rules: &["R27", "R28"] },
    Category { key: "Uniqueness", label: "Uniqueness R29-R30", rules: &["R29", "R30"] },
    Category { key: "Abstraction", label: "Abstraction R31", rules: &["R31"] },
    Category { key: "Quantification1", label: "Quantification R32", rules: &["R32"] },
    Category { key: "Tolerance", label: "Tolerance R33", rules: &["R33"] },
    Category { key: "Quantification2", label: "Quantification R34-R35", rules: &["R34", "R35"] },
    Category { key: "Uniformity", label: "Uniformity R36-R40", rules: &["R36", "R37", "R38", "R39", "R40"] },
    Category { key: "Modularity", label: "Modularity R41-R42", rules: &["R41", "R42"] },
];

/// Sum of the listed rules' scores; rules missing from `scores` count as 0.
pub fn category_score(scores: &BTreeMap<String, RuleScore>, rules: &[&str]) -> u32 {
    rules
        .iter()
        .filter_map(|rule| scores.get(*rule))
        .map(|s| s.score)
        .sum()
}

/// Sum of all rules whose id starts with `prefix`.
pub fn prefix_score(scores: &BTreeMap<String, RuleScore>, prefix: &str) -> u32 {
    scores
        .iter()
        .filter(|(id, _)| id.starts_with(prefix))
        .map(|(_, s)| s.score)
        .sum()
}

/// One category bar for both evaluations.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryComparison {
    pub key: String,
    pub label: String,
    pub max: u32,
    pub original: u32,
    pub improved: u32,
    pub original_percent: u32,
    pub improved_percent: u32,
}

pub fn compare_categories(
    original: &BTreeMap<String, RuleScore>,
    improved: &BTreeMap<String, RuleScore>,
) -> Vec<CategoryComparison> {
    CATEGORIES
        .iter()
        .map(|cat| {
            let max = cat.max_score();
            let orig = category_score(original, cat.rules);
            let imp = category_score(improved, cat.rules);
            CategoryComparison {
                key: cat.key.to_string(),
                label: cat.label.to_string(),
                max,
                original: orig,
                improved: imp,
                original_percent: percent_of(orig, max),
                improved_percent: percent_of(imp, max),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, u32)]) -> BTreeMap<String, RuleScore> {
        pairs
            .iter()
            .map(|(id, score)| {
                (
                    id.to_string(),
                    RuleScore {
                        score: *score,
                        ..RuleScore::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_percentage_boundaries() {
        assert_eq!(to_percentage(0), 0);
        assert_eq!(to_percentage(160), 50);
        assert_eq!(to_percentage(288), 90);
        assert_eq!(to_percentage(320), 100);
        // 1/320 = 0.3125% rounds down, 2/320 = 0.625% rounds up.
        assert_eq!(to_percentage(1), 0);
        assert_eq!(to_percentage(2), 1);
        assert_eq!(to_percentage(400), 100);
    }

    #[test]
    fn test_delta() {
        assert_eq!(score_delta(100, 260), ScoreDelta { points: 160, percent: 50 });
        assert_eq!(score_delta(200, 168), ScoreDelta { points: -32, percent: -10 });
    }

    #[test]
    fn test_categories_cover_all_64_rules() {
        let total: usize = CATEGORIES.iter().map(|c| c.rules.len()).sum();
        assert_eq!(total, 64);
        let max: u32 = CATEGORIES.iter().map(Category::max_score).sum();
        assert_eq!(max, MAX_SCORE);
    }

    #[test]
    fn test_category_score_ignores_missing_rules() {
        let s = scores(&[("R10", 4), ("R11", 3), ("R12", 5)]);
        assert_eq!(category_score(&s, &["R10", "R11"]), 7);
        assert_eq!(category_score(&s, &["R26"]), 0);
    }

    #[test]
    fn test_prefix_score() {
        let s = scores(&[("P1", 5), ("P2", 4), ("C1", 3)]);
        assert_eq!(prefix_score(&s, "P"), 9);
        assert_eq!(prefix_score(&s, "C"), 3);
    }

    #[test]
    fn test_compare_categories() {
        let original = scores(&[("R10", 2), ("R11", 3)]);
        let improved = scores(&[("R10", 5), ("R11", 5)]);
        let bars = compare_categories(&original, &improved);
        let concision = bars.iter().find(|c| c.key == "Concision").unwrap();
        assert_eq!(concision.max, 10);
        assert_eq!(concision.original, 5);
        assert_eq!(concision.improved, 10);
        assert_eq!(concision.original_percent, 50);
        assert_eq!(concision.improved_percent, 100);
        assert_eq!(bars.len(), CATEGORIES.len());
    }
}
