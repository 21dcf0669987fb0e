use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode `null` as the type's default instead of failing.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a score that may arrive as an integer, a float, a numeric string or null.
/// Negative values saturate to 0.
pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(number.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// Score given by the evaluator for a single rule (P1, C3, R17, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleScore {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Full evaluation of one requirement text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    /// Raw total in [0, 320].
    #[serde(default, deserialize_with = "lenient_score")]
    pub total: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub scores: BTreeMap<String, RuleScore>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImprovedResult {
    #[serde(default, deserialize_with = "null_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_default")]
    pub improved: String,
    #[serde(default)]
    pub pattern_data: Value,
}

/// Backend explanation for one of the top rule improvements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    #[serde(rename = "ruleId", default, deserialize_with = "null_default")]
    pub rule_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
}

/// Response of `POST /improve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImproveResponse {
    #[serde(default)]
    pub original_scores: Evaluation,
    #[serde(default)]
    pub improved_result: ImprovedResult,
    #[serde(default)]
    pub improved_scores: Evaluation,
    #[serde(default)]
    pub comparison: Value,
    #[serde(default, deserialize_with = "null_default")]
    pub explanations: Vec<Explanation>,
}

#[derive(Debug, Serialize)]
pub struct ImproveRequest<'a> {
    pub text: &'a str,
    pub pattern_data: &'a Value,
}

#[derive(Debug, Serialize)]
pub struct EvaluateRequest<'a> {
    pub text: &'a str,
}

/// Generic `{status, message}` reply used by the write endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluation_tolerates_float_and_null_scores() {
        let eval: Evaluation = serde_json::from_value(json!({
            "total": 151.6,
            "scores": {
                "R1": {"score": 4, "name": "Structured"},
                "R2": {"score": null},
                "R3": {"score": "3"}
            }
        }))
        .unwrap();

        assert_eq!(eval.total, 152);
        assert_eq!(eval.scores["R1"].score, 4);
        assert_eq!(eval.scores["R2"].score, 0);
        assert_eq!(eval.scores["R3"].score, 3);
    }

    #[test]
    fn test_improve_response_defaults_missing_sections() {
        let resp: ImproveResponse = serde_json::from_value(json!({
            "original_scores": {"total": 100},
            "improved_result": {"improved": "text"},
            "explanations": null
        }))
        .unwrap();

        assert_eq!(resp.original_scores.total, 100);
        assert_eq!(resp.improved_scores.total, 0);
        assert_eq!(resp.improved_result.improved, "text");
        assert!(resp.explanations.is_empty());
    }

    #[test]
    fn test_explanation_uses_camel_case_rule_id() {
        let exp: Explanation =
            serde_json::from_value(json!({"ruleId": "R7", "title": "Vague", "content": "x"})).unwrap();
        assert_eq!(exp.rule_id, "R7");
    }
}
