use serde::{Deserialize, Serialize};
use tauri::State;
use tracing::{info, warn};

use crate::api::{check_configuration, ApiClient, ImproveResponse};
use crate::error::CodeliaError;
use crate::history::{AppHistory, HistoryDraft, HistorySync, LegacyStore, RemoteHistoryStore};
use crate::pattern::{self, PatternInput};
use crate::report::{AnalysisReport, EvaluationReport};

/// What the user submitted from the improve page.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementDraft {
    pub text: String,
    /// `None` in direct mode.
    #[serde(default)]
    pub pattern: Option<PatternInput>,
    /// Set when re-improving a requirement picked from history.
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImproveOutcome {
    pub report: AnalysisReport,
    pub history_saved: bool,
    pub history_error: Option<String>,
}

#[tauri::command]
pub async fn improve_requirement(
    api: State<'_, ApiClient>,
    history: State<'_, AppHistory>,
    draft: RequirementDraft,
) -> Result<ImproveOutcome, String> {
    Ok(submit_requirement(api.inner(), history.inner(), draft).await?)
}

#[tauri::command]
pub async fn evaluate_requirement(
    api: State<'_, ApiClient>,
    text: String,
) -> Result<EvaluationReport, String> {
    let text = validated_text(&text)?;
    let evaluation = api.evaluate(text).await?;
    Ok(EvaluationReport::build(&evaluation))
}

fn validated_text(text: &str) -> Result<&str, CodeliaError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CodeliaError::InvalidInput("Please enter a requirement".to_string()));
    }
    Ok(text)
}

/// Improve a requirement and record it in history.
///
/// A history failure does not fail the submission; the report is returned
/// with `history_saved: false`.
pub async fn submit_requirement<R, L>(
    api: &ApiClient,
    history: &HistorySync<R, L>,
    draft: RequirementDraft,
) -> Result<ImproveOutcome, CodeliaError>
where
    R: RemoteHistoryStore,
    L: LegacyStore,
{
    let text = validated_text(&draft.text)?;

    let status = check_configuration(&api.get_config().await?);
    if !status.is_valid {
        return Err(CodeliaError::Config(
            "Set an API key and the project context in Settings first".to_string(),
        ));
    }

    let pattern_data = pattern::pattern_data(draft.pattern.as_ref());
    let raw = api.improve(text, &pattern_data).await?;
    let response: ImproveResponse = serde_json::from_value(raw.clone())?;
    let report = AnalysisReport::build(&response);
    info!(
        "Improved requirement: {} -> {} ({:+} points)",
        report.original.total, report.improved.total, report.delta.points
    );

    let record = HistoryDraft {
        original_text: text.to_string(),
        improved_text: response.improved_result.improved,
        original_score_raw: response.original_scores.total,
        improved_score_raw: response.improved_scores.total,
        parent_id: draft.parent_id,
        full_data: Some(raw),
    };
    let (history_saved, history_error) = match history.add_record(record).await {
        Ok(()) => (true, None),
        Err(e) => {
            warn!("Improvement not recorded in history: {}", e);
            (false, Some(e.to_string()))
        }
    };

    Ok(ImproveOutcome {
        report,
        history_saved,
        history_error,
    })
}
