use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::{lenient_score, null_default};
use crate::report::score::to_percentage;

/// Store-assigned record identifier. The bundled backend hands out integer
/// row ids; the type stays opaque so other stores can use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryId {
    Int(i64),
    Text(String),
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryId::Int(id) => write!(f, "{}", id),
            HistoryId::Text(id) => f.write_str(id),
        }
    }
}

/// A history record as returned by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub id: HistoryId,
    #[serde(default, deserialize_with = "null_default")]
    pub req_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub session_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub parent_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub original_text: String,
    #[serde(default, deserialize_with = "null_default")]
    pub improved_text: String,
    /// Percentage in [0, 100].
    #[serde(default, deserialize_with = "lenient_score")]
    pub original_score: u32,
    /// Percentage in [0, 100].
    #[serde(default, deserialize_with = "lenient_score")]
    pub improved_score: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub created_at: String,
    /// Complete scoring response. The backend stores it as text, so it
    /// usually comes back as a JSON string; see [`decode_full_data`].
    #[serde(default)]
    pub full_data: Value,
}

impl HistoryRecord {
    /// Lower-cased text the history search runs against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}% {}%",
            self.req_id,
            self.session_id,
            self.original_text,
            self.improved_text,
            self.original_score,
            self.improved_score
        )
        .to_lowercase()
    }

    /// Re-hydrate this record into the shape the input form expects.
    pub fn to_selected(&self) -> SelectedRecord {
        SelectedRecord {
            original: self.original_text.clone(),
            improved: self.improved_text.clone(),
            parent_id: parent_req_id(&self.req_id),
            full_data: decode_full_data(&self.full_data),
        }
    }

    /// Short `MM/DD` label for list cards. Accepts RFC 3339 and the
    /// backend's `YYYY-MM-DD HH:MM:SS`; anything else is shown as-is.
    pub fn date_label(&self) -> String {
        let raw = self.created_at.trim();
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return dt.format("%m/%d").to_string();
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return dt.format("%m/%d").to_string();
        }
        raw.to_string()
    }
}

/// Parent display id of a sub-requirement: `REQ-007-1` -> `REQ-007`.
/// A root id such as `REQ-007` (or one without any separator) has no parent.
pub fn parent_req_id(req_id: &str) -> String {
    match req_id.rsplit_once('-') {
        Some((prefix, _)) if prefix.contains('-') => prefix.to_string(),
        _ => String::new(),
    }
}

/// Parse `full_data` back to structured form when it was stored as text.
/// Text that is not JSON is returned unchanged.
pub fn decode_full_data(value: &Value) -> Value {
    match value {
        Value::String(text) => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
        }
        other => other.clone(),
    }
}

/// Body of `POST /history`: a record minus the store-assigned fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewHistoryRecord {
    pub original_text: String,
    pub improved_text: String,
    pub original_score: u32,
    pub improved_score: u32,
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_data: Option<Value>,
}

/// A finished submission handed to the synchronizer. Scores are raw
/// evaluator totals (0-320) and are normalized exactly once, here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryDraft {
    pub original_text: String,
    pub improved_text: String,
    pub original_score_raw: u32,
    pub improved_score_raw: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub full_data: Option<Value>,
}

impl HistoryDraft {
    pub fn into_new_record(self) -> NewHistoryRecord {
        NewHistoryRecord {
            original_text: self.original_text,
            improved_text: self.improved_text,
            original_score: to_percentage(self.original_score_raw),
            improved_score: to_percentage(self.improved_score_raw),
            parent_id: self.parent_id.unwrap_or_default().trim().to_string(),
            full_data: self.full_data,
        }
    }
}

/// Record shape of the pre-sync, client-local history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(default, deserialize_with = "null_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_default")]
    pub improved: String,
    /// Already a percentage.
    #[serde(default, deserialize_with = "lenient_score")]
    pub original_score: u32,
    /// Already a percentage.
    #[serde(default, deserialize_with = "lenient_score")]
    pub improved_score: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub parent_id: String,
    #[serde(default)]
    pub full_data: Option<Value>,
}

impl From<LegacyRecord> for NewHistoryRecord {
    fn from(legacy: LegacyRecord) -> Self {
        Self {
            original_text: legacy.original,
            improved_text: legacy.improved,
            original_score: legacy.original_score.min(100),
            improved_score: legacy.improved_score.min(100),
            parent_id: legacy.parent_id,
            full_data: legacy.full_data,
        }
    }
}

/// What the input form needs to resume from a past submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedRecord {
    pub original: String,
    pub improved: String,
    pub parent_id: String,
    pub full_data: Value,
}

/// A record plus the presentation fields the history panel renders.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: HistoryRecord,
    pub date_label: String,
    pub score_delta: i64,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        let date_label = record.date_label();
        let score_delta = record.improved_score as i64 - record.original_score as i64;
        Self {
            record,
            date_label,
            score_delta,
        }
    }
}

/// Outcome of one legacy migration pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MigrationReport {
    pub attempted: usize,
    pub migrated: usize,
    pub failed: usize,
}
