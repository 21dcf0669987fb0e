//! EARS patterns and the structured input collected for each of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EarsPattern {
    Ubiquitous,
    EventDriven,
    Unwanted,
    StateDriven,
    Optional,
    Complex,
}

/// A form field a pattern collects.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PatternField {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

const fn field(key: &'static str, label: &'static str, placeholder: &'static str) -> PatternField {
    PatternField { key, label, placeholder }
}

const SYSTEM_RESPONSE: PatternField =
    field("system_response", "System response", "the system shall ...");
const PRECONDITION: PatternField = field("precondition", "Precondition", "While ...");
const TRIGGER: PatternField = field("trigger", "Trigger", "When ...");

impl EarsPattern {
    pub const ALL: [EarsPattern; 6] = [
        EarsPattern::Ubiquitous,
        EarsPattern::EventDriven,
        EarsPattern::Unwanted,
        EarsPattern::StateDriven,
        EarsPattern::Optional,
        EarsPattern::Complex,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EarsPattern::Ubiquitous => "ubiquitous",
            EarsPattern::EventDriven => "event-driven",
            EarsPattern::Unwanted => "unwanted",
            EarsPattern::StateDriven => "state-driven",
            EarsPattern::Optional => "optional",
            EarsPattern::Complex => "complex",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EarsPattern::Ubiquitous => "Ubiquitous",
            EarsPattern::EventDriven => "Event-Driven",
            EarsPattern::Unwanted => "Unwanted Behavior",
            EarsPattern::StateDriven => "State-Driven",
            EarsPattern::Optional => "Optional Feature",
            EarsPattern::Complex => "Complex",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EarsPattern::Ubiquitous => "Always active; no precondition or trigger.",
            EarsPattern::EventDriven => "Response to a triggering event.",
            EarsPattern::Unwanted => "Behavior the system must never exhibit.",
            EarsPattern::StateDriven => "Active while the system is in a given state.",
            EarsPattern::Optional => "Applies only where a feature is included.",
            EarsPattern::Complex => "Combination of state and event clauses.",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            EarsPattern::Ubiquitous => "The <system> shall <response>.",
            EarsPattern::EventDriven => {
                "While <precondition>, when <trigger>, the <system> shall <response>."
            }
            EarsPattern::Unwanted => "While <precondition>, the <system> shall not <action>.",
            EarsPattern::StateDriven => "While <state>, the <system> shall <response>.",
            EarsPattern::Optional => "Where <feature> is included, the <system> shall <response>.",
            EarsPattern::Complex => {
                "While <precondition>, when <trigger>, the <system> shall <response>."
            }
        }
    }

    pub fn fields(self) -> &'static [PatternField] {
        const UBIQUITOUS: &[PatternField] = &[SYSTEM_RESPONSE];
        const EVENT: &[PatternField] = &[PRECONDITION, TRIGGER, SYSTEM_RESPONSE];
        const UNWANTED: &[PatternField] = &[
            PRECONDITION,
            field("forbidden_action", "Forbidden action", "the system shall not ..."),
        ];
        const STATE: &[PatternField] = &[
            field("condition", "State", "While in ... mode"),
            SYSTEM_RESPONSE,
        ];
        const OPTIONAL: &[PatternField] = &[
            field("optional_feature", "Optional feature", "Where ... is included"),
            SYSTEM_RESPONSE,
        ];
        match self {
            EarsPattern::Ubiquitous => UBIQUITOUS,
            EarsPattern::EventDriven | EarsPattern::Complex => EVENT,
            EarsPattern::Unwanted => UNWANTED,
            EarsPattern::StateDriven => STATE,
            EarsPattern::Optional => OPTIONAL,
        }
    }
}

/// Catalog entry sent to the frontend pattern selector.
#[derive(Debug, Clone, Serialize)]
pub struct PatternInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub template: &'static str,
    pub fields: &'static [PatternField],
}

impl From<EarsPattern> for PatternInfo {
    fn from(p: EarsPattern) -> Self {
        Self {
            key: p.key(),
            label: p.label(),
            description: p.description(),
            template: p.template(),
            fields: p.fields(),
        }
    }
}

pub fn pattern_catalog() -> Vec<PatternInfo> {
    EarsPattern::ALL.into_iter().map(PatternInfo::from).collect()
}

/// Field values entered in pattern mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternInput {
    pub pattern: EarsPattern,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl PatternInput {
    /// `{pattern, ...}` with only the fields this pattern collects, trimmed;
    /// empty values are dropped.
    pub fn pattern_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("pattern".into(), Value::String(self.pattern.key().into()));
        for f in self.pattern.fields() {
            let Some(value) = self.fields.get(f.key) else { continue };
            let value = value.trim();
            if !value.is_empty() {
                data.insert(f.key.into(), Value::String(value.into()));
            }
        }
        Value::Object(data)
    }
}

/// Pattern data for a submission; direct mode sends `{}`.
pub fn pattern_data(input: Option<&PatternInput>) -> Value {
    input
        .map(PatternInput::pattern_data)
        .unwrap_or_else(|| Value::Object(Map::new()))
}
