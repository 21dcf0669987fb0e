use crate::pattern::{pattern_catalog, PatternInfo};
use crate::report::rules::{RuleDefinition, RULES};
use crate::report::score::{Category, CATEGORIES};

#[tauri::command]
pub fn get_rule_catalog() -> Vec<RuleDefinition> {
    RULES.to_vec()
}

#[tauri::command]
pub fn get_rule_categories() -> Vec<Category> {
    CATEGORIES.to_vec()
}

#[tauri::command]
pub fn list_ears_patterns() -> Vec<PatternInfo> {
    pattern_catalog()
}
