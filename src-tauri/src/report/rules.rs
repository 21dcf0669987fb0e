use std::cmp::Ordering;

use serde::Serialize;

/// One entry of the rule taxonomy.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: &'static str,
    pub name_en: &'static str,
    pub name_ko: &'static str,
}

const fn rule(id: &'static str, name_en: &'static str, name_ko: &'static str) -> RuleDefinition {
    RuleDefinition { id, name_en, name_ko }
}

/// Pattern elements P1-P7, quality characteristics C1-C15 and writing rules R1-R42.
pub const RULES: &[RuleDefinition] = &[
    rule("P1", "Subject", "주어"),
    rule("P2", "Modal Verb", "조동사"),
    rule("P3", "Action", "행위"),
    rule("P4", "Object", "목적어"),
    rule("P5", "Performance Measure", "성능 기준"),
    rule("P6", "Condition Clause", "조건절"),
    rule("P7", "Qualification Clause", "제약 조건"),
    rule("C1", "Necessary", "필수성"),
    rule("C2", "Appropriate", "적절성"),
    rule("C3", "Unambiguous", "명확성"),
    rule("C4", "Complete", "완전성"),
    rule("C5", "Singular", "단일성"),
    rule("C6", "Feasible", "실현 가능성"),
    rule("C7", "Verifiable", "검증 가능성"),
    rule("C8", "Correct", "정확성"),
    rule("C9", "Conforming", "준수성"),
    rule("C10", "Complete (Set)", "완전성(집합)"),
    rule("C11", "Consistent", "일관성"),
    rule("C12", "Feasible (Set)", "실현 가능성(집합)"),
    rule("C13", "Comprehensible", "이해 용이성"),
    rule("C14", "Validatable", "타당성 확인 가능성"),
    rule("C15", "Correct (Set)", "정확성(집합)"),
    rule("R1", "Structured Statements", "구조화"),
    rule("R2", "Active Voice", "능동태"),
    rule("R3", "Appropriate Subject-Verb", "적절한 주어-동사"),
    rule("R4", "Defined Terms", "정의된 용어"),
    rule("R5", "Definite Articles", "명확한 지칭"),
    rule("R6", "Common Units of Measure", "단위 사용"),
    rule("R7", "Vague Terms", "모호한 용어 금지"),
    rule("R8", "Escape Clauses", "면책 조항 금지"),
    rule("R9", "Open-Ended Clauses", "포괄적 용어 금지"),
    rule("R10", "Superfluous Infinitives", "간결한 표현"),
    rule("R11", "Separate Clauses", "절 분리"),
    rule("R12", "Correct Grammar", "문법"),
    rule("R13", "Correct Spelling", "철자"),
    rule("R14", "Correct Punctuation", "구두점"),
    rule("R15", "Logical Expressions", "논리 표현"),
    rule("R16", "Use of \"Not\"", "부정문 사용"),
    rule("R17", "Use of Oblique Symbol", "빗금 사용 금지"),
    rule("R18", "Single Thought Sentence", "단일 개념"),
    rule("R19", "Combinators", "결합어 금지"),
    rule("R20", "Purpose Phrases", "목적 구문 금지"),
    rule("R21", "Parentheses", "괄호 사용 최소화"),
    rule("R22", "Enumeration", "나열 금지"),
    rule("R23", "Supporting Diagrams", "도표 참조"),
    rule("R24", "Pronouns", "대명사 금지"),
    rule("R25", "Headings", "제목 독립성"),
    rule("R26", "Absolutes", "비현실적 절대어 금지"),
    rule("R27", "Explicit Conditions", "명확한 조건"),
    rule("R28", "Multiple Conditions", "명확한 AND/OR"),
    rule("R29", "Classification", "적절한 분류"),
    rule("R30", "Unique Expression", "고유한 표현"),
    rule("R31", "Solution Free", "솔루션 미포함"),
    rule("R32", "Universal Qualification", "개별 지칭"),
    rule("R33", "Range of Values", "값 범위 정의"),
    rule("R34", "Measurable Performance", "측정 가능한 성능"),
    rule("R35", "Temporal Dependencies", "구체적 시간 의존성"),
    rule("R36", "Consistent Terms and Units", "일관된 용어/단위"),
    rule("R37", "Acronyms", "약어 정의"),
    rule("R38", "Abbreviations", "모호한 약어 금지"),
    rule("R39", "Style Guide", "스타일 가이드 준수"),
    rule("R40", "Decimal Format", "일관된 소수점 형식"),
    rule("R41", "Related Requirements", "논리적 그룹화"),
    rule("R42", "Structured Sets", "구조화된 템플릿"),
];

pub fn find_rule(id: &str) -> Option<&'static RuleDefinition> {
    RULES.iter().find(|r| r.id == id)
}

/// Display name such as `능동태 (Active Voice)`, if the rule is known.
pub fn display_name(id: &str) -> Option<String> {
    find_rule(id).map(|r| format!("{} ({})", r.name_ko, r.name_en))
}

/// Order rule ids by type letter, then numerically (`R9` before `R10`).
pub fn compare_rule_ids(a: &str, b: &str) -> Ordering {
    let (a_kind, a_num) = split_rule_id(a);
    let (b_kind, b_num) = split_rule_id(b);
    a_kind
        .cmp(b_kind)
        .then(a_num.cmp(&b_num))
        .then_with(|| a.cmp(b))
}

fn split_rule_id(id: &str) -> (&str, u32) {
    let split = id.char_indices().nth(1).map(|(i, _)| i).unwrap_or(id.len());
    let (kind, rest) = id.split_at(split);
    (kind, rest.parse().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete() {
        let count = |prefix: char| RULES.iter().filter(|r| r.id.starts_with(prefix)).count();
        assert_eq!(count('P'), 7);
        assert_eq!(count('C'), 15);
        assert_eq!(count('R'), 42);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("R2").as_deref(), Some("능동태 (Active Voice)"));
        assert!(display_name("X1").is_none());
    }

    #[test]
    fn test_rule_ordering() {
        let mut ids = vec!["R10", "P2", "C12", "R9", "C3", "R1"];
        ids.sort_by(|a, b| compare_rule_ids(a, b));
        assert_eq!(ids, vec!["C3", "C12", "P2", "R1", "R9", "R10"]);
    }
}
