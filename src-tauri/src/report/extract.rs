//! Pull structured pieces out of the improvement text the backend returns.
//!
//! The text is markdown-like with numbered `###` headings. Grammar:
//!
//! - The improved requirements live in the block that starts on the line
//!   after a `### 2.` heading and ends at the next `### 3.` heading or at the
//!   end of the text. No such block means no cards.
//! - Inside that block, cards are found with the first rule that matches:
//!   1. headed blocks, `**요구사항 N (Pattern: X):**` or
//!      `**Requirement N (Pattern: X):**`, each running to the next header or
//!      to a `(If single ...` note;
//!   2. list items starting with `N.` or `-` at the start of a line, each
//!      running to the next item or a blank line;
//!   3. the whole block as one card.
//! - Recommendations follow a `### 5.` heading naming the additional
//!   recommendations.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static IMPROVED_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)### 2\.[^\n]*\n(.*?)(?:### 3\.|\z)").expect("valid section regex")
});

static REQUIREMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?:요구사항|Requirement)\s+(\d+)\s+\(Pattern:\s*(.+?)\):\*\*[ \t]*\r?\n")
        .expect("valid header regex")
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.|-)\s+(.+)$").expect("valid list regex"));

static RECOMMENDATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)###\s*5\.[^\n]*?(?:추가 개선 권장사항|(?i:additional (?:improvement )?recommendations))[^\n]*(?:\n|\z)(.*)",
    )
    .expect("valid recommendations regex")
});

static RECOMMENDATION_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n|\s+-\s+").expect("valid split regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•✅☑✔])\x{FE0F}?\s*").expect("valid bullet regex"));

const SINGLE_NOTE: &str = "\n\n(If single";

/// One improved requirement, as shown on a result card.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RequirementCard {
    pub number: u32,
    pub text: String,
    pub pattern: Option<String>,
}

/// The `### 2.` block, trimmed.
pub fn improved_section(full_text: &str) -> Option<String> {
    IMPROVED_SECTION
        .captures(full_text)
        .map(|caps| caps[1].trim().to_string())
}

pub fn requirement_cards(full_text: &str) -> Vec<RequirementCard> {
    let Some(section) = improved_section(full_text) else {
        return Vec::new();
    };

    let headed = headed_requirements(&section);
    if !headed.is_empty() {
        return headed;
    }

    let items = list_items(&section);
    if !items.is_empty() {
        return items
            .into_iter()
            .enumerate()
            .map(|(i, text)| RequirementCard {
                number: i as u32 + 1,
                text,
                pattern: None,
            })
            .collect();
    }

    if section.is_empty() {
        return Vec::new();
    }
    vec![RequirementCard {
        number: 1,
        text: section,
        pattern: None,
    }]
}

fn headed_requirements(section: &str) -> Vec<RequirementCard> {
    let headers: Vec<_> = REQUIREMENT_HEADER.captures_iter(section).collect();
    let mut cards = Vec::with_capacity(headers.len());

    for (i, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let body_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(section.len());
        let mut body = &section[whole.end()..body_end];
        if let Some(note) = body.find(SINGLE_NOTE) {
            body = &body[..note];
        }
        let text = body.trim();
        if text.is_empty() {
            continue;
        }
        cards.push(RequirementCard {
            number: caps[1].parse().unwrap_or(i as u32 + 1),
            text: text.to_string(),
            pattern: Some(caps[2].trim().to_string()),
        });
    }
    cards
}

fn list_items(section: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Option<String> = None;

    for line in section.lines() {
        if let Some(caps) = LIST_ITEM.captures(line) {
            items.extend(current.take());
            current = Some(caps[1].to_string());
        } else if line.trim().is_empty() {
            items.extend(current.take());
        } else if let Some(item) = current.as_mut() {
            item.push('\n');
            item.push_str(line);
        }
    }
    items.extend(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Additional recommendations after the `### 5.` heading. `none` / `없음`
/// and a missing heading both yield an empty list.
pub fn recommendations(full_text: &str) -> Vec<String> {
    let Some(caps) = RECOMMENDATIONS.captures(full_text) else {
        return Vec::new();
    };
    let body = caps[1].trim();
    let body = body.strip_suffix("```").unwrap_or(body).trim();
    if body.is_empty() || body.eq_ignore_ascii_case("none") || body == "없음" {
        return Vec::new();
    }

    RECOMMENDATION_SPLIT
        .split(body)
        .map(|item| BULLET.replace(item.trim(), "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
