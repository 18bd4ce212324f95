use super::accessibility::{AxElement, Frame, Point};
use crate::{Result, TargetError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Minimum acceptable score for a single-best match. Below this the engine
/// refuses rather than guesses; a wrong tap is unrecoverable on a live UI.
pub const CONFIDENCE_FLOOR: u32 = 50;

pub const DEFAULT_MATCH_LIMIT: usize = 20;
pub const MAX_MATCH_LIMIT: usize = 200;

/// Role names that mark an element as interactive. Each entry is matched
/// case-insensitively in both its spaced and concatenated spelling, so
/// "text field" catches both "Text Field" role descriptions and "TextField"
/// type strings.
const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "text field",
    "secure text field",
    "search field",
    "switch",
    "slider",
    "link",
    "cell",
    "tab bar button",
    "checkbox",
    "radio button",
];

static ROLE_SPELLINGS: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    INTERACTIVE_ROLES
        .iter()
        .map(|role| (role.to_string(), role.replace(' ', "")))
        .collect()
});

/// A scored pairing of a query string to one element. `centre` is present
/// iff the element's frame has four finite components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub score: u32,
    pub label: String,
    pub kind: Option<String>,
    pub frame: Option<Frame>,
    pub centre: Option<Point>,
}

/// Case-folds and collapses internal whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Scores a query against one candidate string on the fixed 0-100 scale.
pub fn score_match(query: &str, candidate: &str) -> u32 {
    let q = normalize(query);
    let c = normalize(candidate);
    if q.is_empty() || c.is_empty() {
        return 0;
    }
    if c == q {
        return 100;
    }
    if c.starts_with(&q) {
        return 90;
    }
    if c.contains(&q) {
        return 80;
    }
    if q.contains(&c) {
        return 60;
    }

    let candidate_tokens: Vec<&str> = c.split_whitespace().collect();
    let query_tokens: Vec<&str> = q.split_whitespace().collect();
    let overlap = query_tokens
        .iter()
        .filter(|t| candidate_tokens.contains(t))
        .count();
    (50.0 * overlap as f64 / query_tokens.len() as f64).round() as u32
}

/// An element's score is the maximum over its label candidate fields, each
/// scored independently; fields are never concatenated first.
pub fn score_element(query: &str, element: &AxElement) -> u32 {
    [
        element.label(),
        element.ax_label.as_deref(),
        element.title.as_deref(),
        element.value.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|field| score_match(query, field))
    .max()
    .unwrap_or(0)
}

fn role_is_interactive(text: &str) -> bool {
    let folded = normalize(text);
    ROLE_SPELLINGS
        .iter()
        .any(|(spaced, concat)| folded.contains(spaced) || folded.contains(concat))
}

/// An element qualifies only if it is not disabled, carries a non-empty
/// label, and its role description or type names an interactive role.
pub fn is_interactive(element: &AxElement) -> bool {
    if !element.is_enabled() {
        return false;
    }
    if element.label().is_none() {
        return false;
    }
    element
        .role_description
        .as_deref()
        .is_some_and(role_is_interactive)
        || element.kind.as_deref().is_some_and(role_is_interactive)
}

fn to_candidate(element: &AxElement, score: u32) -> MatchCandidate {
    MatchCandidate {
        score,
        label: element.label().unwrap_or_default().to_string(),
        kind: element.kind.clone(),
        frame: element.frame,
        centre: element.centre(),
    }
}

/// Ranks every interactive element with a positive score, best first.
/// Recomputed from scratch on every call; equal scores keep snapshot order.
pub fn find_all(query: &str, snapshot: &[AxElement], limit: Option<usize>) -> Vec<MatchCandidate> {
    let limit = limit.unwrap_or(DEFAULT_MATCH_LIMIT).clamp(1, MAX_MATCH_LIMIT);

    let mut matches: Vec<MatchCandidate> = snapshot
        .iter()
        .filter(|e| is_interactive(e))
        .filter_map(|e| {
            let score = score_element(query, e);
            (score > 0).then(|| to_candidate(e, score))
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(limit);
    matches
}

/// Returns the single best tappable match, or `NoConfidentMatch` when the
/// best tappable score falls below the confidence floor. Elements without a
/// usable frame are skipped, not disqualifying: the next-best scorable
/// element wins instead.
pub fn find_best(query: &str, snapshot: &[AxElement]) -> Result<MatchCandidate> {
    let mut best: Option<MatchCandidate> = None;

    for element in snapshot.iter().filter(|e| is_interactive(e)) {
        if element.centre().is_none() {
            continue;
        }
        let score = score_element(query, element);
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(to_candidate(element, score));
        }
    }

    match best {
        Some(candidate) if candidate.score >= CONFIDENCE_FLOOR => Ok(candidate),
        Some(candidate) => Err(TargetError::NoConfidentMatch {
            best_score: candidate.score,
        }),
        None => Err(TargetError::NoConfidentMatch { best_score: 0 }),
    }
}

/// Validates explicit coordinates for the engine-bypassing tap path.
pub fn explicit_tap_point(x: f64, y: f64) -> Result<Point> {
    if !x.is_finite() || !y.is_finite() {
        return Err(TargetError::Mcp(
            "Tap coordinates must be finite numbers".to_string(),
        ));
    }
    Ok(Point { x, y })
}
