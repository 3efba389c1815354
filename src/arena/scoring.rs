//! Heuristic message scoring
//!
//! Scores are a pure function of a message's content and the messages that
//! preceded it. Nothing here touches I/O or clocks, so the same inputs always
//! produce bit-identical scores.

use std::collections::HashSet;

use crate::domain::{Message, Score};

const NOVELTY_BASELINE: f64 = 75.0;

const FEASIBILITY_BASE: f64 = 60.0;
const FEASIBLE_KEYWORDS: [&str; 10] = [
    "implement", "build", "create", "develop", "design",
    "practical", "realistic", "achievable", "possible", "feasible",
];
const INFEASIBLE_KEYWORDS: [&str; 7] = [
    "impossible", "unrealistic", "impractical", "unfeasible",
    "cannot", "never", "unlikely",
];

const VALUE_BASE: f64 = 50.0;
const VALUE_KEYWORDS: [&str; 10] = [
    "benefit", "improve", "enhance", "optimize", "valuable",
    "important", "significant", "impact", "effective", "efficient",
];

const SAFETY_BASE: f64 = 80.0;
const UNSAFE_KEYWORDS: [&str; 10] = [
    "dangerous", "harmful", "risky", "unsafe", "threat",
    "damage", "destroy", "attack", "exploit", "vulnerability",
];
const SAFE_KEYWORDS: [&str; 8] = [
    "safe", "secure", "protected", "reliable", "stable",
    "tested", "verified", "validated",
];

/// Score `content` against the messages that came before it
pub fn calculate_heuristic_score(content: &str, previous: &[Message]) -> Score {
    let content = content.to_lowercase();
    let word_count = content.split_whitespace().count();

    let novelty = clamp(novelty(&content, previous));
    let feasibility = clamp(feasibility(&content));
    let value_impact = clamp(value_impact(&content, word_count));
    let safety = clamp(safety(&content));
    let exploration_index = clamp(novelty * 0.6 + feasibility * 0.4);

    Score {
        novelty,
        feasibility,
        value_impact,
        safety,
        exploration_index,
    }
}

/// Score a message against the messages that came before it
pub fn score_message(message: &Message, previous: &[Message]) -> Score {
    calculate_heuristic_score(&message.content, previous)
}

/// Per-axis mean over the messages that carry a score.
///
/// Returns [`Score::ZERO`] when no message is scored.
pub fn calculate_average_score(messages: &[Message]) -> Score {
    let scores: Vec<&Score> = messages.iter().filter_map(|m| m.score.as_ref()).collect();
    if scores.is_empty() {
        return Score::ZERO;
    }

    let n = scores.len() as f64;
    let mean = |axis: fn(&Score) -> f64| scores.iter().map(|s| axis(s)).sum::<f64>() / n;

    Score {
        novelty: mean(|s| s.novelty),
        feasibility: mean(|s| s.feasibility),
        value_impact: mean(|s| s.value_impact),
        safety: mean(|s| s.safety),
        exploration_index: mean(|s| s.exploration_index),
    }
}

fn novelty(content: &str, previous: &[Message]) -> f64 {
    if previous.is_empty() {
        return NOVELTY_BASELINE;
    }

    let words: HashSet<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return 50.0;
    }

    let previous_lower: Vec<String> = previous.iter().map(|m| m.content.to_lowercase()).collect();
    let previous_words: HashSet<&str> = previous_lower
        .iter()
        .flat_map(|c| c.split_whitespace())
        .collect();

    let unseen = words.iter().filter(|w| !previous_words.contains(*w)).count();
    let ratio = unseen as f64 / words.len() as f64;

    50.0 + ratio * 50.0
}

fn feasibility(content: &str) -> f64 {
    FEASIBILITY_BASE + 5.0 * matches(content, &FEASIBLE_KEYWORDS)
        - 10.0 * matches(content, &INFEASIBLE_KEYWORDS)
}

fn value_impact(content: &str, word_count: usize) -> f64 {
    let mut score = VALUE_BASE + 6.0 * matches(content, &VALUE_KEYWORDS);
    if word_count > 50 {
        score += 10.0;
    }
    if word_count > 100 {
        score += 10.0;
    }
    score
}

fn safety(content: &str) -> f64 {
    SAFETY_BASE - 15.0 * matches(content, &UNSAFE_KEYWORDS) + 5.0 * matches(content, &SAFE_KEYWORDS)
}

/// Number of keywords occurring in `content`; repeats count once
fn matches(content: &str, keywords: &[&str]) -> f64 {
    keywords.iter().filter(|k| content.contains(*k)).count() as f64
}

fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
