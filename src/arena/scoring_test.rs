use super::scoring::{calculate_average_score, calculate_heuristic_score, score_message};
use crate::domain::{Agent, AgentRole, Message, Score};

fn message(content: &str) -> Message {
    let agent = Agent::new("agent-red", "Red Agent", AgentRole::Red);
    Message::from_agent(&agent, content)
}

fn in_range(score: &Score) -> bool {
    score.axes().iter().all(|v| (0.0..=100.0).contains(v))
}

#[test]
fn test_first_message_has_baseline_novelty() {
    let score = calculate_heuristic_score("A plain sentence", &[]);
    assert_eq!(score.novelty, 75.0);
    assert_eq!(score.feasibility, 60.0);
    assert_eq!(score.value_impact, 50.0);
    assert_eq!(score.safety, 80.0);
    assert_eq!(score.exploration_index, 75.0 * 0.6 + 60.0 * 0.4);
}

#[test]
fn test_novelty_counts_unseen_tokens() {
    let previous = vec![message("alpha beta")];
    // "alpha" seen, "gamma" unseen: ratio 0.5
    let score = calculate_heuristic_score("Alpha gamma", &previous);
    assert_eq!(score.novelty, 75.0);

    let score = calculate_heuristic_score("alpha beta", &previous);
    assert_eq!(score.novelty, 50.0);

    let score = calculate_heuristic_score("delta epsilon", &previous);
    assert_eq!(score.novelty, 100.0);
}

#[test]
fn test_empty_content_with_history() {
    let previous = vec![message("something")];
    let score = calculate_heuristic_score("   ", &previous);
    assert_eq!(score.novelty, 50.0);
    assert!(in_range(&score));
}

#[test]
fn test_keywords_count_once() {
    let score = calculate_heuristic_score("build build build", &[]);
    assert_eq!(score.feasibility, 65.0);

    let score = calculate_heuristic_score("This is impossible and unrealistic", &[]);
    // "possible" and "realistic" occur inside the negative keywords
    assert_eq!(score.feasibility, 60.0 + 10.0 - 20.0);
}

#[test]
fn test_value_impact_length_bonus() {
    let long: String = vec!["word"; 101].join(" ");
    assert_eq!(calculate_heuristic_score(&long, &[]).value_impact, 70.0);

    let medium: String = vec!["word"; 51].join(" ");
    assert_eq!(calculate_heuristic_score(&medium, &[]).value_impact, 60.0);

    let short: String = vec!["word"; 50].join(" ");
    assert_eq!(calculate_heuristic_score(&short, &[]).value_impact, 50.0);
}

#[test]
fn test_safety_is_floored_at_zero() {
    let content = "dangerous harmful risky threat damage destroy attack exploit vulnerability";
    let score = calculate_heuristic_score(content, &[]);
    assert_eq!(score.safety, 0.0);
    assert!(in_range(&score));
}

#[test]
fn test_unsafe_also_matches_safe() {
    let score = calculate_heuristic_score("unsafe", &[]);
    assert_eq!(score.safety, 80.0 - 15.0 + 5.0);
}

#[test]
fn test_scores_never_exceed_hundred() {
    let content = "benefit improve enhance optimize valuable important significant impact effective efficient \
                   implement build create develop design practical realistic achievable feasible \
                   safe secure protected reliable stable tested verified validated";
    let score = calculate_heuristic_score(content, &[]);
    assert_eq!(score.value_impact, 100.0);
    assert_eq!(score.feasibility, 100.0);
    assert_eq!(score.safety, 100.0);
    assert!(in_range(&score));
}

#[test]
fn test_scoring_is_deterministic() {
    let previous = vec![message("Evaluate the risks"), message("Build a prototype")];
    let m = message("We can build something safe and effective");
    assert_eq!(score_message(&m, &previous), score_message(&m, &previous));
}

#[test]
fn test_average_of_unscored_is_zero() {
    assert_eq!(calculate_average_score(&[]), Score::ZERO);
    assert_eq!(calculate_average_score(&[message("a"), message("b")]), Score::ZERO);
}

#[test]
fn test_average_skips_unscored() {
    let a = message("a").with_score(Score {
        novelty: 60.0,
        feasibility: 40.0,
        value_impact: 50.0,
        safety: 100.0,
        exploration_index: 52.0,
    });
    let b = message("b").with_score(Score {
        novelty: 80.0,
        feasibility: 60.0,
        value_impact: 70.0,
        safety: 50.0,
        exploration_index: 72.0,
    });
    let average = calculate_average_score(&[a, message("unscored"), b]);
    assert_eq!(average.novelty, 70.0);
    assert_eq!(average.feasibility, 50.0);
    assert_eq!(average.value_impact, 60.0);
    assert_eq!(average.safety, 75.0);
    assert_eq!(average.exploration_index, 62.0);
}
