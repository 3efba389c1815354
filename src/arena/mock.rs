//! Templated mock generation
//!
//! Used whenever a live provider call is not configured or fails. Output
//! depends only on the agent, the seed prompt and the message context, so it
//! never fails and is reproducible.

use tera::{Context, Tera};
use tracing::debug;

use crate::domain::{Agent, AgentRole, Message};

const RED_TEMPLATES: [&str; 4] = [
    "Building on the seed prompt \"{{ seed_prompt }}\", I propose we explore unconventional approaches that challenge traditional assumptions. What if we completely reimagine the problem space?",
    "Let's diverge from conventional thinking. Here are three radical ideas: 1) Invert the problem entirely, 2) Apply principles from an unrelated domain, 3) Remove the most obvious constraint.",
    "I'm thinking outside the box here. What if we combined elements that typically don't go together? This could lead to breakthrough innovations.",
    "Let me push the boundaries further. Consider this: what would happen if we scaled this idea 10x or reduced it to 1/10th? The extremes often reveal hidden opportunities.",
];

const BLUE_TEMPLATES: [&str; 4] = [
    "Evaluating the Red agent's proposal: While creative, we need to consider practical constraints. The feasibility score is moderate due to resource requirements and timeline considerations.",
    "Critical analysis: The idea has merit but faces three key challenges: 1) Technical complexity, 2) Market readiness, 3) Regulatory considerations. Let's address these systematically.",
    "From an evaluator's perspective, this approach scores well on novelty (85/100) but needs refinement on implementation details. Here's what needs work...",
    "Assessing risks and benefits: The potential value impact is significant, but we must weigh it against safety concerns and feasibility constraints. My recommendation is to proceed with modifications.",
];

const PURPLE_TEMPLATES: [&str; 4] = [
    "Synthesizing the divergent and evaluative perspectives: I propose a balanced approach that preserves the innovative core while addressing practical concerns. Here's the integrated solution...",
    "Bringing together Red's creativity and Blue's pragmatism, I suggest we: 1) Adopt the novel framework, 2) Implement Blue's risk mitigation strategies, 3) Phase the rollout to manage complexity.",
    "The optimal path forward combines elements from both perspectives. We can achieve the innovative vision by breaking it into achievable milestones with built-in validation checkpoints.",
    "Integration complete: By merging the bold vision with practical constraints, we arrive at a solution that's both groundbreaking and executable. Here's the unified strategy...",
];

const FALLBACK_TEMPLATE: &str = "As a {{ role }} agent, I'm processing the information and formulating a response based on the seed prompt: \"{{ seed_prompt }}\"";

/// Response persona of a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Divergent, adversarial
    Red,
    /// Defensive, evaluative
    Blue,
    /// Integrative
    Purple,
    /// Any role without a dedicated template table
    Fallback,
}

impl Persona {
    pub fn for_role(role: AgentRole) -> Self {
        match role {
            AgentRole::Red => Persona::Red,
            AgentRole::Blue => Persona::Blue,
            AgentRole::Purple => Persona::Purple,
            AgentRole::Human => Persona::Fallback,
        }
    }

    /// Ordered mock templates; the fallback persona has a single entry
    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Persona::Red => &RED_TEMPLATES,
            Persona::Blue => &BLUE_TEMPLATES,
            Persona::Purple => &PURPLE_TEMPLATES,
            Persona::Fallback => std::slice::from_ref(&FALLBACK_TEMPLATE),
        }
    }

    /// Instruction used as the system prompt of live calls
    pub fn instructions(&self) -> &'static str {
        match self {
            Persona::Red => "You are the Red agent: a divergent, adversarial thinker. Challenge assumptions, propose unconventional and radical ideas, and push the boundaries of the problem.",
            Persona::Blue => "You are the Blue agent: a critical evaluator. Assess the ideas on the table for feasibility, risk and constraints, and point out what needs to change.",
            Persona::Purple => "You are the Purple agent: an integrator. Synthesize the Red agent's creativity with the Blue agent's pragmatism into a balanced, executable plan.",
            Persona::Fallback => "You are a participant in a creative exploration session. Respond thoughtfully to the discussion so far.",
        }
    }
}

/// Generate the mock response of `agent` given everything said so far
pub fn generate_mock_response(agent: &Agent, seed_prompt: &str, context: &[Message]) -> String {
    let role = agent.role();
    let templates = Persona::for_role(role).templates();

    let own = context
        .iter()
        .filter(|m| m.agent_id == agent.id && m.role == role)
        .count();
    let template = templates[own % templates.len()];
    let body = render(template, role, seed_prompt);

    match last_other_role(role, context) {
        Some(other) => format!("Building on {}'s point: {}", other.label(), body),
        None => body,
    }
}

/// Role of the most recent message written by another non-human role
fn last_other_role(role: AgentRole, context: &[Message]) -> Option<AgentRole> {
    context
        .iter()
        .rev()
        .map(|m| m.role)
        .find(|r| *r != role && *r != AgentRole::Human)
}

fn render(template: &str, role: AgentRole, seed_prompt: &str) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    let mut context = Context::new();
    context.insert("seed_prompt", seed_prompt);
    context.insert("role", role.as_str());

    match Tera::one_off(template, &context, false) {
        Ok(rendered) => rendered,
        Err(e) => {
            debug!("Mock template render failed, using raw template: {}", e);
            template.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(role: AgentRole) -> Agent {
        Agent::new(format!("agent-{}", role), format!("{} Agent", role.label()), role)
    }

    #[test]
    fn test_first_red_response_interpolates_seed() {
        let red = agent(AgentRole::Red);
        let text = generate_mock_response(&red, "better bike lanes", &[]);
        assert!(text.starts_with("Building on the seed prompt \"better bike lanes\""));
    }

    #[test]
    fn test_selection_cycles_with_period_four() {
        let blue = agent(AgentRole::Blue);
        let mut context = Vec::new();
        let mut seen = Vec::new();
        for _ in 0..8 {
            let text = generate_mock_response(&blue, "seed", &context);
            seen.push(text.clone());
            context.push(Message::from_agent(&blue, text));
        }
        assert_eq!(seen[0..4], seen[4..8]);
        assert_ne!(seen[0], seen[1]);
    }

    #[test]
    fn test_prefix_names_latest_other_role() {
        let red = agent(AgentRole::Red);
        let blue = agent(AgentRole::Blue);
        let human = agent(AgentRole::Human);
        let context = vec![
            Message::from_agent(&red, "idea"),
            Message::from_agent(&human, "interjection"),
        ];

        let text = generate_mock_response(&blue, "seed", &context);
        assert!(text.starts_with("Building on Red's point: Evaluating the Red agent's proposal"));
    }

    #[test]
    fn test_no_prefix_when_only_own_role_spoke() {
        let purple = agent(AgentRole::Purple);
        let context = vec![Message::from_agent(&purple, "earlier")];
        let text = generate_mock_response(&purple, "seed", &context);
        assert!(text.starts_with("Bringing together"));
    }

    #[test]
    fn test_human_uses_fallback_template() {
        let human = agent(AgentRole::Human);
        let text = generate_mock_response(&human, "seed", &[]);
        assert_eq!(
            text,
            "As a human agent, I'm processing the information and formulating a response based on the seed prompt: \"seed\""
        );
    }

    #[test]
    fn test_seed_with_template_syntax_is_inserted_verbatim() {
        let red = agent(AgentRole::Red);
        let text = generate_mock_response(&red, "{{ nope }}", &[]);
        assert!(text.contains("\"{{ nope }}\""));
    }
}
