//! Admission filter
//!
//! Runs on every viewer request before any other stage. With no deny rules
//! configured it passes the request through untouched.

use super::{EdgeRequest, EdgeResponse, StageOutcome};

#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    /// Case-insensitive substrings that reject a request's `user-agent`
    blocked_user_agents: Vec<String>,
}

impl AdmissionFilter {
    /// Pass-through filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked_user_agents(patterns: &[String]) -> Self {
        Self {
            blocked_user_agents: patterns
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| p.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn evaluate(&self, request: EdgeRequest) -> StageOutcome {
        if self.is_blocked(&request) {
            return StageOutcome::Respond(EdgeResponse::forbidden());
        }
        StageOutcome::Continue(request)
    }

    fn is_blocked(&self, request: &EdgeRequest) -> bool {
        if self.blocked_user_agents.is_empty() {
            return false;
        }
        let Some(agent) = request.header("user-agent") else {
            return false;
        };
        let agent = agent.to_ascii_lowercase();
        self.blocked_user_agents
            .iter()
            .any(|pattern| agent.contains(pattern.as_str()))
    }
}
