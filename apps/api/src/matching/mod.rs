// Rule-based skill recommendations against the taxonomy. No LLM involvement.

pub mod handlers;
pub mod skill_matcher;
