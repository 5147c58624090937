// Career analysis: prompt building, the model call, and response normalization.
// All model calls go through llm_client — nothing here talks HTTP directly.

pub mod handlers;
pub mod normalizer;
pub mod planner;
pub mod prompt_builder;
pub mod prompts;
