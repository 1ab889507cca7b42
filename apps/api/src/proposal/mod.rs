// Proposal generation: form intake, prompt building, generation orchestration, export.
// All provider calls go through llm_client; nothing here speaks a provider's wire format.

pub mod builder;
pub mod export;
pub mod form;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
