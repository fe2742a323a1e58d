pub mod answer_key;
pub mod llm_service;

pub use answer_key::{answer_key_lines, extract as extract_answer};
pub use llm_service::{LlmService, ModelClient};
