//! Infrastructure for Dev Studio: configuration loading, the Anthropic and
//! OpenAI provider clients, and the file-backed session memory store.

pub mod config;
pub mod llm;
pub mod memory;
