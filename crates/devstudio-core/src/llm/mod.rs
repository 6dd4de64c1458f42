//! LLM provider abstractions for Dev Studio.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ProviderAdapter`: provider selection, timeout, retry, and
//!   normalization of every outcome into an `AiResponse`

pub mod adapter;
pub mod box_provider;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;
