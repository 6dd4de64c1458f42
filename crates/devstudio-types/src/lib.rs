//! Shared domain types for Dev Studio.
//!
//! This crate contains the core domain types used across the workspace:
//! projects and their files, chat messages, operation requests, LLM
//! request/response shapes, configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod operation;
pub mod project;
