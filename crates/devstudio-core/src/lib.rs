//! Business logic and port definitions for Dev Studio.
//!
//! This crate defines the provider trait and adapter, the request validator,
//! the prompt templates, and the storage "ports" (repository traits) that the
//! infrastructure layer implements. It depends only on `devstudio-types` --
//! never on `devstudio-infra` or any HTTP/IO crate.

pub mod llm;
pub mod memory;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod validation;
