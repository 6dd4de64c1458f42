//! HTTP request handlers, grouped by resource.

pub mod ai;
pub mod chat;
pub mod health;
pub mod memory;
pub mod project;
