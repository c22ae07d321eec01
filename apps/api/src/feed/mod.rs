//! Recommendation and feedback orchestration plus their HTTP handlers.

pub mod handlers;
pub mod locks;
pub mod service;
