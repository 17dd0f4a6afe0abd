//! Topic Editor
//!
//! Layered architecture:
//! - domain: Draft entities, identifiers and errors
//! - draft: In-memory edit buffer
//! - repository: Remote store abstraction and implementations
//! - sync: Multi-phase save engine
//! - session / commands: Operator-facing operations over one draft

pub mod commands;
pub mod config;
pub mod domain;
pub mod draft;
pub mod repository;
pub mod session;
pub mod sync;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use session::Session;
