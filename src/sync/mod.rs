//! Sync Layer
//!
//! Reconciles the draft against the remote store.

mod engine;
mod id_map;
mod plan;
mod report;


pub use engine::SyncEngine;
pub use id_map::IdMap;
pub use plan::SyncPlan;
pub use report::{Phase, PhaseOutcome, PhaseStatus, SyncReport, SAVING_MESSAGE, SUCCESS_MESSAGE};
