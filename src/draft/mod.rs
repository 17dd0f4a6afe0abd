//! Draft Layer
//!
//! The local edit buffer and the hooks the sync engine uses to fold confirmed
//! results back into it.

mod reconcile;
mod store;

#[cfg(test)]
mod tests;

pub use store::DraftStore;
