//! Commands Layer
//!
//! Operator-facing handlers that bridge the CLI to the session and the
//! repository configuration.

mod catalog_cmd;
mod edit_cmd;
mod sync_cmd;

pub use catalog_cmd::*;
pub use edit_cmd::*;
pub use sync_cmd::*;
