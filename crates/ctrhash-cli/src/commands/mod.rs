//! CLI Command Implementations
//!
//! - [`hash`]: Batch hashing of record streams
//! - [`inspect`]: Per-feature mapping of a single record

mod hash;
mod inspect;

pub use hash::{FormatArg, HashCommand};
pub use inspect::InspectCommand;
