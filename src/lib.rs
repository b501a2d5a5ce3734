//! loalias - Loopback Alias Library
//!
//! Manages IPv4 aliases on the Linux loopback device:
//! - Adding and removing aliases (`ip address add/del ... dev lo`)
//! - Listing the aliases currently configured
//! - Probing reachability with a single bounded ping
//!
//! All tool calls run through a [`PrivilegedRunner`]; the outcome of each
//! call is read from its exit code and output text by the `classify` tables.

pub mod error;
pub mod config;
pub mod quote;
pub mod executor;
pub mod classify;
pub mod address;
pub mod alias;
pub mod style;
pub mod render;

// Re-export commonly used types
pub use error::{AliasError, AliasResult};
pub use config::{AliasConfig, ElevationMode};
pub use executor::{CommandInvocation, CommandResult, ElevatedRunner, ExitState, PrivilegedRunner};
pub use classify::{classify, Classification, Operation, Outcome};
pub use address::{is_loopback, normalize_prefix, AliasEntry, AliasListing};
pub use alias::{Action, AliasManager, AliasReport, BatchSummary, Request};
pub use render::render;
