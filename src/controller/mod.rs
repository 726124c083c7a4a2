/* src/controller/mod.rs */

//!
//! The refresh engine and the consumer-facing provider built on it.
//!
//! - [`ReloadCoordinator`] - TTL gate, fetch, optimistic commit, diff and dispatch
//! - [`Provider`] - Pull-path lookups, watches and poller wiring

mod coordinator;
mod error;
mod provider;

pub use coordinator::{DEFAULT_TTL, RefreshOutcome, ReloadCoordinator};
pub use error::{BuildError, LookupError};
pub use provider::{Provider, ProviderBuilder};
