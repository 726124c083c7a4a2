/* src/lib.rs */

//!
//! A live, locally cached view of key-value data whose authoritative copies
//! live in a slow remote store.
//!
//! This crate integrates the following components:
//!
//! - **holder**: Lock-free, versioned snapshots plus the per-key refresh ledger.
//! - **loader**: The remote store boundary (`Loader`) with memory and file backends.
//! - **extract**: Payload formats and nested-path resolution.
//! - **watch**: Per-key and whole-snapshot subscriptions with latest-value delivery.
//! - **controller**: The refresh engine (`ReloadCoordinator`) and the `Provider` facade.
//! - **poller**: Cancellable interval refresh of a fixed key set.
//! - **config**: `Settings` loaded from JSON, TOML or YAML.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `toml`, `yaml`: Extra payload and settings formats (JSON is always available).
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

pub mod config;
pub mod controller;
pub mod extract;
pub mod holder;
pub mod loader;
pub mod poller;
pub mod watch;

pub use config::Settings;
pub use controller::{LookupError, Provider, RefreshOutcome};
pub use extract::KeyPath;
