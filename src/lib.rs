//! upkeep - in-place self-update engine for deployed applications
//!
//! An embedded update agent that upgrades the application's own installation
//! directory in place, choosing between two mechanisms based on which kind
//! of installation is present:
//!
//! - **pull-based**: the installation directory carries version-control
//!   metadata, so the update is a single `pull` run by the system client
//! - **archive-based**: the installation came from a release archive, so
//!   the engine probes a stable "latest" URL for a redirect, uses the
//!   resolved `Location` as an opaque version fingerprint, and — only when
//!   the fingerprint moved — downloads, unpacks, and atomically swaps the
//!   new tree into place
//!
//! # Architecture Overview
//!
//! One invocation resolves the installation directory once, picks exactly
//! one mechanism, and runs it to completion — the two updaters never run
//! together. All mutation of the live installation path is confined to the
//! atomic installer's three-rename swap.
//!
//! ## Core Modules
//!
//! - [`updater`] - strategy selection and the [`update`]/[`check`] entry
//!   points
//! - [`config`] - [`UpdateOptions`] and the [`ArchiveLayout`] policy
//! - [`core`] - the [`UpkeepError`] taxonomy
//!
//! ## Mechanisms
//!
//! - [`vcs`] - pull subprocess with bounded timeout and captured output
//! - [`version`] - redirect-probe fingerprinting and the marker file
//! - [`fetcher`] - streaming archive download into private staging
//! - [`archive`] - format sniffing, extraction, and root normalization
//! - [`installer`] - the three-step atomic directory swap
//!
//! ## Supporting Modules
//!
//! - [`utils`] - path resolution, atomic writes, platform defaults
//!
//! # Usage
//!
//! ```rust,no_run
//! use upkeep::{UpdateOptions, UpdateOutcome};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = UpdateOptions::new("https://example.com/releases/latest")
//!     .install_dir("/opt/app");
//!
//! match upkeep::update(&options).await? {
//!     UpdateOutcome::Pulled => println!("pulled latest revision"),
//!     UpdateOutcome::AlreadyCurrent => println!("already up to date"),
//!     UpdateOutcome::Installed { fingerprint } => {
//!         println!("installed {fingerprint}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # The "latest" pointer contract
//!
//! The pointer URL must answer a plain GET with a 3xx status and a
//! `Location` header giving the versioned archive URL. That URL doubles as
//! the version fingerprint — compared by exact string equality, never
//! parsed. GitHub's `releases/latest/download/<asset>` URLs and most
//! release CDNs behave this way out of the box.
//!
//! # Concurrency
//!
//! The engine is sequential per invocation and provides **no** protection
//! against two update attempts racing on one installation directory;
//! serialize invocations externally if that can happen in your deployment.
//! Cancellation is expressed only through the configured timeouts — once
//! the swap begins it runs to completion or clearly-reported failure.

// Core functionality
pub mod config;
pub mod core;
pub mod updater;

// Update mechanisms
pub mod archive;
pub mod fetcher;
pub mod installer;
pub mod vcs;
pub mod version;

// Supporting modules
pub mod utils;

pub use crate::config::{ArchiveLayout, DEFAULT_MARKER_LEAF, DEFAULT_TIMEOUT, UpdateOptions};
pub use crate::core::UpkeepError;
pub use crate::updater::{
    UpdateCheck, UpdateOutcome, UpdateStrategy, check, select_strategy, update,
};
