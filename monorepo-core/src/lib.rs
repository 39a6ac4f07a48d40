//! Monorepo core - Importing individual repos into a monorepo
//!
//! This crate implements an incremental "merge unrelated histories and
//! move" import: each input repo keeps its full commit history inside the
//! monorepo, relocated under a dedicated directory of the destination
//! branch. Reruns only integrate new upstream commits.

pub mod config;
pub mod error;
pub mod git;
pub mod import;
pub mod input;
pub mod snapshot;

pub use config::{Identity, InputsManifest};
pub use error::{Error, Result};
pub use git::{Monorepo, INITIAL_COMMIT_MESSAGE};
pub use import::{import_into_monorepo, integration_branch_name, ImportOptions};
pub use input::IndividualRepo;
pub use snapshot::{snapshot_into_monorepo, SnapshotOptions};
