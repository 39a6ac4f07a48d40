//! Git policies for the monorepo importer
//!
//! Thin policies over git2 primitives: the repository handle, remotes,
//! the anchor commit, pulls onto integration branches, and relocation
//! commits.

mod anchor;
mod pull;
mod relocate;
mod remote;
mod repo;

pub use anchor::INITIAL_COMMIT_MESSAGE;
pub use pull::PullOutcome;
pub use repo::Monorepo;
