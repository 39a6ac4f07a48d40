//! Inputs manifest and commit identity
//!
//! The set of repos to import is described by a declarative TOML manifest
//! parsed at startup:
//!
//! ```toml
//! dest_branch = "develop"
//!
//! [identity]
//! name = "monorepo-tools"
//! email = "monorepo-tools@chauvin.io"
//!
//! [[repo]]
//! location = "https://github.com/orga/lib.git"
//! branch = "main"
//! destination = "packages/lib"
//! ```
//!
//! `dest_branch` and `[identity]` are optional. When `dest_branch` is
//! set, the branch requested on the command line must match it.

use std::path::Path;

use git2::Signature;
use serde::{Deserialize, Serialize};

use crate::input::IndividualRepo;
use crate::{Error, Result};

/// Author/committer identity for the commits created by an import
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Identity {
    /// Name, e.g. `monorepo-tools`
    pub name: String,
    /// Email address
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "monorepo-tools".to_string(),
            email: "monorepo-tools@chauvin.io".to_string(),
        }
    }
}

impl Identity {
    /// Build a git signature for this identity, stamped with the current
    /// time
    pub fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(&self.name, &self.email)?)
    }
}

/// One `[[repo]]` table of the manifest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoEntry {
    /// Location of the individual repo, a URL or a local path
    pub location: String,
    /// The branch to import
    pub branch: String,
    /// Name override; defaults to the basename of the location
    pub name: Option<String>,
    /// Destination directory override; defaults to the name
    pub destination: Option<String>,
}

/// Manifest describing the input set of an import
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InputsManifest {
    /// Expected destination branch; when set, the branch requested for
    /// the run must match
    pub dest_branch: Option<String>,

    /// Identity for the commits created by the import
    pub identity: Identity,

    /// Repos to import, in declaration order
    #[serde(rename = "repo")]
    pub repos: Vec<RepoEntry>,
}

impl InputsManifest {
    /// Load a manifest from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read manifest {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "failed to parse manifest {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolve the manifest into input descriptors for a run against the
    /// given destination branch
    pub fn resolve(&self, dest_branch: &str) -> Result<Vec<IndividualRepo>> {
        if let Some(expected) = &self.dest_branch {
            if expected != dest_branch {
                return Err(Error::Config(format!(
                    "manifest is pinned to destination branch '{}' but '{}' was requested",
                    expected, dest_branch
                )));
            }
        }
        self.repos
            .iter()
            .map(|entry| {
                IndividualRepo::new(
                    entry.location.clone(),
                    entry.branch.clone(),
                    entry.name.clone(),
                    entry.destination.clone(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let identity = Identity::default();
        assert_eq!(identity.name, "monorepo-tools");
        assert_eq!(identity.email, "monorepo-tools@chauvin.io");
    }

    #[test]
    fn test_parse_full_manifest() {
        let toml = r#"
dest_branch = "stitched"

[identity]
name = "importer"
email = "importer@domain.test"

[[repo]]
location = "https://github.com/reduxjs/redux.git"
branch = "v4.0.4"
name = "redux"
destination = "packages/redux/core"

[[repo]]
location = "https://github.com/acdlite/recompose.git"
branch = "v0.30.0"
"#;
        let manifest: InputsManifest = toml::from_str(toml).unwrap();
        assert_eq!(manifest.dest_branch.as_deref(), Some("stitched"));
        assert_eq!(manifest.identity.name, "importer");
        assert_eq!(manifest.repos.len(), 2);

        let inputs = manifest.resolve("stitched").unwrap();
        assert_eq!(inputs[0].name, "redux");
        assert_eq!(inputs[0].destination, "packages/redux/core");
        assert_eq!(inputs[1].name, "recompose");
        assert_eq!(inputs[1].destination, "recompose");
    }

    #[test]
    fn test_parse_partial_manifest() {
        let toml = r#"
[[repo]]
location = "/var/repos/widgets"
branch = "main"
"#;
        let manifest: InputsManifest = toml::from_str(toml).unwrap();
        assert!(manifest.dest_branch.is_none());
        assert_eq!(manifest.identity.name, "monorepo-tools");

        let inputs = manifest.resolve("anything").unwrap();
        assert_eq!(inputs[0].name, "widgets");
    }

    #[test]
    fn test_dest_branch_pin_mismatch() {
        let toml = r#"
dest_branch = "stitched"
"#;
        let manifest: InputsManifest = toml::from_str(toml).unwrap();
        assert!(manifest.resolve("develop").is_err());
    }
}
