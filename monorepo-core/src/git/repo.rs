//! Monorepo repository handle

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, Oid, Repository};

use crate::{Error, Result};

/// A handle on the combined repository that receives the imports
pub struct Monorepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working tree root
    root: PathBuf,
}

impl std::fmt::Debug for Monorepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monorepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Monorepo {
    /// Open an existing monorepo at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|e| {
            Error::Config(format!(
                "cannot open monorepo at {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_repo(repo)
    }

    /// Open the monorepo at the given path, creating it from scratch when
    /// it does not exist
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::open(path);
        }
        tracing::info!(path = %path.display(), "monorepo does not exist, creating it from scratch");
        let repo = Repository::init(path).map_err(|e| {
            Error::Config(format!(
                "cannot create monorepo at {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_repo(repo)
    }

    fn from_repo(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("bare repositories are not supported".to_string()))?
            .to_path_buf();
        Ok(Self { repo, root })
    }

    /// Working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Tip commit of a local branch, or `None` when the branch does not
    /// exist
    pub fn branch_tip(&self, branch: &str) -> Result<Option<Oid>> {
        match self.repo.find_branch(branch, BranchType::Local) {
            Ok(found) => {
                let oid = found.get().target().ok_or_else(|| {
                    Error::CorruptedHistory(format!(
                        "branch '{}' is not a direct reference",
                        branch
                    ))
                })?;
                Ok(Some(oid))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// Create a local branch pointing at the given commit
    pub fn create_branch(&self, branch: &str, target: Oid) -> Result<()> {
        let commit = self.repo.find_commit(target)?;
        self.repo.branch(branch, &commit, false)?;
        Ok(())
    }

    /// Move a local branch to the given commit, creating it when missing
    pub fn set_branch_tip(&self, branch: &str, target: Oid) -> Result<()> {
        self.repo.reference(
            &format!("refs/heads/{}", branch),
            target,
            true,
            "monorepo-tools: update branch",
        )?;
        Ok(())
    }

    /// Check out a local branch: point HEAD at it and force the index and
    /// working tree to match its tip
    pub fn checkout_branch(&self, branch: &str) -> Result<()> {
        self.repo.set_head(&format!("refs/heads/{}", branch))?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;
        Ok(())
    }

    /// Commit HEAD points at, or `None` on an unborn branch
    pub fn head_commit(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target()),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// Oid of the empty tree
    pub(crate) fn empty_tree(&self) -> Result<Oid> {
        Ok(self.repo.treebuilder(None)?.write()?)
    }
}
