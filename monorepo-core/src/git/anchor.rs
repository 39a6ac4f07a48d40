//! Anchor commit management
//!
//! All integration branches and the destination branch of an import share
//! a single parentless empty root commit, so a merge base always exists
//! between any two of them.

use git2::{Oid, Signature, Sort};

use super::repo::Monorepo;
use crate::{Error, Result};

/// Message of the anchor commit, matched verbatim when rediscovering the
/// anchor on a later run
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial monorepo commit";

impl Monorepo {
    /// Return the anchor commit for the given destination branch,
    /// creating it when the branch does not exist yet.
    ///
    /// When the branch exists, its whole history is scanned and the
    /// root-most commit carrying the anchor message wins.
    pub fn anchor_commit(
        &self,
        dest_branch: &str,
        author: &Signature<'_>,
        committer: &Signature<'_>,
    ) -> Result<Oid> {
        match self.branch_tip(dest_branch)? {
            Some(tip) => self.find_anchor(dest_branch, tip),
            None => self.create_anchor(author, committer),
        }
    }

    fn find_anchor(&self, dest_branch: &str, tip: Oid) -> Result<Oid> {
        let repo = self.inner();
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.push(tip)?;

        // Several commits may carry the anchor message; keep scanning so
        // the root-most one is returned.
        let mut anchor = None;
        for oid in walk {
            let oid = oid?;
            let commit = repo.find_commit(oid)?;
            if commit.message().map(str::trim_end) == Some(INITIAL_COMMIT_MESSAGE) {
                anchor = Some(oid);
            }
        }
        anchor.ok_or_else(|| {
            Error::CorruptedHistory(format!(
                "destination branch '{}' has no '{}' commit",
                dest_branch, INITIAL_COMMIT_MESSAGE
            ))
        })
    }

    fn create_anchor(&self, author: &Signature<'_>, committer: &Signature<'_>) -> Result<Oid> {
        let repo = self.inner();
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        // On a fresh repository this also roots the unborn HEAD branch.
        // When HEAD already has history the anchor is left dangling until
        // a branch is created on it, so existing branches stay untouched.
        let update_ref = if self.head_commit()?.is_none() {
            Some("HEAD")
        } else {
            None
        };
        let oid = repo.commit(
            update_ref,
            author,
            committer,
            INITIAL_COMMIT_MESSAGE,
            &tree,
            &[],
        )?;
        Ok(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Identity;
    use tempfile::TempDir;

    fn test_signature() -> Signature<'static> {
        Identity::default().signature().unwrap()
    }

    #[test]
    fn test_anchor_created_once_and_rediscovered() {
        let dir = TempDir::new().unwrap();
        let monorepo = Monorepo::open_or_init(dir.path().join("monorepo")).unwrap();
        let sig = test_signature();

        let anchor = monorepo.anchor_commit("develop", &sig, &sig).unwrap();
        let commit = monorepo.inner().find_commit(anchor).unwrap();
        assert_eq!(commit.message(), Some(INITIAL_COMMIT_MESSAGE));
        assert_eq!(commit.parent_count(), 0);
        assert_eq!(commit.tree().unwrap().len(), 0);

        // Once the destination branch exists, the same commit is found by
        // scanning its history.
        monorepo.create_branch("develop", anchor).unwrap();
        let rediscovered = monorepo.anchor_commit("develop", &sig, &sig).unwrap();
        assert_eq!(rediscovered, anchor);
    }

    #[test]
    fn test_missing_anchor_is_corrupted_history() {
        let dir = TempDir::new().unwrap();
        let monorepo = Monorepo::open_or_init(dir.path().join("monorepo")).unwrap();
        let sig = test_signature();

        // A destination branch whose root commit does not carry the
        // anchor message.
        let repo = monorepo.inner();
        let tree_oid = {
            let mut index = repo.index().unwrap();
            index.write_tree().unwrap()
        };
        let tree = repo.find_tree(tree_oid).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "Some other commit", &tree, &[])
            .unwrap();
        monorepo.create_branch("develop", oid).unwrap();

        let result = monorepo.anchor_commit("develop", &sig, &sig);
        assert!(matches!(result, Err(Error::CorruptedHistory(_))));
    }
}
