//! Pulling an individual repo branch into its integration branch
//!
//! A pull is an explicit fetch followed by a merge decision: up to date,
//! fast-forward, or a two-parent pull-merge commit built from a three-way
//! tree merge. Merging histories with no common ancestor is only allowed
//! onto an integration branch created in the current run.

use git2::{FetchOptions, MergeOptions, Oid, RemoteCallbacks, Signature};

use super::repo::Monorepo;
use crate::{Error, Result};

/// Outcome of pulling an upstream branch into an integration branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The integration branch already contained the upstream head
    UpToDate,
    /// The integration branch advanced to the given commit
    Advanced(Oid),
}

impl Monorepo {
    /// Fetch `branch` from the remote named `remote_name` and merge the
    /// fetched head into the local branch `into_branch`, which must
    /// exist and is checked out on success.
    ///
    /// `allow_unrelated` permits merging histories with no common
    /// ancestor; it must only be set when `into_branch` was created in
    /// the current run.
    #[allow(clippy::too_many_arguments)]
    pub fn pull_into_branch(
        &self,
        into_branch: &str,
        remote_name: &str,
        branch: &str,
        location: &str,
        allow_unrelated: bool,
        author: &Signature<'_>,
        committer: &Signature<'_>,
    ) -> Result<PullOutcome> {
        let theirs = self.fetch_branch(remote_name, branch)?;
        let ours = self.branch_tip(into_branch)?.ok_or_else(|| {
            Error::CorruptedHistory(format!(
                "branch '{}' disappeared during pull",
                into_branch
            ))
        })?;

        let repo = self.inner();
        if ours == theirs || repo.graph_descendant_of(ours, theirs)? {
            return Ok(PullOutcome::UpToDate);
        }
        if repo.graph_descendant_of(theirs, ours)? {
            self.set_branch_tip(into_branch, theirs)?;
            self.checkout_branch(into_branch)?;
            return Ok(PullOutcome::Advanced(theirs));
        }

        let base = match repo.merge_base(ours, theirs) {
            Ok(oid) => Some(oid),
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(Error::Git(e)),
        };
        if base.is_none() && !allow_unrelated {
            return Err(Error::Upstream {
                repo: remote_name.to_string(),
                message: format!(
                    "refusing to merge unrelated histories of '{}' into existing branch '{}'",
                    branch, into_branch
                ),
            });
        }

        let base_tree = match base {
            Some(oid) => repo.find_commit(oid)?.tree()?,
            None => repo.find_tree(self.empty_tree()?)?,
        };
        let our_commit = repo.find_commit(ours)?;
        let their_commit = repo.find_commit(theirs)?;
        // Rename detection lets an upstream change to an already relocated
        // file land on the relocated path instead of conflicting with the
        // move.
        let mut merge_options = MergeOptions::new();
        merge_options.find_renames(true);
        let mut merged = repo.merge_trees(
            &base_tree,
            &our_commit.tree()?,
            &their_commit.tree()?,
            Some(&merge_options),
        )?;
        if merged.has_conflicts() {
            return Err(Error::MergeConflict(format!(
                "pulling '{}' of {} into '{}'",
                branch, location, into_branch
            )));
        }
        let tree = repo.find_tree(merged.write_tree_to(repo)?)?;

        let message = format!("Merge branch '{}' of {}", branch, location);
        let oid = repo.commit(
            None,
            author,
            committer,
            &message,
            &tree,
            &[&our_commit, &their_commit],
        )?;
        self.set_branch_tip(into_branch, oid)?;
        self.checkout_branch(into_branch)?;
        Ok(PullOutcome::Advanced(oid))
    }

    /// Fetch a single branch from a named remote into its remote-tracking
    /// reference and return the fetched head
    fn fetch_branch(&self, remote_name: &str, branch: &str) -> Result<Oid> {
        let repo = self.inner();
        let mut remote = repo.find_remote(remote_name).map_err(|e| Error::Upstream {
            repo: remote_name.to_string(),
            message: format!("remote not found: {}", e),
        })?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|_| true);
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, remote_name);
        remote
            .fetch(&[refspec.as_str()], Some(&mut fetch_options), None)
            .map_err(|e| Error::Upstream {
                repo: remote_name.to_string(),
                message: format!("fetch of '{}' failed: {}", branch, e),
            })?;

        repo.refname_to_id(&format!("refs/remotes/{}/{}", remote_name, branch))
            .map_err(|e| Error::Upstream {
                repo: remote_name.to_string(),
                message: format!("branch '{}' not found after fetch: {}", branch, e),
            })
    }
}
