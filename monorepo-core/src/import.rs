//! Incremental import of individual repos into a monorepo
//!
//! The import uses a "merge unrelated histories and move" strategy: each
//! input keeps its full history. Per input, a long-lived integration
//! branch pulls the upstream branch and relocates the pulled files into
//! the input's destination directory; the integration branches are then
//! folded into the destination branch with merge commits. Reruns are
//! incremental: inputs without new upstream commits are skipped, and a
//! rerun with unchanged inputs leaves the destination tip untouched.

use std::fs;

use git2::{Oid, ResetType, Signature};
use tracing::info;

use crate::config::Identity;
use crate::git::{Monorepo, PullOutcome};
use crate::input::{validate_inputs, IndividualRepo};
use crate::{Error, Result};

/// Options for an import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Author of the commits created by the import
    pub author: Identity,
    /// Committer of the commits created by the import
    pub committer: Identity,
}

/// Name of the integration branch carrying one input's history within the
/// monorepo
pub fn integration_branch_name(dest_branch: &str, repo_name: &str) -> String {
    format!("individual_repos/{}/{}", dest_branch, repo_name)
}

/// Import the individual repos into the monorepo's destination branch.
///
/// The inputs are processed in declaration order: integration branches
/// are pulled and relocated in that order, and the branches that advanced
/// are folded into the destination branch in that same order.
pub fn import_into_monorepo(
    monorepo: &Monorepo,
    inputs: &[IndividualRepo],
    dest_branch: &str,
    options: &ImportOptions,
) -> Result<()> {
    validate_inputs(inputs)?;
    let mut importer = Importer {
        monorepo,
        inputs,
        dest_branch,
        author: options.author.signature()?,
        committer: options.committer.signature()?,
        anchor: None,
    };
    importer.monorepo.ensure_remotes(inputs)?;
    let updated = importer.update_integration_branches()?;
    importer.merge_integration_branches(&updated)?;
    info!("done");
    Ok(())
}

struct Importer<'a> {
    monorepo: &'a Monorepo,
    inputs: &'a [IndividualRepo],
    dest_branch: &'a str,
    author: Signature<'static>,
    committer: Signature<'static>,
    anchor: Option<Oid>,
}

impl Importer<'_> {
    /// Anchor commit shared by the destination branch and all of its
    /// integration branches, computed once per run
    fn anchor(&mut self) -> Result<Oid> {
        if let Some(oid) = self.anchor {
            return Ok(oid);
        }
        let oid =
            self.monorepo
                .anchor_commit(self.dest_branch, &self.author, &self.committer)?;
        self.anchor = Some(oid);
        Ok(oid)
    }

    /// Pull every input onto its integration branch and relocate the
    /// newly pulled files into the input's destination directory.
    ///
    /// Returns the names of the inputs whose integration branch advanced,
    /// in declaration order.
    fn update_integration_branches(&mut self) -> Result<Vec<String>> {
        info!("create or update the integration branches");
        let inputs = self.inputs;
        let mut updated = Vec::new();
        for input in inputs {
            let branch = integration_branch_name(self.dest_branch, &input.name);
            info!(repo = %input.name, "pulling");
            let created = match self.monorepo.branch_tip(&branch)? {
                Some(_) => false,
                None => {
                    let anchor = self.anchor()?;
                    self.monorepo.create_branch(&branch, anchor)?;
                    true
                }
            };
            self.monorepo.checkout_branch(&branch)?;
            let outcome = self.monorepo.pull_into_branch(
                &branch,
                &input.name,
                &input.branch,
                &input.location,
                created,
                &self.author,
                &self.committer,
            )?;
            if outcome == PullOutcome::UpToDate {
                info!(repo = %input.name, "skipped: up to date");
                continue;
            }
            info!(repo = %input.name, destination = %input.destination, "moving files");
            self.monorepo.relocate_into_destination(
                &branch,
                input,
                inputs,
                &self.author,
                &self.committer,
            )?;
            updated.push(input.name.clone());
        }
        Ok(updated)
    }

    /// Fold the integration branches that advanced into the destination
    /// branch, then reset the working tree to the new tip
    fn merge_integration_branches(&mut self, updated: &[String]) -> Result<()> {
        info!("merge the integration branches");
        let mut dest_tip = match self.monorepo.branch_tip(self.dest_branch)? {
            Some(tip) => tip,
            None => {
                let anchor = self.anchor()?;
                self.monorepo.create_branch(self.dest_branch, anchor)?;
                anchor
            }
        };
        self.monorepo.checkout_branch(self.dest_branch)?;
        for name in updated {
            info!(repo = %name, "merge");
            let branch = integration_branch_name(self.dest_branch, name);
            let src = self.monorepo.branch_tip(&branch)?.ok_or_else(|| {
                Error::CorruptedHistory(format!("integration branch '{}' disappeared", branch))
            })?;
            dest_tip = self.fold_merge(name, src, dest_tip)?;
            self.monorepo.set_branch_tip(self.dest_branch, dest_tip)?;
        }
        self.cleanup_working_tree()
    }

    /// Merge one integration branch tip into the destination branch with
    /// a two-parent commit, the integration tip being the first parent
    fn fold_merge(&self, name: &str, src: Oid, dest_tip: Oid) -> Result<Oid> {
        let repo = self.monorepo.inner();
        let base = repo.merge_base(dest_tip, src).map_err(|e| {
            Error::CorruptedHistory(format!(
                "no merge base between '{}' and the integration branch of '{}': {}",
                self.dest_branch, name, e
            ))
        })?;
        let base_tree = repo.find_commit(base)?.tree()?;
        let dest_commit = repo.find_commit(dest_tip)?;
        let src_commit = repo.find_commit(src)?;
        let mut merged =
            repo.merge_trees(&base_tree, &dest_commit.tree()?, &src_commit.tree()?, None)?;
        if merged.has_conflicts() {
            return Err(Error::MergeConflict(format!(
                "merging repo '{}' into '{}'",
                name, self.dest_branch
            )));
        }
        let tree = repo.find_tree(merged.write_tree_to(repo)?)?;
        let message = format!("Merge repo {}", name);
        let oid = repo.commit(
            None,
            &self.author,
            &self.committer,
            &message,
            &tree,
            &[&src_commit, &dest_commit],
        )?;
        Ok(oid)
    }

    /// Remove everything at the top of the working directory except the
    /// git metadata, then reset the index and working tree to the
    /// destination tip
    fn cleanup_working_tree(&self) -> Result<()> {
        info!("clean up the working tree");
        let repo = self.monorepo.inner();
        repo.set_head(&format!("refs/heads/{}", self.dest_branch))?;
        for entry in fs::read_dir(self.monorepo.root())? {
            let entry = entry?;
            if entry.file_name() == ".git" {
                continue;
            }
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        let tip = self.monorepo.branch_tip(self.dest_branch)?.ok_or_else(|| {
            Error::CorruptedHistory(format!(
                "destination branch '{}' disappeared during cleanup",
                self.dest_branch
            ))
        })?;
        let target = repo.find_object(tip, None)?;
        repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_branch_name() {
        assert_eq!(
            integration_branch_name("develop", "widgets"),
            "individual_repos/develop/widgets"
        );
    }
}
