//! Single-commit snapshot importer
//!
//! Imports the individual repos by discarding their history: every input
//! is cloned at its source branch, the working trees are copied into the
//! destination directories, and the aggregate lands on the destination
//! branch as one commit. The final working tree must be identical to the
//! one produced by the incremental importer on the same input set, which
//! makes this importer a convenient cross-check in tests.

use std::fs;
use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{FetchOptions, IndexAddOption, Signature};
use tracing::info;

use crate::config::Identity;
use crate::git::Monorepo;
use crate::input::{validate_inputs, IndividualRepo};
use crate::{Error, Result};

/// Options for a snapshot import
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Author of the snapshot commit
    pub author: Identity,
    /// Committer of the snapshot commit
    pub committer: Identity,
    /// Where to put the clones of the individual repos; a temporary
    /// directory when unset
    pub workdir: Option<PathBuf>,
}

/// Import the individual repos into the monorepo's destination branch as
/// a single commit, discarding their history
pub fn snapshot_into_monorepo(
    monorepo: &Monorepo,
    inputs: &[IndividualRepo],
    dest_branch: &str,
    options: &SnapshotOptions,
) -> Result<()> {
    validate_inputs(inputs)?;
    let author = options.author.signature()?;
    let committer = options.committer.signature()?;

    let (workdir, _scratch) = match &options.workdir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            (dir.clone(), None)
        }
        None => {
            let scratch = tempfile::tempdir()?;
            (scratch.path().to_path_buf(), Some(scratch))
        }
    };

    clone_single_branches(inputs, &workdir)?;
    copy_working_trees(monorepo, inputs, &workdir)?;
    create_dest_branch(monorepo, dest_branch, &author, &committer)?;
    info!("done");
    Ok(())
}

fn clone_single_branches(inputs: &[IndividualRepo], workdir: &Path) -> Result<()> {
    info!("clone single branches");
    for input in inputs {
        info!(repo = %input.name, branch = %input.branch, "cloning");
        let mut fetch_options = FetchOptions::new();
        if !is_local_location(&input.location) {
            // libgit2's local transport does not support shallow fetches
            fetch_options.depth(1);
        }
        RepoBuilder::new()
            .branch(&input.branch)
            .fetch_options(fetch_options)
            .clone(&input.location, &workdir.join(&input.name))
            .map_err(|e| Error::Upstream {
                repo: input.name.clone(),
                message: format!("clone of {} failed: {}", input.location, e),
            })?;
    }
    Ok(())
}

fn is_local_location(location: &str) -> bool {
    !location.contains("://") && !location.starts_with("git@")
}

fn copy_working_trees(
    monorepo: &Monorepo,
    inputs: &[IndividualRepo],
    workdir: &Path,
) -> Result<()> {
    info!("copy the individual repo working trees");
    for input in inputs {
        info!(repo = %input.name, destination = %input.destination, "copying");
        copy_tree(
            &workdir.join(&input.name),
            &monorepo.root().join(&input.destination),
        )?;
    }
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dest)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest)?;
    Ok(())
}

fn create_dest_branch(
    monorepo: &Monorepo,
    dest_branch: &str,
    author: &Signature<'_>,
    committer: &Signature<'_>,
) -> Result<()> {
    info!(branch = %dest_branch, "create the destination branch");
    let repo = monorepo.inner();
    // The snapshot commit continues the current HEAD, like a branch
    // created with checkout.
    let parent = monorepo.head_commit()?;
    repo.set_head(&format!("refs/heads/{}", dest_branch))?;
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;
    let tree = repo.find_tree(index.write_tree()?)?;
    let parents = match parent {
        Some(oid) => vec![repo.find_commit(oid)?],
        None => Vec::new(),
    };
    let parent_refs: Vec<_> = parents.iter().collect();
    repo.commit(
        Some("HEAD"),
        author,
        committer,
        "Monorepo commit",
        &tree,
        &parent_refs,
    )?;
    Ok(())
}
