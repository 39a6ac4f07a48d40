//! Relocation commits
//!
//! After a pull, the files newly introduced at the root of an integration
//! branch are renamed into the input's destination directory. The renames
//! happen in the index and keep the blob ids, so history tooling sees
//! moves rather than delete/add pairs.

use std::fs;
use std::path::Path;

use git2::{IndexEntry, Oid, Signature};

use super::repo::Monorepo;
use crate::input::IndividualRepo;
use crate::{Error, Result};

impl Monorepo {
    /// Move every index entry that is not yet under any input's
    /// destination directory into `input.destination`, and commit the
    /// result onto `branch`, which must be checked out.
    ///
    /// Returns the relocation commit.
    pub fn relocate_into_destination(
        &self,
        branch: &str,
        input: &IndividualRepo,
        all_inputs: &[IndividualRepo],
        author: &Signature<'_>,
        committer: &Signature<'_>,
    ) -> Result<Oid> {
        let repo = self.inner();
        let mut index = repo.index()?;

        // Index paths always use '/', regardless of platform.
        let prefixes: Vec<String> = all_inputs
            .iter()
            .map(|cur| format!("{}/", cur.destination))
            .collect();
        let to_move: Vec<(String, IndexEntry)> = index
            .iter()
            .filter_map(|entry| {
                let path = String::from_utf8_lossy(&entry.path).into_owned();
                if prefixes.iter().any(|prefix| path.starts_with(prefix)) {
                    None
                } else {
                    Some((path, entry))
                }
            })
            .collect();

        // Materialize the destination directories in the working tree
        // before the index moves.
        for (old_path, _) in &to_move {
            let new_path = format!("{}/{}", input.destination, old_path);
            if let Some(parent) = Path::new(&new_path).parent() {
                fs::create_dir_all(self.root().join(parent))?;
            }
        }

        for (old_path, entry) in to_move {
            let new_path = format!("{}/{}", input.destination, old_path);
            index.remove(Path::new(&old_path), 0)?;
            let moved = IndexEntry {
                path: new_path.into_bytes(),
                ..entry
            };
            index.add(&moved)?;
        }

        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent_oid = self.branch_tip(branch)?.ok_or_else(|| {
            Error::CorruptedHistory(format!("branch '{}' disappeared during move", branch))
        })?;
        let parent = repo.find_commit(parent_oid)?;
        let message = format!(
            "Move files from repo {} to directory {}",
            input.name, input.destination
        );
        let oid = repo.commit(None, author, committer, &message, &tree, &[&parent])?;
        self.set_branch_tip(branch, oid)?;
        self.checkout_branch(branch)?;
        Ok(oid)
    }
}
