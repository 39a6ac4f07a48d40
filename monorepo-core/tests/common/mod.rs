//! Fixture helpers shared by the end-to-end tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use git2::{BranchType, Oid, Repository, Signature};
use monorepo_core::IndividualRepo;

/// Write a file and commit it onto `branch` of a fixture repo, creating
/// the branch when missing
pub fn commit_file(
    repo: &Repository,
    branch: &str,
    filename: &str,
    content: &str,
    message: &str,
    author_name: &str,
    committer_name: &str,
) -> Oid {
    let workdir = repo.workdir().unwrap();
    let file_path = workdir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(filename)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let author = signature(author_name);
    let committer = signature(committer_name);
    let parents = match repo.find_branch(branch, BranchType::Local) {
        Ok(found) => vec![found.get().peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<_> = parents.iter().collect();
    let oid = repo
        .commit(None, &author, &committer, message, &tree, &parent_refs)
        .unwrap();
    let commit = repo.find_commit(oid).unwrap();
    repo.branch(branch, &commit, true).unwrap();
    oid
}

fn signature(name: &str) -> Signature<'static> {
    Signature::now(name, &format!("{}@domain.test", name.to_lowercase())).unwrap()
}

/// Fixture repo with one commit adding `foo.txt` = `FOO` on `master1`
pub fn init_repo1(root: &Path) -> IndividualRepo {
    let path = root.join("repo1");
    let repo = Repository::init(&path).unwrap();
    commit_file(
        &repo, "master1", "foo.txt", "FOO", "Commit 1", "Author1", "Committer1",
    );
    IndividualRepo::new(path.to_str().unwrap(), "master1", None, None).unwrap()
}

/// Fixture repo with one commit adding `bar.txt` = `BAR` on `master2`
pub fn init_repo2(root: &Path) -> IndividualRepo {
    let path = root.join("repo2");
    let repo = Repository::init(&path).unwrap();
    commit_file(
        &repo, "master2", "bar.txt", "BAR", "Commit 2", "Author2", "Committer2",
    );
    IndividualRepo::new(path.to_str().unwrap(), "master2", None, None).unwrap()
}

/// Collect a working tree as a map of `/`-joined relative paths to file
/// contents, ignoring git metadata
pub fn tree_contents(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    collect(root, Path::new(""), &mut out);
    out
}

fn collect(root: &Path, rel: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
    for entry in fs::read_dir(root.join(rel)).unwrap() {
        let entry = entry.unwrap();
        if entry.file_name() == ".git" {
            continue;
        }
        let rel_path = rel.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            collect(root, &rel_path, out);
        } else {
            let key = rel_path.to_str().unwrap().replace('\\', "/");
            out.insert(key, fs::read(entry.path()).unwrap());
        }
    }
}

/// Number of commits reachable from a revision
pub fn history_len(repo: &Repository, rev: &str) -> usize {
    let mut walk = repo.revwalk().unwrap();
    walk.push(repo.revparse_single(rev).unwrap().id()).unwrap();
    walk.count()
}
