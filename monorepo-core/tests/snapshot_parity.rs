//! Cross-check of the incremental importer against the single-commit
//! snapshot importer: both must produce identical working trees

mod common;

use git2::Repository;
use monorepo_core::{
    import_into_monorepo, snapshot_into_monorepo, ImportOptions, IndividualRepo, Monorepo,
    SnapshotOptions,
};
use tempfile::TempDir;

use common::{commit_file, tree_contents};

#[test]
fn incremental_and_snapshot_importers_produce_the_same_tree() {
    let root = TempDir::new().unwrap();

    // A repo with nested files and several commits, imported into a
    // multi-part destination directory.
    let repo1_path = root.path().join("repo1");
    let repo1_git = Repository::init(&repo1_path).unwrap();
    commit_file(
        &repo1_git, "master1", "foo.txt", "FOO", "Commit 1", "Author1", "Committer1",
    );
    commit_file(
        &repo1_git,
        "master1",
        "docs/readme.md",
        "# readme",
        "Commit 2",
        "Author1",
        "Committer1",
    );
    let repo1 = IndividualRepo::new(
        repo1_path.to_str().unwrap(),
        "master1",
        None,
        Some("packages/repo1".to_string()),
    )
    .unwrap();

    let repo2_path = root.path().join("repo2");
    let repo2_git = Repository::init(&repo2_path).unwrap();
    commit_file(
        &repo2_git, "master2", "bar.txt", "BAR", "Commit 1", "Author2", "Committer2",
    );
    let repo2 =
        IndividualRepo::new(repo2_path.to_str().unwrap(), "master2", None, None).unwrap();

    let inputs = [repo1, repo2];

    let incremental = Monorepo::open_or_init(root.path().join("monorepo_incremental")).unwrap();
    import_into_monorepo(&incremental, &inputs, "stitched", &ImportOptions::default()).unwrap();

    let snapshot = Monorepo::open_or_init(root.path().join("monorepo_snapshot")).unwrap();
    let options = SnapshotOptions {
        workdir: Some(root.path().join("workdir")),
        ..SnapshotOptions::default()
    };
    snapshot_into_monorepo(&snapshot, &inputs, "stitched", &options).unwrap();

    let incremental_tree = tree_contents(incremental.root());
    let snapshot_tree = tree_contents(snapshot.root());
    assert!(!incremental_tree.is_empty());
    assert_eq!(incremental_tree, snapshot_tree);

    // Spot-check the layout.
    assert_eq!(
        incremental_tree.get("packages/repo1/foo.txt"),
        Some(&b"FOO".to_vec())
    );
    assert_eq!(
        incremental_tree.get("packages/repo1/docs/readme.md"),
        Some(&b"# readme".to_vec())
    );
    assert_eq!(incremental_tree.get("repo2/bar.txt"), Some(&b"BAR".to_vec()));
}
