//! Import command

use std::path::PathBuf;

use clap::Args;
use monorepo_core::{import_into_monorepo, ImportOptions, InputsManifest, Monorepo};

/// Import individual repos into a monorepo
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to a TOML manifest listing the individual repos to import
    #[arg(long = "individual_repos")]
    pub individual_repos: PathBuf,

    /// The destination branch to import into
    #[arg(long = "dest_branch")]
    pub dest_branch: String,

    /// The local path to the monorepo (it is created if it does not
    /// exist)
    #[arg(long = "monorepo_path")]
    pub monorepo_path: PathBuf,

    /// Only report warnings and errors
    #[arg(long)]
    pub silent: bool,
}

impl ImportArgs {
    /// Execute the import
    pub fn execute(&self) -> anyhow::Result<()> {
        let manifest = InputsManifest::load_from_file(&self.individual_repos)?;
        let inputs = manifest.resolve(&self.dest_branch)?;
        let monorepo = Monorepo::open_or_init(&self.monorepo_path)?;
        tracing::info!(
            monorepo = %self.monorepo_path.display(),
            dest_branch = %self.dest_branch,
            repos = inputs.len(),
            "importing individual repos"
        );
        let options = ImportOptions {
            author: manifest.identity.clone(),
            committer: manifest.identity.clone(),
        };
        import_into_monorepo(&monorepo, &inputs, &self.dest_branch, &options)?;
        Ok(())
    }
}
