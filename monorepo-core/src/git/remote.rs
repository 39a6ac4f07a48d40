//! Remote management for the individual repos

use super::repo::Monorepo;
use crate::input::IndividualRepo;
use crate::Result;

impl Monorepo {
    /// Ensure there is one remote per input, named after the input and
    /// pointing at its location.
    ///
    /// An existing remote with the same name is deleted and recreated so
    /// that the location is always current. No network I/O happens here.
    pub fn ensure_remotes(&self, inputs: &[IndividualRepo]) -> Result<()> {
        tracing::info!("create the individual repo remotes");
        let repo = self.inner();
        for input in inputs {
            tracing::info!(repo = %input.name, location = %input.location, "remote");
            if repo.find_remote(&input.name).is_ok() {
                repo.remote_delete(&input.name)?;
            }
            repo.remote(&input.name, &input.location)?;
        }
        Ok(())
    }
}
