//! Individual repo descriptors and input-set validation

use crate::{Error, Result};

/// One individual repo to import into the monorepo
#[derive(Debug, Clone)]
pub struct IndividualRepo {
    /// Location of the individual repo, a URL or a path on the local
    /// file system
    pub location: String,
    /// The branch of the individual repo to import
    pub branch: String,
    /// Name of the repo, unique across the input set
    pub name: String,
    /// Destination directory within the monorepo. The destination can
    /// have multiple parts, e.g. `foo/bar`, in which case the
    /// subdirectories are created recursively.
    pub destination: String,
}

impl IndividualRepo {
    /// Create a descriptor.
    ///
    /// `name` defaults to the basename of the location with a trailing
    /// `.git` stripped (for `https://github.com/orga/repo.git` the name
    /// is `"repo"`), and `destination` defaults to the name.
    pub fn new(
        location: impl Into<String>,
        branch: impl Into<String>,
        name: Option<String>,
        destination: Option<String>,
    ) -> Result<Self> {
        let location = location.into();
        let name = match name {
            Some(name) => name,
            None => default_repo_name(&location)?,
        };
        if !is_valid_name(&name) {
            return Err(Error::Config(format!(
                "invalid repo name '{}': only ASCII letters, digits, '_' and '-' are allowed",
                name
            )));
        }
        let destination = destination.unwrap_or_else(|| name.clone());
        validate_destination(&name, &destination)?;
        Ok(Self {
            location,
            branch: branch.into(),
            name,
            destination,
        })
    }
}

/// Derive the default repo name from its location
pub fn default_repo_name(location: &str) -> Result<String> {
    let basename = if location.contains("://") {
        let parsed = url::Url::parse(location)
            .map_err(|e| Error::Config(format!("invalid repo location '{}': {}", location, e)))?;
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::Config(format!("cannot derive a repo name from '{}'", location))
            })?
    } else {
        location
            .trim_end_matches(['/', '\\'])
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(location)
            .to_string()
    };
    let name = basename.strip_suffix(".git").unwrap_or(&basename);
    if name.is_empty() {
        return Err(Error::Config(format!(
            "cannot derive a repo name from '{}'",
            location
        )));
    }
    Ok(name.to_string())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_destination(name: &str, destination: &str) -> Result<()> {
    let relative = !destination.starts_with('/') && !destination.contains(':');
    let clean = !destination.is_empty()
        && destination
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if !relative || !clean {
        return Err(Error::Config(format!(
            "invalid destination '{}' for repo '{}': expected a clean relative path",
            destination, name
        )));
    }
    Ok(())
}

/// Validate an input set before any import work starts.
///
/// Names must be unique, and no destination may be equal to or nested
/// under another input's destination: overlapping destinations would make
/// relocated files indistinguishable from files still to relocate.
pub fn validate_inputs(inputs: &[IndividualRepo]) -> Result<()> {
    for (i, a) in inputs.iter().enumerate() {
        for b in &inputs[i + 1..] {
            if a.name == b.name {
                return Err(Error::Config(format!("duplicate repo name '{}'", a.name)));
            }
            if destinations_overlap(&a.destination, &b.destination) {
                return Err(Error::Config(format!(
                    "destinations of repos '{}' and '{}' overlap: '{}' vs '{}'",
                    a.name, b.name, a.destination, b.destination
                )));
            }
        }
    }
    Ok(())
}

fn destinations_overlap(a: &str, b: &str) -> bool {
    a == b || a.starts_with(&format!("{}/", b)) || b.starts_with(&format!("{}/", a))
}
