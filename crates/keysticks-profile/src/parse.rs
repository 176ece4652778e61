use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{source::Source, v1::ProfileV1, ProfileError};

/// Parse a yaml profile into a source.
pub fn parse_profile(input: &str) -> Result<Source, ProfileError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let profile: ProfileV1 = serde_yaml::from_str(input)?;
            let source = profile.to_source()?;
            Ok(source)
        }
        _ => Err(ProfileError::UnsupportedVersion(version)),
    }
}

/// Read and parse a profile file. The source is named after the file
/// when the profile does not carry a name.
pub fn load_profile(path: &Path) -> Result<Source, ProfileError> {
    let content = fs::read_to_string(path)?;
    let source = parse_profile(&content)?;
    if !source.name().is_empty() {
        return Ok(source);
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(source.with_name(stem))
}

/// A profile with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedProfile {
    version: u8,
}

/// Parse the version of yaml profile.
fn parse_version(input: &str) -> Result<u8, ProfileError> {
    let raw: VersionedProfile = serde_yaml::from_str(input)?;
    Ok(raw.version)
}
