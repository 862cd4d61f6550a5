//! Release version validation.
//!
//! A release version is `MAJOR.MINOR.PATCH[-PRERELEASE]`. The numeric
//! file version stamped into binaries is always `MAJOR.MINOR.PATCH.0`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ReleaseError, Result};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(-[a-zA-Z0-9.-]+)?$").unwrap_or_else(|e| {
        unreachable!("version pattern is a valid regex: {e}")
    })
});

/// A validated release version and its derived file version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseVersion {
    version: String,
    file_version: String,
}

impl ReleaseVersion {
    /// Validates `input` and derives the file version.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidVersionFormat`] when the input does not
    /// match the release grammar.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || ReleaseError::InvalidVersionFormat {
            input: input.to_string(),
        };

        let caps = VERSION_PATTERN.captures(input).ok_or_else(invalid)?;
        let (major, minor, patch) = (&caps[1], &caps[2], &caps[3]);

        Ok(Self {
            version: input.to_string(),
            file_version: format!("{major}.{minor}.{patch}.0"),
        })
    }

    /// The version exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// `MAJOR.MINOR.PATCH.0`, prerelease stripped.
    pub fn file_version(&self) -> &str {
        &self.file_version
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}
