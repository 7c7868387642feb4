//! Glob filter applied to the leaf name of created files.

use globset::{GlobBuilder, GlobMatcher};

use super::error::WatcherError;

/// Compiled file pattern such as `*.PDF`.
///
/// Matching is case-insensitive and only ever sees the leaf file name, so a
/// `/` in the pattern never matches.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl FilePattern {
    /// Compile a glob.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::InvalidPattern`] if the glob does not parse.
    pub fn new(pattern: &str) -> Result<Self, WatcherError> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| WatcherError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Whether a leaf file name matches.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}
