//! Build manifest version extraction.
//!
//! The manifest declares the project version on a line of the form
//! `VERSION := MAJOR.MINOR.PATCH`. Exactly one such line must exist.

use std::sync::LazyLock;

use regex::{Match, Regex};
use tracing::debug;

use docconf_shared::{ConfigError, ManifestLine, VERSION_COMPONENT, VersionToken};

/// Key used when the site config does not name one.
pub const DEFAULT_VERSION_KEY: &str = "VERSION";

static DEFAULT_EXTRACTOR: LazyLock<VersionExtractor> =
    LazyLock::new(|| VersionExtractor::new(DEFAULT_VERSION_KEY));

/// Finds the single `<key> := X.Y.Z` declaration in manifest text.
#[derive(Debug, Clone)]
pub struct VersionExtractor {
    key: String,
    pattern: Regex,
}

impl VersionExtractor {
    /// Build an extractor for `key`. The key is matched literally.
    pub fn new(key: &str) -> Self {
        let pattern = format!(
            r"(?m)^{key} := ({c}\.{c}\.{c})\r?$",
            key = regex::escape(key),
            c = VERSION_COMPONENT,
        );
        Self {
            key: key.to_string(),
            // Key is escaped and the rest is fixed, so this always compiles.
            pattern: Regex::new(&pattern).expect("manifest version regex"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Extract the version token from `manifest`.
    ///
    /// Fails with `VersionNotFound` when no line matches and with
    /// `AmbiguousVersion` (listing every matching line) when several do.
    pub fn extract(&self, manifest: &str) -> Result<VersionToken, ConfigError> {
        let matches: Vec<(Match<'_>, &str)> = self
            .pattern
            .captures_iter(manifest)
            .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?.as_str())))
            .collect();

        match matches.as_slice() {
            [] => Err(ConfigError::VersionNotFound {
                key: self.key.clone(),
            }),
            [(_, value)] => {
                let version = VersionToken::parse(value)?;
                debug!(key = %self.key, %version, "extracted manifest version");
                Ok(version)
            }
            many => Err(ConfigError::AmbiguousVersion {
                key: self.key.clone(),
                lines: many
                    .iter()
                    .map(|(whole, _)| ManifestLine {
                        number: line_number(manifest, whole.start()),
                        text: whole.as_str().trim_end_matches('\r').to_string(),
                    })
                    .collect(),
            }),
        }
    }
}

/// Extract the version using the default `VERSION` key.
pub fn extract_version(manifest: &str) -> Result<VersionToken, ConfigError> {
    DEFAULT_EXTRACTOR.extract(manifest)
}

/// 1-based line number of the byte offset `at`.
fn line_number(text: &str, at: usize) -> usize {
    text[..at].bytes().filter(|&b| b == b'\n').count() + 1
}
