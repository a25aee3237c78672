//! Site-wide project metadata and version-bound text substitutions.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use docconf_shared::{ConfigError, ProjectConfig, VersionToken};

use crate::placeholders;

/// Project metadata and substitutions shared by every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteProlog {
    pub project: String,
    pub author: String,
    /// `"{year}, {author}"`.
    pub copyright: String,
    /// Substitution name to resolved text.
    pub substitutions: BTreeMap<String, String>,
    /// URL regexes the link checker skips, validated.
    pub linkcheck_ignore: Vec<String>,
}

impl SiteProlog {
    /// Resolve metadata and substitutions for `version`.
    ///
    /// Substitution templates may use `{version}`, `{project}` and `{host}`.
    pub fn build(
        version: &VersionToken,
        project: &ProjectConfig,
        host: &str,
        substitutions: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        for pattern in &project.linkcheck_ignore {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidLinkcheckPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        let host = host.trim().trim_end_matches('/');
        let substitutions: BTreeMap<_, _> = substitutions
            .iter()
            .map(|(name, template)| {
                let text = placeholders::substitute(
                    template,
                    &[
                        ("version", version.as_str()),
                        ("project", project.name.as_str()),
                        ("host", host),
                    ],
                );
                (name.clone(), text)
            })
            .collect();

        let year = project.copyright_year.unwrap_or_else(|| Utc::now().year());

        debug!(substitutions = substitutions.len(), year, "built site prolog");

        Ok(Self {
            project: project.name.clone(),
            author: project.author.clone(),
            copyright: format!("{year}, {}", project.author),
            substitutions,
            linkcheck_ignore: project.linkcheck_ignore.clone(),
        })
    }
}
