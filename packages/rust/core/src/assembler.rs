//! Resolved configuration assembly.
//!
//! Runs the resolution stages in dependency order:
//! ```text
//! manifest ─▶ version ─┬─▶ link templates ─┐
//!                      ├─▶ banner policy ──┼─▶ consistency check ─▶ ResolvedConfig
//!                      └─▶ site prolog ────┤
//! project declarations ──▶ registry ───────┘
//! ```
//! The first failure aborts resolution and is returned unchanged.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use docconf_shared::{Channel, ConfigError, SiteConfig, VersionToken};

use crate::banner::BannerPolicy;
use crate::links::LinkTemplates;
use crate::manifest::VersionExtractor;
use crate::projects::ProjectRegistry;
use crate::prolog::SiteProlog;

/// Everything the rendering engine needs for one build. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    version: VersionToken,
    links: LinkTemplates,
    projects: ProjectRegistry,
    banner: BannerPolicy,
    prolog: SiteProlog,
}

impl ResolvedConfig {
    /// Combine independently built parts, checking they agree on the version.
    ///
    /// Every versioned link template and the banner must embed `version`, and
    /// the banner text must mention it; otherwise this fails with `VersionMismatch`.
    pub fn assemble(
        version: VersionToken,
        links: LinkTemplates,
        projects: ProjectRegistry,
        banner: BannerPolicy,
        prolog: SiteProlog,
    ) -> Result<Self, ConfigError> {
        for template in links.iter() {
            if let Some(found) = template.version() {
                ensure_same(&version, found, || format!("link kind `{}`", template.kind()))?;
            }
        }
        ensure_same(&version, &banner.version, || {
            format!("{} banner", banner.channel)
        })?;
        if !banner.message.text().contains(version.as_str()) {
            return Err(ConfigError::VersionMismatch {
                origin: format!("{} banner message", banner.channel),
                expected: version.to_string(),
                found: banner.message.text().to_string(),
            });
        }

        Ok(Self {
            version,
            links,
            projects,
            banner,
            prolog,
        })
    }

    pub fn version(&self) -> &VersionToken {
        &self.version
    }

    pub fn links(&self) -> &LinkTemplates {
        &self.links
    }

    pub fn projects(&self) -> &ProjectRegistry {
        &self.projects
    }

    pub fn banner(&self) -> &BannerPolicy {
        &self.banner
    }

    pub fn prolog(&self) -> &SiteProlog {
        &self.prolog
    }

    /// JSON form handed to the rendering engine.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// SHA-256 (hex) of the compact JSON form. Equal configs hash equal.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let json = self.to_json(false)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn ensure_same(
    expected: &VersionToken,
    found: &VersionToken,
    origin: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
    if expected == found {
        Ok(())
    } else {
        Err(ConfigError::VersionMismatch {
            origin: origin(),
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

/// Resolve a build's configuration from manifest text and the site config.
#[instrument(skip_all, fields(project = %site.project.name, channel = %channel))]
pub fn resolve(
    manifest: &str,
    site: &SiteConfig,
    channel: Channel,
) -> Result<ResolvedConfig, ConfigError> {
    let version = VersionExtractor::new(&site.project.version_key).extract(manifest)?;

    let links = LinkTemplates::build(&version, &site.links.host, &site.links.kinds)?;
    let projects = ProjectRegistry::from_config(&site.api)?;
    let banner = BannerPolicy::build(&version, channel, &site.project.name, &site.banner)?;
    let prolog = SiteProlog::build(&version, &site.project, &site.links.host, &site.substitutions)?;

    let resolved = ResolvedConfig::assemble(version, links, projects, banner, prolog)?;

    info!(
        version = %resolved.version,
        link_kinds = resolved.links.len(),
        projects = resolved.projects.len(),
        default_project = resolved.projects.default_name(),
        "configuration resolved"
    );

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::BannerMessage;
    use docconf_shared::{BannerConfig, ErrorKind, ProjectDecl, parse_config};
    use std::path::PathBuf;

    const SITE: &str = r#"
[project]
name = "BDUS"
author = "Alberto Faria"
manifest = "../Makefile"
copyright_year = 2020

[links]
host = "https://gitlab.example.org/albertofaria/bdus"

[api]
default_project = "libbdus"

[[api.projects]]
name = "libbdus"
include_root = "../libbdus/include"
headers = ["bdus.h"]

[[api.projects]]
name = "kbdus"
include_root = "../kbdus/include"
headers = ["kbdus.h"]

[substitutions]
release-tar = "{host}/-/archive/{version}/bdus-{version}.tar.gz"
"#;

    fn site() -> SiteConfig {
        parse_config(SITE).expect("parse site")
    }

    #[test]
    fn end_to_end_resolution() {
        let resolved = resolve("VERSION := 1.2.3\n", &site(), Channel::Stable).unwrap();

        assert_eq!(resolved.version().as_str(), "1.2.3");

        let file = resolved.links().url("source-file", "bdus.h").unwrap();
        assert!(file.ends_with("/blob/1.2.3/bdus.h"));

        let diff = resolved.links().get("diff").unwrap();
        assert!(!diff.is_versioned());
        assert!(!diff.url("a...b").contains("1.2.3"));
        assert!(diff.url("a...b").ends_with("/compare/a...b"));

        let default = resolved.projects().default();
        assert_eq!(default.name, "libbdus");
        assert_eq!(default.include_root, PathBuf::from("../libbdus/include"));
        assert_eq!(default.headers, vec!["bdus.h".to_string()]);

        assert!(resolved.banner().message.is_deferred());
        assert_eq!(
            resolved.prolog().substitutions["release-tar"],
            "https://gitlab.example.org/albertofaria/bdus/-/archive/1.2.3/bdus-1.2.3.tar.gz"
        );
    }

    #[test]
    fn development_channel_resolves_banner_immediately() {
        let resolved = resolve("VERSION := 1.2.3\n", &site(), Channel::Development).unwrap();
        assert!(!resolved.banner().message.is_deferred());
        assert!(resolved.banner().message.text().contains("1.2.3"));
    }

    #[test]
    fn version_errors_propagate_unchanged() {
        let err = resolve("all:\n", &site(), Channel::Stable).unwrap_err();
        assert_eq!(
            err,
            ConfigError::VersionNotFound {
                key: "VERSION".into()
            }
        );

        let err = resolve("VERSION := 1.0.0\nVERSION := 1.0.1\n", &site(), Channel::Stable)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousVersion);
    }

    #[test]
    fn duplicate_project_fails_resolution() {
        let mut site = site();
        site.api.projects.push(ProjectDecl {
            name: "kbdus".into(),
            include_root: PathBuf::from("elsewhere"),
            headers: vec!["kbdus.h".into()],
            symbol_index: None,
            domain: None,
        });
        let err = resolve("VERSION := 1.2.3\n", &site, Channel::Stable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateProject);
    }

    #[test]
    fn unknown_default_project_fails_resolution() {
        let mut site = site();
        site.api.default_project = "cmdbdus".into();
        let err = resolve("VERSION := 1.2.3\n", &site, Channel::Stable).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownDefaultProject {
                name: "cmdbdus".into()
            }
        );
    }

    #[test]
    fn custom_version_key_is_honoured() {
        let mut site = site();
        site.project.version_key = "BDUS_VERSION".into();
        let resolved = resolve("BDUS_VERSION := 0.9.0\n", &site, Channel::Stable).unwrap();
        assert_eq!(resolved.version().as_str(), "0.9.0");
    }

    #[test]
    fn mismatched_parts_are_rejected() {
        let site = site();
        let v1 = VersionToken::parse("1.0.0").unwrap();
        let v2 = VersionToken::parse("2.0.0").unwrap();

        let stale_links = LinkTemplates::build(&v2, &site.links.host, &site.links.kinds).unwrap();
        let projects = ProjectRegistry::from_config(&site.api).unwrap();
        let banner =
            BannerPolicy::build(&v1, Channel::Stable, "BDUS", &BannerConfig::default()).unwrap();
        let prolog =
            SiteProlog::build(&v1, &site.project, &site.links.host, &site.substitutions).unwrap();

        let err = ResolvedConfig::assemble(
            v1.clone(),
            stale_links,
            projects.clone(),
            banner,
            prolog.clone(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        assert!(err.to_string().contains("`2.0.0`"));

        let links = LinkTemplates::build(&v1, &site.links.host, &site.links.kinds).unwrap();
        let stale_banner =
            BannerPolicy::build(&v2, Channel::Stable, "BDUS", &BannerConfig::default()).unwrap();
        let err = ResolvedConfig::assemble(v1, links, projects, stale_banner, prolog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        assert!(err.to_string().contains("stable banner"));
    }

    #[test]
    fn banner_text_without_version_is_rejected() {
        let site = site();
        let v1 = VersionToken::parse("1.2.3").unwrap();
        let links = LinkTemplates::build(&v1, &site.links.host, &site.links.kinds).unwrap();
        let projects = ProjectRegistry::from_config(&site.api).unwrap();
        let prolog =
            SiteProlog::build(&v1, &site.project, &site.links.host, &site.substitutions).unwrap();

        let mut banner =
            BannerPolicy::build(&v1, Channel::Development, "BDUS", &BannerConfig::default())
                .unwrap();
        banner.message = BannerMessage::Resolved("You are reading docs for 1.2.2.".into());

        let err = ResolvedConfig::assemble(v1, links, projects, banner, prolog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        assert!(err.to_string().contains("development banner message"));
        assert!(err.to_string().contains("`1.2.3`"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve("VERSION := 1.2.3\n", &site(), Channel::Stable).unwrap();
        let b = resolve("# rebuilt\nVERSION := 1.2.3\n", &site(), Channel::Stable).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        let c = resolve("VERSION := 1.2.4\n", &site(), Channel::Stable).unwrap();
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn json_shape_for_renderer() {
        let resolved = resolve("VERSION := 1.2.3\n", &site(), Channel::Stable).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&resolved.to_json(true).unwrap()).unwrap();
        assert_eq!(json["version"], "1.2.3");
        assert_eq!(
            json["links"]["source-file"][0],
            "https://gitlab.example.org/albertofaria/bdus/blob/1.2.3/%s"
        );
        assert_eq!(json["projects"]["default"], "libbdus");
        assert_eq!(json["banner"]["message"]["state"], "deferred");
        assert_eq!(json["prolog"]["copyright"], "2020, Alberto Faria");
    }
}
