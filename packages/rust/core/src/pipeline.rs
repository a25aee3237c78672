//! File-backed resolution: site config and manifest on disk to [`ResolvedConfig`].

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use docconf_shared::{Channel, DocConfError, Result, SiteConfig, load_config_from};

use crate::assembler::{ResolvedConfig, resolve};

/// A loaded site config together with the manifest it points at.
#[derive(Debug, Clone)]
pub struct SiteSources {
    pub config: SiteConfig,
    pub manifest_path: PathBuf,
    pub manifest: String,
}

impl SiteSources {
    /// Read the site config and its manifest. The manifest path is relative to the config file.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let manifest_path = SiteConfig::resolve_path(config_path, &config.project.manifest);
        let manifest = std::fs::read_to_string(&manifest_path)
            .map_err(|e| DocConfError::io(&manifest_path, e))?;

        debug!(
            manifest = %manifest_path.display(),
            bytes = manifest.len(),
            "loaded manifest"
        );

        Ok(Self {
            config,
            manifest_path,
            manifest,
        })
    }

    pub fn resolve(&self, channel: Channel) -> Result<ResolvedConfig> {
        Ok(resolve(&self.manifest, &self.config, channel)?)
    }
}

/// Load `config_path`, read its manifest and resolve the build configuration.
#[instrument(skip_all, fields(config = %config_path.display(), channel = %channel))]
pub fn resolve_site(config_path: &Path, channel: Channel) -> Result<ResolvedConfig> {
    SiteSources::load(config_path)?.resolve(channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docconf_shared::{CONFIG_FILE_NAME, ConfigError, ErrorKind};

    const SITE: &str = r#"
[project]
name = "Demo"
manifest = "../Makefile"

[links]
host = "https://git.example.org/demo"

[api]
default_project = "libdemo"

[[api.projects]]
name = "libdemo"
include_root = "../include"
headers = ["demo.h"]
"#;

    fn write_tree(manifest: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("docs")).expect("mkdir docs");
        std::fs::write(dir.path().join("docs").join(CONFIG_FILE_NAME), SITE).expect("write config");
        std::fs::write(dir.path().join("Makefile"), manifest).expect("write manifest");
        dir
    }

    #[test]
    fn resolves_manifest_relative_to_config() {
        let dir = write_tree("VERSION := 2.1.0\n");
        let config_path = dir.path().join("docs").join(CONFIG_FILE_NAME);

        let resolved = resolve_site(&config_path, Channel::Development).unwrap();
        assert_eq!(resolved.version().as_str(), "2.1.0");
        assert_eq!(resolved.projects().default_name(), "libdemo");
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let site = SITE.replace("../Makefile", "no-such-dir/Makefile");
        std::fs::write(&config_path, site).expect("write config");

        let err = resolve_site(&config_path, Channel::Stable).unwrap_err();
        match err {
            DocConfError::Io { path, .. } => assert!(path.ends_with("Makefile")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolution_errors_are_carried_unchanged() {
        let dir = write_tree("VERSION := 1.0.0\nVERSION := 1.1.0\n");
        let config_path = dir.path().join("docs").join(CONFIG_FILE_NAME);

        let err = resolve_site(&config_path, Channel::Stable).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::AmbiguousVersion));
        assert!(matches!(
            err,
            DocConfError::Resolve(ConfigError::AmbiguousVersion { .. })
        ));
    }

    #[test]
    fn site_fixture_resolves() {
        let resolved = resolve_site(
            Path::new("../../../fixtures/site/docconf.toml"),
            Channel::Stable,
        )
        .unwrap();
        assert_eq!(resolved.version().as_str(), "0.1.2");
        assert_eq!(
            resolved.links().url("source-file", "libbdus/include/bdus.h").unwrap(),
            "https://gitlab.lsd.di.uminho.pt/albertofaria/bdus/blob/0.1.2/libbdus/include/bdus.h"
        );
        assert_eq!(
            resolved.projects().lookup("kbdus").unwrap().symbol_index,
            PathBuf::from("_build/breathe/doxygen/kbdus/xml")
        );
        assert_eq!(resolved.prolog().copyright, "2020, Alberto Faria");
        assert_eq!(resolved.prolog().linkcheck_ignore.len(), 2);
    }
}
