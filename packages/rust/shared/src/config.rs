//! Site configuration for docconf.
//!
//! A documentation tree carries a `docconf.toml` next to its sources. Paths in
//! it (the manifest, include roots) are relative to the file's own directory.
//! Every section except `[project]`, `[links]` and `[api]` is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocConfError, Result};

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "docconf.toml";

/// Placeholder a stable banner keeps for the publishing stage.
pub const NEWEST_PLACEHOLDER: &str = "{newest}";

// ---------------------------------------------------------------------------
// Config structs (matching docconf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level site config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub project: ProjectConfig,

    pub links: LinksConfig,

    pub api: ApiConfig,

    #[serde(default)]
    pub banner: BannerConfig,

    /// Named text substitutions, resolved against the build version.
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Display name of the documented project.
    pub name: String,

    #[serde(default)]
    pub author: String,

    /// Path to the build manifest holding the version line.
    pub manifest: PathBuf,

    /// Manifest key whose value is the version.
    #[serde(default = "default_version_key")]
    pub version_key: String,

    /// Pins the copyright year; the current year when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_year: Option<i32>,

    /// URL regexes the link checker should skip.
    #[serde(default)]
    pub linkcheck_ignore: Vec<String>,
}

fn default_version_key() -> String {
    "VERSION".into()
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Repository base URL substituted for `{host}`.
    pub host: String,

    #[serde(default = "default_link_kinds")]
    pub kinds: Vec<LinkKindConfig>,
}

/// `[[links.kinds]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkKindConfig {
    pub name: String,
    /// URL pattern using `{host}`, optionally `{version}`, and one `%s`.
    pub pattern: String,
    /// Caption pattern; a plain prefix when it has no `%s`.
    #[serde(default)]
    pub label: String,
}

impl LinkKindConfig {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            label: String::new(),
        }
    }
}

/// The catalog used when a site declares no link kinds.
pub fn default_link_kinds() -> Vec<LinkKindConfig> {
    vec![
        LinkKindConfig::new("source-directory", "{host}/tree/{version}/%s"),
        LinkKindConfig::new("source-file", "{host}/blob/{version}/%s"),
        LinkKindConfig::new("diff", "{host}/compare/%s"),
    ]
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_project: String,

    /// Domain for projects whose headers match no `domain_by_extension` entry.
    #[serde(default = "default_primary_domain")]
    pub primary_domain: String,

    /// Root under which symbol indexes land when a project names none.
    #[serde(default = "default_symbol_index_root")]
    pub symbol_index_root: PathBuf,

    /// Header file extension (without the dot) to syntax domain.
    #[serde(default = "default_domain_by_extension")]
    pub domain_by_extension: BTreeMap<String, String>,

    /// Member options the symbol extractor applies to every project.
    #[serde(default = "default_members")]
    pub default_members: Vec<String>,

    /// Options passed through to the symbol extractor.
    #[serde(default = "default_extractor_options")]
    pub extractor_options: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub show_define_initializer: bool,

    #[serde(default)]
    pub projects: Vec<ProjectDecl>,
}

fn default_primary_domain() -> String {
    "c".into()
}
fn default_symbol_index_root() -> PathBuf {
    PathBuf::from("_build/breathe/doxygen")
}
fn default_domain_by_extension() -> BTreeMap<String, String> {
    BTreeMap::from([("h".to_string(), "c".to_string())])
}
fn default_members() -> Vec<String> {
    vec!["members".into(), "undoc-members".into()]
}
fn default_extractor_options() -> BTreeMap<String, String> {
    // HIDE_SCOPE_NAMES keeps function-pointer fields rendering correctly.
    BTreeMap::from([
        ("HIDE_SCOPE_NAMES".to_string(), "YES".to_string()),
        ("WARN_NO_PARAMDOC".to_string(), "YES".to_string()),
    ])
}
fn default_true() -> bool {
    true
}

/// `[[api.projects]]` entry: one independently documented API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDecl {
    pub name: String,
    pub include_root: PathBuf,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_index: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// `[banner]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Development-channel message. `{project}`, `{version}`, `{stable_url}`.
    #[serde(default = "default_development_message")]
    pub development_message: String,

    /// Stable-channel message. `{project}`, `{version}`, and exactly one `{newest}`.
    #[serde(default = "default_stable_message")]
    pub stable_message: String,

    /// Where the newest stable docs live, for the development message.
    #[serde(default = "default_stable_url")]
    pub stable_url: String,

    /// Page element the banner attaches to.
    #[serde(default = "default_body_selector")]
    pub body_selector: String,

    /// HTML wrapper with one `{message}` slot.
    #[serde(default = "default_banner_html")]
    pub banner_html: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            development_message: default_development_message(),
            stable_message: default_stable_message(),
            stable_url: default_stable_url(),
            body_selector: default_body_selector(),
            banner_html: default_banner_html(),
        }
    }
}

fn default_development_message() -> String {
    "You are reading the documentation for the development version of {project} ({version}). \
     <a href=\"{stable_url}\">Click here for the newest stable release.</a>"
        .into()
}
fn default_stable_message() -> String {
    "You are reading the documentation for {project} {version}. \
     The newest stable release is {newest}."
        .into()
}
fn default_stable_url() -> String {
    "/en/stable".into()
}
fn default_body_selector() -> String {
    "body".into()
}
fn default_banner_html() -> String {
    "<div id=\"version-warning-banner\">{message}</div>".into()
}

impl SiteConfig {
    /// Resolve a config-relative path against the directory holding the config file.
    pub fn resolve_path(config_path: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            return relative.to_path_buf();
        }
        config_path
            .parent()
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|| relative.to_path_buf())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Parse a site config from TOML text.
pub fn parse_config(content: &str) -> Result<SiteConfig> {
    toml::from_str(content).map_err(|e| DocConfError::config(format!("invalid site config: {e}")))
}

/// Load the site config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocConfError::io(path, e))?;

    tracing::debug!(?path, "loaded site config");

    toml::from_str(&content).map_err(|e| {
        DocConfError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
