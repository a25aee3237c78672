//! Shared types, error model, and configuration for docconf.
//!
//! This crate is the foundation depended on by all other docconf crates.
//! It provides:
//! - [`ConfigError`] / [`DocConfError`]: the error model
//! - Domain types ([`VersionToken`], [`Channel`])
//! - Site configuration ([`SiteConfig`], `docconf.toml` loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, BannerConfig, CONFIG_FILE_NAME, LinkKindConfig, LinksConfig, NEWEST_PLACEHOLDER,
    ProjectConfig, ProjectDecl, SiteConfig, default_link_kinds, load_config_from, parse_config,
};
pub use error::{ConfigError, DocConfError, ErrorKind, ManifestLine, Result};
pub use types::{Channel, VERSION_COMPONENT, VersionToken};
