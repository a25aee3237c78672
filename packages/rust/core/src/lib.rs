//! Build-time configuration resolution for docconf.
//!
//! This crate turns a build manifest and a site config into one immutable
//! [`ResolvedConfig`](assembler::ResolvedConfig): the canonical version, the
//! cross-reference link templates derived from it, the merged API project
//! registry, and the version warning banner.

pub mod assembler;
pub mod banner;
pub mod links;
pub mod manifest;
pub mod pipeline;
mod placeholders;
pub mod projects;
pub mod prolog;

pub use assembler::{ResolvedConfig, resolve};
pub use pipeline::{SiteSources, resolve_site};
