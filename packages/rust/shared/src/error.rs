//! Error types for docconf.
//!
//! Resolution failures are [`ConfigError`]s: each one names its [`ErrorKind`]
//! and the offending input. [`DocConfError`] wraps them together with the
//! file-level problems of loading a site configuration. The CLI wraps this with
//! `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Fieldless discriminant of a [`ConfigError`], for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    VersionNotFound,
    AmbiguousVersion,
    InvalidVersion,
    UnknownLinkKind,
    DuplicateLinkKind,
    InvalidLinkPattern,
    InvalidHost,
    NoProjects,
    DuplicateProject,
    EmptyProjectHeaders,
    UnknownDefaultProject,
    ProjectNotFound,
    InvalidBannerTemplate,
    InvalidLinkcheckPattern,
    VersionMismatch,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A manifest line that declared a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    /// 1-based line number within the manifest.
    pub number: usize,
    /// The line as written, without its terminator.
    pub text: String,
}

impl std::fmt::Display for ManifestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: `{}`", self.number, self.text)
    }
}

/// A configuration-resolution failure. Always fatal to the current build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The manifest has no `<key> := X.Y.Z` line.
    #[error("VersionNotFound: no `{key} := MAJOR.MINOR.PATCH` line in manifest")]
    VersionNotFound { key: String },

    /// The manifest declares the version more than once.
    #[error(
        "AmbiguousVersion: {} `{key}` declarations in manifest ({})",
        .lines.len(),
        join_lines(.lines)
    )]
    AmbiguousVersion { key: String, lines: Vec<ManifestLine> },

    /// A string that should be a version token is not `MAJOR.MINOR.PATCH`.
    #[error("InvalidVersion: `{value}` is not MAJOR.MINOR.PATCH")]
    InvalidVersion { value: String },

    /// A link kind was requested that the catalog never declared.
    #[error("UnknownLinkKind: no link kind named `{kind}`")]
    UnknownLinkKind { kind: String },

    #[error("DuplicateLinkKind: link kind `{kind}` declared more than once")]
    DuplicateLinkKind { kind: String },

    #[error("InvalidLinkPattern: link kind `{kind}` pattern `{pattern}`: {reason}")]
    InvalidLinkPattern {
        kind: String,
        pattern: String,
        reason: String,
    },

    #[error("InvalidHost: `{host}` is not an absolute URL: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("NoProjects: no API projects declared")]
    NoProjects,

    #[error("DuplicateProject: API project `{name}` declared more than once")]
    DuplicateProject { name: String },

    #[error("EmptyProjectHeaders: API project `{name}` lists no headers")]
    EmptyProjectHeaders { name: String },

    #[error("UnknownDefaultProject: default project `{name}` is not declared")]
    UnknownDefaultProject { name: String },

    #[error("ProjectNotFound: no API project named `{name}`")]
    ProjectNotFound { name: String },

    #[error("InvalidBannerTemplate: {channel} banner template `{template}`: {reason}")]
    InvalidBannerTemplate {
        channel: String,
        template: String,
        reason: String,
    },

    #[error("InvalidLinkcheckPattern: `{pattern}`: {reason}")]
    InvalidLinkcheckPattern { pattern: String, reason: String },

    /// A derived value embeds a version other than the build's token.
    /// Indicates a construction-order bug, not bad input.
    #[error("VersionMismatch: {origin} embeds `{found}`, build version is `{expected}`")]
    VersionMismatch {
        origin: String,
        expected: String,
        found: String,
    },
}

fn join_lines(lines: &[ManifestLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    /// The fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionNotFound { .. } => ErrorKind::VersionNotFound,
            Self::AmbiguousVersion { .. } => ErrorKind::AmbiguousVersion,
            Self::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            Self::UnknownLinkKind { .. } => ErrorKind::UnknownLinkKind,
            Self::DuplicateLinkKind { .. } => ErrorKind::DuplicateLinkKind,
            Self::InvalidLinkPattern { .. } => ErrorKind::InvalidLinkPattern,
            Self::InvalidHost { .. } => ErrorKind::InvalidHost,
            Self::NoProjects => ErrorKind::NoProjects,
            Self::DuplicateProject { .. } => ErrorKind::DuplicateProject,
            Self::EmptyProjectHeaders { .. } => ErrorKind::EmptyProjectHeaders,
            Self::UnknownDefaultProject { .. } => ErrorKind::UnknownDefaultProject,
            Self::ProjectNotFound { .. } => ErrorKind::ProjectNotFound,
            Self::InvalidBannerTemplate { .. } => ErrorKind::InvalidBannerTemplate,
            Self::InvalidLinkcheckPattern { .. } => ErrorKind::InvalidLinkcheckPattern,
            Self::VersionMismatch { .. } => ErrorKind::VersionMismatch,
        }
    }
}

/// Top-level error type for all docconf operations.
#[derive(Debug, thiserror::Error)]
pub enum DocConfError {
    /// Site configuration file could not be parsed or is incomplete.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Resolution failed; the underlying error is carried unchanged.
    #[error(transparent)]
    Resolve(#[from] ConfigError),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocConfError>;

impl DocConfError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The resolution error kind, if this is a resolution failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Resolve(err) => Some(err.kind()),
            _ => None,
        }
    }
}
