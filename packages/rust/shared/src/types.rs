//! Core domain types shared by every docconf stage.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `MAJOR.MINOR.PATCH` component: `0` or a number without leading zeros.
pub const VERSION_COMPONENT: &str = r"(?:0|[1-9][0-9]*)";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{c}\.{c}\.{c}$",
        c = VERSION_COMPONENT
    ))
    .expect("version regex")
});

// ---------------------------------------------------------------------------
// VersionToken
// ---------------------------------------------------------------------------

/// The single canonical version of a documentation build.
///
/// Well-formed by construction (`MAJOR.MINOR.PATCH`) and otherwise opaque:
/// it is never compared semantically, only embedded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Validate and wrap a version string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        if VERSION_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::InvalidVersion {
                value: s.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VersionToken {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Publishing channel of a build. Selects the banner policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Docs built from the development branch.
    Development,
    /// Docs for a tagged release.
    Stable,
}

impl Channel {
    /// Map a publishing ref (branch or version slug of the hosting service) to a channel.
    ///
    /// `latest`, `main` and `master` are the moving development refs; every
    /// other ref names a release.
    pub fn from_publish_ref(reference: &str) -> Self {
        match reference.trim() {
            "latest" | "main" | "master" => Self::Development,
            _ => Self::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "latest" => Ok(Self::Development),
            "stable" => Ok(Self::Stable),
            other => Err(format!(
                "unknown channel '{other}' (expected 'development' or 'stable')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3")]
    #[case("0.0.0")]
    #[case("10.20.300")]
    #[case("0.1.10")]
    fn version_token_accepts(#[case] input: &str) {
        let token: VersionToken = input.parse().expect("valid version");
        assert_eq!(token.as_str(), input);
        assert_eq!(token.to_string(), input);
    }

    #[rstest]
    #[case("")]
    #[case("1.2")]
    #[case("1.2.3.4")]
    #[case("01.2.3")]
    #[case("1.02.3")]
    #[case("1.2.00")]
    #[case("v1.2.3")]
    #[case("1.2.3-rc1")]
    #[case(" 1.2.3")]
    fn version_token_rejects(#[case] input: &str) {
        let err = VersionToken::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVersion);
    }

    #[test]
    fn version_token_serializes_as_plain_string() {
        let token = VersionToken::parse("1.2.3").unwrap();
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"1.2.3\"");
    }

    #[rstest]
    #[case("development", Channel::Development)]
    #[case("dev", Channel::Development)]
    #[case("latest", Channel::Development)]
    #[case("Stable", Channel::Stable)]
    fn channel_parses(#[case] input: &str, #[case] expected: Channel) {
        assert_eq!(input.parse::<Channel>().unwrap(), expected);
    }

    #[test]
    fn channel_rejects_unknown() {
        let err = "nightly".parse::<Channel>().unwrap_err();
        assert!(err.contains("nightly"));
    }

    #[rstest]
    #[case("latest", Channel::Development)]
    #[case("master", Channel::Development)]
    #[case("main", Channel::Development)]
    #[case("stable", Channel::Stable)]
    #[case("0.1.0", Channel::Stable)]
    fn channel_from_publish_ref(#[case] reference: &str, #[case] expected: Channel) {
        assert_eq!(Channel::from_publish_ref(reference), expected);
    }
}
