//! Version warning banner.
//!
//! Development builds get a fully resolved message. Stable builds keep one
//! `{newest}` placeholder: which release is newest depends on the whole release
//! history, so the publishing stage fills it in with [`BannerMessage::finish`]
//! after configuration. Configuration never resolves it.

use serde::Serialize;
use tracing::debug;

use docconf_shared::{BannerConfig, Channel, ConfigError, NEWEST_PLACEHOLDER, VersionToken};

use crate::placeholders;

const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Banner text, resolved or awaiting the newest stable version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "lowercase")]
pub enum BannerMessage {
    /// Final text.
    Resolved(String),
    /// Text with exactly one `{newest}` placeholder left for the publishing stage.
    Deferred(String),
}

impl BannerMessage {
    /// The text as held, placeholder included when deferred.
    pub fn text(&self) -> &str {
        match self {
            Self::Resolved(text) | Self::Deferred(text) => text,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Number of unresolved `{newest}` placeholders (0 or 1).
    pub fn deferred_placeholders(&self) -> usize {
        match self {
            Self::Resolved(_) => 0,
            Self::Deferred(text) => text.matches(NEWEST_PLACEHOLDER).count(),
        }
    }

    /// Second phase: fill in the newest stable version. Resolved text is returned as is.
    pub fn finish(&self, newest_stable: &str) -> String {
        match self {
            Self::Resolved(text) => text.clone(),
            Self::Deferred(text) => text.replacen(NEWEST_PLACEHOLDER, newest_stable, 1),
        }
    }
}

/// The banner a build publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerPolicy {
    pub channel: Channel,
    /// Version the message was built for.
    pub version: VersionToken,
    pub message: BannerMessage,
    /// Page element the banner attaches to.
    pub target: String,
    /// HTML wrapper with one `{message}` slot.
    pub html: String,
}

impl BannerPolicy {
    /// Select and build the banner for `channel`.
    pub fn build(
        version: &VersionToken,
        channel: Channel,
        project: &str,
        config: &BannerConfig,
    ) -> Result<Self, ConfigError> {
        let message = match channel {
            Channel::Development => development_message(version, project, config)?,
            Channel::Stable => stable_message(version, project, config)?,
        };

        if config.banner_html.matches(MESSAGE_PLACEHOLDER).count() != 1 {
            return Err(invalid(
                channel,
                &config.banner_html,
                "HTML wrapper must contain exactly one `{message}`",
            ));
        }

        debug!(%channel, deferred = message.is_deferred(), "selected banner policy");

        Ok(Self {
            channel,
            version: version.clone(),
            message,
            target: config.body_selector.clone(),
            html: config.banner_html.clone(),
        })
    }

    /// Wrap `text` (usually a finished message) in the HTML wrapper.
    pub fn render_html(&self, text: &str) -> String {
        self.html.replacen(MESSAGE_PLACEHOLDER, text, 1)
    }
}

fn development_message(
    version: &VersionToken,
    project: &str,
    config: &BannerConfig,
) -> Result<BannerMessage, ConfigError> {
    let template = &config.development_message;
    require_one_version(Channel::Development, template)?;
    if template.contains(NEWEST_PLACEHOLDER) {
        return Err(invalid(
            Channel::Development,
            template,
            "development messages are final and cannot defer `{newest}`",
        ));
    }

    let text = placeholders::substitute(
        template,
        &[
            ("project", project),
            ("version", version.as_str()),
            ("stable_url", config.stable_url.as_str()),
        ],
    );
    if text.contains(NEWEST_PLACEHOLDER) {
        return Err(invalid(
            Channel::Development,
            template,
            "a substituted value introduces `{newest}`",
        ));
    }
    Ok(BannerMessage::Resolved(text))
}

fn stable_message(
    version: &VersionToken,
    project: &str,
    config: &BannerConfig,
) -> Result<BannerMessage, ConfigError> {
    let template = &config.stable_message;
    require_one_version(Channel::Stable, template)?;
    let found = template.matches(NEWEST_PLACEHOLDER).count();
    if found != 1 {
        return Err(invalid(
            Channel::Stable,
            template,
            &format!("stable messages must defer exactly one `{{newest}}`, found {found}"),
        ));
    }

    let text = placeholders::substitute(
        template,
        &[("project", project), ("version", version.as_str())],
    );
    if text.matches(NEWEST_PLACEHOLDER).count() != 1 {
        return Err(invalid(
            Channel::Stable,
            template,
            "a substituted value introduces `{newest}`",
        ));
    }
    Ok(BannerMessage::Deferred(text))
}

/// Both messages name the version they document, exactly once.
fn require_one_version(channel: Channel, template: &str) -> Result<(), ConfigError> {
    match placeholders::count(template, "version") {
        1 => Ok(()),
        found => Err(invalid(
            channel,
            template,
            &format!("message must contain exactly one `{{version}}`, found {found}"),
        )),
    }
}

fn invalid(channel: Channel, template: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidBannerTemplate {
        channel: channel.to_string(),
        template: template.to_string(),
        reason: reason.to_string(),
    }
}
