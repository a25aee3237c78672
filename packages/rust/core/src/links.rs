//! Cross-reference link templates.
//!
//! Each link kind (`source-file`, `diff`, ...) owns a URL pattern with one
//! `%s` path slot. Version-bound kinds get the build version substituted at
//! construction; the path slot is filled later, per reference, by the renderer.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};
use url::Url;

use docconf_shared::{ConfigError, LinkKindConfig, VersionToken};

use crate::placeholders::{self, PLACEHOLDER_RE};

/// The open slot a caller fills with a path or ref.
pub const PATH_SLOT: &str = "%s";

const HOST_PLACEHOLDER: &str = "host";
const VERSION_PLACEHOLDER: &str = "version";

/// Characters escaped when a path is placed into a URL. `/` is kept.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// ---------------------------------------------------------------------------
// LinkTemplate
// ---------------------------------------------------------------------------

/// A resolved URL template for one link kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplate {
    kind: String,
    url_pattern: String,
    label: String,
    version: Option<VersionToken>,
}

impl LinkTemplate {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The URL pattern, host and version already substituted, one `%s` left open.
    pub fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The version baked into this template, `None` for version-independent kinds.
    pub fn version(&self) -> Option<&VersionToken> {
        self.version.as_ref()
    }

    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }

    /// Fill the path slot, percent-escaping the path (segment separators kept).
    pub fn url(&self, path: &str) -> String {
        let escaped = utf8_percent_encode(path, PATH_ESCAPE).to_string();
        self.url_pattern.replacen(PATH_SLOT, &escaped, 1)
    }

    /// Link text for `path`: the label with `%s` filled, or the label as a prefix.
    pub fn caption(&self, path: &str) -> String {
        if self.label.contains(PATH_SLOT) {
            self.label.replacen(PATH_SLOT, path, 1)
        } else {
            format!("{}{path}", self.label)
        }
    }
}

/// Renderers receive each template as an `[url_pattern, label]` pair.
impl Serialize for LinkTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.url_pattern, &self.label).serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// LinkTemplates
// ---------------------------------------------------------------------------

/// All link templates of a build, keyed by kind name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkTemplates {
    templates: BTreeMap<String, LinkTemplate>,
}

impl LinkTemplates {
    /// Build one template per declared kind.
    #[instrument(skip_all, fields(version = %version, kinds = kinds.len()))]
    pub fn build(
        version: &VersionToken,
        host: &str,
        kinds: &[LinkKindConfig],
    ) -> Result<Self, ConfigError> {
        let host = normalize_host(host)?;
        let mut templates = BTreeMap::new();

        for kind in kinds {
            if templates.contains_key(&kind.name) {
                return Err(ConfigError::DuplicateLinkKind {
                    kind: kind.name.clone(),
                });
            }
            let template = build_template(version, &host, kind)?;
            debug!(
                kind = %kind.name,
                versioned = template.is_versioned(),
                pattern = %template.url_pattern,
                "built link template"
            );
            templates.insert(kind.name.clone(), template);
        }

        Ok(Self { templates })
    }

    /// Look up a kind; undeclared kinds are `UnknownLinkKind`.
    pub fn get(&self, kind: &str) -> Result<&LinkTemplate, ConfigError> {
        self.templates
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownLinkKind {
                kind: kind.to_string(),
            })
    }

    /// Shorthand for `get(kind)?.url(path)`.
    pub fn url(&self, kind: &str, path: &str) -> Result<String, ConfigError> {
        Ok(self.get(kind)?.url(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkTemplate> {
        self.templates.values()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_host(host: &str) -> Result<String, ConfigError> {
    let trimmed = host.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidHost {
        host: host.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(invalid("cannot be a base URL".into()));
    }
    if trimmed.contains(PATH_SLOT) {
        return Err(invalid(format!("contains the `{PATH_SLOT}` path slot")));
    }
    Ok(trimmed.to_string())
}

fn build_template(
    version: &VersionToken,
    host: &str,
    kind: &LinkKindConfig,
) -> Result<LinkTemplate, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidLinkPattern {
        kind: kind.name.clone(),
        pattern: kind.pattern.clone(),
        reason,
    };

    let slots = kind.pattern.matches(PATH_SLOT).count();
    if slots != 1 {
        return Err(invalid(format!(
            "expected exactly one `{PATH_SLOT}` path slot, found {slots}"
        )));
    }

    let mut version_slots = 0;
    for caps in PLACEHOLDER_RE.captures_iter(&kind.pattern) {
        match &caps[1] {
            HOST_PLACEHOLDER => {}
            VERSION_PLACEHOLDER => version_slots += 1,
            other => return Err(invalid(format!("unknown placeholder `{{{other}}}`"))),
        }
    }
    if version_slots > 1 {
        return Err(invalid(format!(
            "`{{{VERSION_PLACEHOLDER}}}` may appear at most once, found {version_slots}"
        )));
    }

    let url_pattern = placeholders::substitute(
        &kind.pattern,
        &[(HOST_PLACEHOLDER, host), (VERSION_PLACEHOLDER, version.as_str())],
    );

    Ok(LinkTemplate {
        kind: kind.name.clone(),
        url_pattern,
        label: kind.label.clone(),
        version: (version_slots == 1).then(|| version.clone()),
    })
}
