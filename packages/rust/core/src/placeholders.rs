//! `{name}` placeholder substitution for configured text templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches `{name}` placeholders.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder regex"));

/// Replace every `{name}` listed in `values` in one pass.
///
/// Substituted text is never rescanned, and placeholders not listed in
/// `values` are left as written.
pub(crate) fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

/// Occurrences of `{name}` in `template`.
pub(crate) fn count(template: &str, name: &str) -> usize {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter(|caps| &caps[1] == name)
        .count()
}
