//! Contact entry normalization.
//!
//! Record files may list a contact as a bare URL or e-mail address, or as a single-key mapping
//! such as `github: octocat`. Both forms normalize to a canonical [`Contact`].

use roster_contract::{Contact, ContactKind};
use serde_yaml::Value;
use thiserror::Error;

/// Why a contact entry could not be normalized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Contact must be a URL, an e-mail address, or a single-key mapping")]
    Unrecognized,
    #[error("Contact mapping must have exactly one key, found {0}")]
    KeyCount(usize),
    #[error("Unknown contact kind '{key}'. Expected one of: {expected}")]
    UnknownKind { key: String, expected: String },
    #[error("Contact '{0}' must be a non-empty string")]
    EmptyValue(&'static str),
    #[error("Mastodon handle must look like @user@instance or be a profile URL")]
    MastodonHandle,
    #[error("Website contact must be an http(s) URL")]
    WebsiteUrl,
}

/// Normalize one raw contact entry.
pub fn normalize_contact(raw: &Value) -> Result<Contact, ContactError> {
    match raw {
        Value::String(text) => normalize_text(text.trim()),
        Value::Mapping(map) => {
            if map.len() != 1 {
                return Err(ContactError::KeyCount(map.len()));
            }
            let Some((key, value)) = map.iter().next() else {
                return Err(ContactError::KeyCount(0));
            };
            let key = key.as_str().unwrap_or_default();
            let kind = ContactKind::from_key(key).ok_or_else(|| ContactError::UnknownKind {
                key: key.to_string(),
                expected: ContactKind::ALL.map(ContactKind::as_str).join(", "),
            })?;
            let value = value
                .as_str()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or(ContactError::EmptyValue(kind.as_str()))?;
            expand_handle(kind, value)
        }
        _ => Err(ContactError::Unrecognized),
    }
}

fn normalize_text(text: &str) -> Result<Contact, ContactError> {
    if text.starts_with("mailto:") {
        return Ok(contact(ContactKind::Email, text.to_string()));
    }
    if looks_like_email(text) {
        return Ok(contact(ContactKind::Email, format!("mailto:{text}")));
    }
    if is_http_url(text) {
        return Ok(contact(kind_for_url(text), text.to_string()));
    }
    Err(ContactError::Unrecognized)
}

fn expand_handle(kind: ContactKind, value: &str) -> Result<Contact, ContactError> {
    if is_http_url(value) && kind != ContactKind::Email {
        return Ok(contact(kind, value.to_string()));
    }
    let handle = value.trim_start_matches('@');
    let url = match kind {
        ContactKind::Github => format!("https://github.com/{handle}"),
        ContactKind::Gitlab => format!("https://gitlab.com/{handle}"),
        ContactKind::Twitter => format!("https://twitter.com/{handle}"),
        ContactKind::Linkedin => format!("https://www.linkedin.com/in/{handle}"),
        ContactKind::Email => {
            if value.starts_with("mailto:") {
                value.to_string()
            } else if looks_like_email(value) {
                format!("mailto:{value}")
            } else {
                return Err(ContactError::Unrecognized);
            }
        }
        ContactKind::Mastodon => {
            let Some((user, instance)) = handle.split_once('@') else {
                return Err(ContactError::MastodonHandle);
            };
            if user.is_empty() || instance.is_empty() {
                return Err(ContactError::MastodonHandle);
            }
            format!("https://{instance}/@{user}")
        }
        ContactKind::Website => return Err(ContactError::WebsiteUrl),
    };
    Ok(contact(kind, url))
}

fn contact(kind: ContactKind, value: String) -> Contact {
    Contact { kind, value }
}

fn looks_like_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !text.contains("://")
        && !text.chars().any(char::is_whitespace)
}

fn is_http_url(text: &str) -> bool {
    let rest = text
        .strip_prefix("https://")
        .or_else(|| text.strip_prefix("http://"));
    rest.is_some_and(|rest| !rest.is_empty() && !rest.chars().any(char::is_whitespace))
}

fn kind_for_url(url: &str) -> ContactKind {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    match host {
        "github.com" => ContactKind::Github,
        "gitlab.com" => ContactKind::Gitlab,
        "twitter.com" | "x.com" => ContactKind::Twitter,
        "linkedin.com" => ContactKind::Linkedin,
        _ if host.contains("mastodon") || path.starts_with('@') => ContactKind::Mastodon,
        _ => ContactKind::Website,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("yaml")
    }

    #[test]
    fn bare_strings_infer_kind_from_host() {
        let cases = [
            ("https://github.com/octocat", ContactKind::Github),
            ("https://www.linkedin.com/in/jane", ContactKind::Linkedin),
            ("https://x.com/jane", ContactKind::Twitter),
            ("https://fosstodon.org/@jane", ContactKind::Mastodon),
            ("https://jane.dev", ContactKind::Website),
        ];
        for (raw, kind) in cases {
            let normalized = normalize_contact(&Value::String(raw.into())).expect(raw);
            assert_eq!(normalized.kind, kind, "{raw}");
            assert_eq!(normalized.value, raw);
        }
    }

    #[test]
    fn email_addresses_gain_mailto_prefix() {
        let normalized = normalize_contact(&Value::String("jane@example.org".into()))
            .expect("email");
        assert_eq!(
            normalized,
            Contact {
                kind: ContactKind::Email,
                value: "mailto:jane@example.org".into(),
            }
        );
    }

    #[test]
    fn single_key_mappings_expand_handles() {
        assert_eq!(
            normalize_contact(&yaml("github: '@octocat'")).expect("github"),
            Contact {
                kind: ContactKind::Github,
                value: "https://github.com/octocat".into(),
            }
        );
        assert_eq!(
            normalize_contact(&yaml("mastodon: '@jane@hachyderm.io'")).expect("mastodon"),
            Contact {
                kind: ContactKind::Mastodon,
                value: "https://hachyderm.io/@jane".into(),
            }
        );
    }

    #[test]
    fn malformed_entries_report_specific_errors() {
        assert_eq!(
            normalize_contact(&yaml("{github: a, gitlab: b}")),
            Err(ContactError::KeyCount(2))
        );
        assert!(matches!(
            normalize_contact(&yaml("myspace: tom")),
            Err(ContactError::UnknownKind { ref key, .. }) if key == "myspace"
        ));
        assert_eq!(
            normalize_contact(&yaml("website: jane.dev")),
            Err(ContactError::WebsiteUrl)
        );
        assert_eq!(
            normalize_contact(&yaml("github: ''")),
            Err(ContactError::EmptyValue("github"))
        );
        assert_eq!(
            normalize_contact(&Value::String("just words".into())),
            Err(ContactError::Unrecognized)
        );
        assert_eq!(normalize_contact(&yaml("42")), Err(ContactError::Unrecognized));
    }
}
