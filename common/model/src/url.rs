use serde::Serialize;
use url::Host;

use crate::util::truncate;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Url {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub original: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scheme: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fragment: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub port: u32,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// Stands in for the host when a relative reference has no default hostname to resolve
/// against. It never reaches the returned record.
const PLACEHOLDER_HOST: &str = "placeholder.invalid";

/// Parses `original` into a [`Url`].
///
/// Relative references are resolved against `default_scheme://default_hostname`, with the
/// scheme falling back to `http`. Without a default hostname the record keeps an empty
/// domain and `full` has an empty authority. Input that cannot be parsed yields a record
/// holding only the (truncated) original string.
pub fn parse_url(original: &str, default_hostname: &str, default_scheme: &str) -> Url {
    let original = truncate(original);
    let (parsed, authority) = match url::Url::parse(&original) {
        Ok(parsed) => (Some(parsed), written_authority(&original)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let scheme = if default_scheme.is_empty() {
                "http"
            } else {
                default_scheme
            };
            let host = if default_hostname.is_empty() {
                PLACEHOLDER_HOST
            } else {
                default_hostname
            };
            let parsed = url::Url::parse(&format!("{scheme}://{host}"))
                .and_then(|base| base.join(&original))
                .ok();
            let authority = if original.starts_with("//") {
                written_authority(&original)
            } else {
                default_hostname
            };
            (parsed, authority)
        }
        Err(_) => (None, ""),
    };

    let Some(parsed) = parsed else {
        return Url {
            original,
            ..Default::default()
        };
    };

    let (domain, full) = if parsed.host_str() == Some(PLACEHOLDER_HOST) && authority.is_empty() {
        let full = format!(
            "{}://{}",
            parsed.scheme(),
            &parsed[url::Position::BeforePath..]
        );
        (String::new(), full)
    } else {
        let domain = match parsed.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => String::new(),
        };
        (domain, parsed.as_str().to_string())
    };

    let port = parsed
        .port()
        .or_else(|| explicit_default_port(authority, &parsed))
        .map(u32::from)
        .unwrap_or_default();

    Url {
        scheme: truncate(parsed.scheme()),
        full: truncate(&full),
        domain: truncate(&domain),
        path: truncate(parsed.path()),
        query: truncate(parsed.query().unwrap_or_default()),
        fragment: truncate(parsed.fragment().unwrap_or_default()),
        port,
        original,
    }
}

/// The `host[:port]` part of an absolute or scheme-relative URL as written, without user info.
fn written_authority(original: &str) -> &str {
    let Some(rest) = original
        .split_once("://")
        .map(|(_, rest)| rest)
        .or_else(|| original.strip_prefix("//"))
    else {
        return "";
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host)
}

/// The scheme's default port when `authority` spells it out, which the parser drops.
fn explicit_default_port(authority: &str, parsed: &url::Url) -> Option<u16> {
    let default = parsed.port_or_known_default()?;
    let (_, port) = authority.rsplit_once(':')?;
    if port.contains(']') {
        return None;
    }
    (port.parse::<u16>().ok()? == default).then_some(default)
}
