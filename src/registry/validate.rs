//! Host address and alias validation

use std::net::Ipv4Addr;
use std::sync::OnceLock;

use regex::Regex;

const MAX_DOMAIN_LEN: usize = 253;

fn domain_regex() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        Regex::new(
            r"^(?:[A-Za-z0-9](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9][A-Za-z0-9_-]{0,61}[A-Za-z]\.?$",
        )
        .expect("domain pattern is valid")
    })
}

/// Accepts a fully qualified domain name, an IPv4 literal, or `localhost`.
pub fn validate_host_address(value: &str) -> bool {
    if value == "localhost" {
        return true;
    }
    if value.parse::<Ipv4Addr>().is_ok() {
        return true;
    }
    value.len() <= MAX_DOMAIN_LEN && domain_regex().is_match(value)
}

/// An alias must fit on a `Host` line as a single pattern: no whitespace,
/// control characters, quotes or comment markers.
pub fn validate_alias(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '#' || c == '"')
}
