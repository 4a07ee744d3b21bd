//! Owner name handling relative to `$ORIGIN` and the zone being imported into.

use crate::error::Error;
use trust_dns_proto::rr::Name;

/// The zone origin for a domain, lowercased and fully qualified: `Example.com` becomes
/// `example.com.`.
///
/// # Errors
///
/// Returns [`Error::DNSError`] if `domain` isn't a valid domain name, and
/// [`Error::InvalidOrigin`] for the root domain.
pub fn zone_origin(domain: &str) -> Result<String, Error> {
    let name = if domain.ends_with('.') {
        Name::from_ascii(domain)?
    } else {
        Name::from_ascii(format!("{domain}."))?
    };
    if name.is_root() {
        return Err(Error::InvalidOrigin(domain.to_string()));
    }
    Ok(name.to_lowercase().to_string())
}

/// Resolve `domain` against the current `$ORIGIN`, then make it relative to `zone_origin`.
///
/// Names outside of the zone stay absolute.
#[must_use]
pub fn normalize_origin(domain: &str, current_origin: &str, zone_origin: &str) -> String {
    relative(&concat(domain, current_origin), zone_origin)
}

/// Make a domain absolute by appending the origin, unless it already is.
#[must_use]
pub fn concat(domain: &str, origin: &str) -> String {
    if domain.ends_with('.') {
        return domain.to_string();
    }
    if domain == "@" {
        return origin.to_string();
    }
    format!("{domain}.{origin}")
}

/// Make an absolute domain relative to `origin` again.
///
/// ```text
/// "xyz.foo.bar.baz.", "bar.baz." -> "xyz.foo"
/// "bar.baz.",         "bar.baz." -> "@"
/// "abc.xyz.",         "bar.baz." -> "abc.xyz."
/// ```
#[must_use]
pub fn relative(domain: &str, origin: &str) -> String {
    if domain == origin {
        return "@".to_string();
    }
    match domain.strip_suffix(origin) {
        Some(sub) if sub.ends_with('.') => sub[..sub.len() - 1].to_string(),
        _ => domain.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(normalize_origin("bar.baz.", "bar.baz.", "bar.baz."), "@");
        assert_eq!(
            normalize_origin("xyz.foo.bar.baz.", "bar.baz.", "bar.baz."),
            "xyz.foo"
        );
        assert_eq!(normalize_origin("abc.xyz.", "bar.baz.", "other."), "abc.xyz.");
        assert_eq!(normalize_origin("@", "bar.baz.", "bar.baz."), "@");
        assert_eq!(normalize_origin("www", "bar.baz.", "bar.baz."), "www");
        assert_eq!(normalize_origin("www", "sub.bar.baz.", "bar.baz."), "www.sub");
        assert_eq!(normalize_origin("@", "other.", "bar.baz."), "other.");
    }

    #[test]
    fn relative_requires_label_boundary() {
        assert_eq!(relative("foobar.baz.", "bar.baz."), "foobar.baz.");
        assert_eq!(relative(".bar.baz.", "bar.baz."), "");
    }

    #[test]
    fn origin_from_domain() {
        assert_eq!(zone_origin("Example.COM").unwrap(), "example.com.");
        assert_eq!(zone_origin("example.com.").unwrap(), "example.com.");
        assert!(matches!(zone_origin("."), Err(Error::InvalidOrigin(_))));
        assert!(matches!(zone_origin(""), Err(Error::InvalidOrigin(_))));
    }
}
