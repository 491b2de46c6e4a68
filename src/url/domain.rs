use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_vis::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the `(host, port)` pair a TCP connection to this URL would target
///
/// The port falls back to the scheme's well-known port. IPv6 hosts are
/// returned without brackets so the pair can be handed to a socket connect.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_vis::url::socket_address;
///
/// let url = Url::parse("http://example.com/page").unwrap();
/// assert_eq!(socket_address(&url), Some(("example.com".to_string(), 80)));
/// ```
pub fn socket_address(url: &Url) -> Option<(String, u16)> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Some((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_hostless() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(extract_domain(&url), None);
    }

    #[test]
    fn test_socket_address_default_ports() {
        let http = Url::parse("http://example.com/").unwrap();
        let https = Url::parse("https://example.com/").unwrap();
        assert_eq!(socket_address(&http), Some(("example.com".to_string(), 80)));
        assert_eq!(socket_address(&https), Some(("example.com".to_string(), 443)));
    }

    #[test]
    fn test_socket_address_explicit_port() {
        let url = Url::parse("http://127.0.0.1:3000/x").unwrap();
        assert_eq!(socket_address(&url), Some(("127.0.0.1".to_string(), 3000)));
    }

    #[test]
    fn test_socket_address_ipv6() {
        let url = Url::parse("http://[::1]:8080/").unwrap();
        assert_eq!(socket_address(&url), Some(("::1".to_string(), 8080)));
    }

    #[test]
    fn test_socket_address_unknown_scheme_without_port() {
        let url = Url::parse("gopher2://example.com/").unwrap();
        assert_eq!(socket_address(&url), None);
    }
}
