use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

/// Scheme assumed for inputs written without one (e.g. `example.com/page`)
const DEFAULT_SCHEME_PREFIX: &str = "http://";

/// Upper bound on decode passes before an input is given up on
const MAX_DECODE_PASSES: usize = 8;

/// Normalizes a URL into the canonical form used as a graph node identity
///
/// # Normalization Steps
///
/// 1. Percent-decode the raw string; a `%` not followed by two hex digits
///    makes the input invalid
/// 2. Parse it as a URL
/// 3. If it has no scheme, reparse with `http://` prepended
/// 4. Reject it if there is still no host
/// 5. Rebuild it as `scheme://host[:port]/path`, dropping query and fragment
///
/// Each pass strips one layer of percent-encoding, so the steps are repeated
/// until the result no longer changes. The output is therefore its own
/// canonical form.
///
/// Two inputs that differ only in query string or fragment normalize to the
/// same canonical URL.
///
/// # Arguments
///
/// * `raw` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(String)` - Canonical URL
/// * `Err(UrlError)` - The input is not a usable URL
///
/// # Examples
///
/// ```
/// use link_vis::url::normalize_url;
///
/// assert_eq!(normalize_url("example.com/?x=1").unwrap(), "http://example.com/");
/// assert_eq!(
///     normalize_url("https://Example.com/docs#intro").unwrap(),
///     "https://example.com/docs"
/// );
/// ```
pub fn normalize_url(raw: &str) -> UrlResult<String> {
    let mut current = normalize_once(raw).ok_or_else(|| invalid(raw))?;

    for _ in 1..MAX_DECODE_PASSES {
        let next = normalize_once(&current).ok_or_else(|| invalid(raw))?;
        if next == current {
            return Ok(current);
        }
        current = next;
    }

    Err(invalid(raw))
}

/// One decode-parse-rebuild pass
fn normalize_once(raw: &str) -> Option<String> {
    // Step 1: Percent-decode
    if has_malformed_escape(raw) {
        return None;
    }
    let decoded = urlencoding::decode(raw).ok()?;

    // Step 2 & 3: Parse, assuming http:// when no scheme is present
    let url = match Url::parse(&decoded) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            // A leading slash leaves an empty authority once prefixed
            if decoded.starts_with('/') {
                return None;
            }
            Url::parse(&format!("{}{}", DEFAULT_SCHEME_PREFIX, decoded)).ok()?
        }
        Err(_) => return None,
    };

    // Step 4: Require a host
    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return None,
    };

    // Step 5: Rebuild without query and fragment
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Some(format!(
        "{}://{}{}",
        url.scheme(),
        authority,
        escape_stray_percent(url.path())
    ))
}

/// True if some `%` is not followed by two hex digits
fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

/// Encodes a literal `%` left in a path by decoding as `%25`
fn escape_stray_percent(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut escaped = String::with_capacity(path.len());
    for (i, c) in path.char_indices() {
        let valid_escape = c == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if c == '%' && !valid_escape {
            escaped.push_str("%25");
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn invalid(raw: &str) -> UrlError {
    UrlError::Invalid(raw.to_string())
}
