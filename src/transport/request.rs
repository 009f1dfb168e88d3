use reqwest::blocking::Request;
use reqwest::header::{HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use reqwest::Method;
use thiserror::Error;
use url::Url;

/// User agent sent with every request. Directory pages only serve the
/// feed button (and the Goto documents) to iTunes clients.
pub const USER_AGENT: &str = "iTunes/10.1";

/// Reasons a target URL cannot be requested.
///
/// Messages carry only the innermost cause, e.g. `empty host` rather than
/// `parse "https://": empty host`.
#[derive(Debug, Error)]
pub(crate) enum RequestError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),
    #[error("unsupported protocol scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
}

/// Builds the GET request for a directory page or Goto target.
///
/// The request has no body and a single `User-Agent` header.
///
/// # Errors
///
/// Returns [`Error::BadRequest`](crate::Error::BadRequest) if the URL does not
/// parse, uses a scheme other than http(s), or contains a bad `%` escape.
pub fn new_request(url: &str) -> Result<Request, crate::Error> {
    let url = parse_target(url).map_err(|e| crate::Error::BadRequest(e.to_string()))?;

    let mut request = Request::new(Method::GET, url);
    request
        .headers_mut()
        .insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));

    Ok(request)
}

fn parse_target(raw: &str) -> Result<Url, RequestError> {
    // The url crate silently re-encodes stray '%' characters
    check_escapes(raw)?;

    let url = Url::parse(raw)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RequestError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Rejects a `%` that is not followed by two hex digits anywhere but the
/// query, which is sent as written.
fn check_escapes(raw: &str) -> Result<(), RequestError> {
    let (rest, fragment) = raw.split_once('#').unwrap_or((raw, ""));
    let before_query = rest.split_once('?').map_or(rest, |(head, _)| head);

    check_part(before_query)?;
    check_part(fragment)
}

fn check_part(raw: &str) -> Result<(), RequestError> {
    let bytes = raw.as_bytes();

    for (i, _) in raw.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));

        if !valid {
            let end = (i + 3).min(raw.len());
            let bad = raw
                .get(i..end)
                .map_or_else(|| raw[i..].chars().take(3).collect(), str::to_owned);
            return Err(RequestError::InvalidEscape(bad));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bad_request_reason(url: &str) -> String {
        match new_request(url) {
            Err(crate::Error::BadRequest(reason)) => reason,
            other => panic!("expected BadRequest for {url:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_request_shape() {
        let request = new_request("https://itunes.apple.com/podcast/id123456789").unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://itunes.apple.com/podcast/id123456789"
        );
        assert_eq!(
            request.headers().get(USER_AGENT_HEADER).unwrap(),
            "iTunes/10.1"
        );
        assert_eq!(request.headers().len(), 1);
        assert!(request.body().is_none());
    }

    #[test]
    fn test_valid_escapes_accepted() {
        let request = new_request("http://example.com/search?q=a%20b%2F").unwrap();
        assert_eq!(request.url().query(), Some("q=a%20b%2F"));
    }

    #[test]
    fn test_query_is_not_checked_for_escapes() {
        let request = new_request("http://itunes.test/search?term=100%").unwrap();
        assert_eq!(request.url().query(), Some("term=100%"));

        let request = new_request("http://itunes.test/search?term=50%off#top").unwrap();
        assert_eq!(request.url().query(), Some("term=50%off"));
    }

    #[test]
    fn test_escapes_checked_around_query() {
        assert_eq!(
            bad_request_reason("http://example.com/%zz?term=100%"),
            "invalid URL escape \"%zz\""
        );
        assert_eq!(
            bad_request_reason("http://example.com/search?term=100%#frag%g1"),
            "invalid URL escape \"%g1\""
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(bad_request_reason(""), "relative URL without a base");
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(bad_request_reason("https://"), "empty host");
    }

    #[test]
    fn test_missing_scheme() {
        assert_eq!(
            bad_request_reason("://itunes.apple.com/podcasts/123456789"),
            "relative URL without a base"
        );
        assert_eq!(
            bad_request_reason("1ttps://itunes.apple.com/podcasts/123456789"),
            "relative URL without a base"
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        assert_eq!(
            bad_request_reason("ftp://itunes.apple.com/podcasts/123456789"),
            "unsupported protocol scheme \"ftp\""
        );
    }

    #[test]
    fn test_invalid_escape() {
        assert_eq!(
            bad_request_reason("http://itunes.apple.com/podcasts/123456789#bad%%20escaping"),
            "invalid URL escape \"%%2\""
        );
        assert_eq!(
            bad_request_reason("http://example.com/%zz"),
            "invalid URL escape \"%zz\""
        );
        assert_eq!(
            bad_request_reason("http://example.com/trailing%"),
            "invalid URL escape \"%\""
        );
    }
}
