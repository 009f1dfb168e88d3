//! Fetching directory pages.
//!
//! The resolver never talks to the network directly. It builds a request with
//! [`new_request`] and hands it to a [`Transport`], which may be the default
//! [`HttpTransport`], a plain `reqwest::blocking::Client`, or a test double
//! wrapping a closure via [`transport_fn`].

mod http;
mod request;
#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpTransport;
pub use request::{new_request, USER_AGENT};

use crate::Error;
use reqwest::blocking::Request;
use reqwest::StatusCode;
use std::fmt;
use std::io::Read;

/// Error type returned by a [`Transport`]. Its message is reported verbatim
/// inside [`Error::Fetch`].
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Executes HTTP requests on behalf of the resolver.
///
/// Implementations must not follow HTTP redirects themselves; the status of
/// the first response is what the resolver checks.
pub trait Transport {
    fn execute(&self, request: Request) -> Result<FetchedResponse, TransportError>;
}

/// A response handed back by a [`Transport`].
///
/// The body is an owned reader. Dropping the response releases it, so every
/// early return in the resolver closes the body.
pub struct FetchedResponse {
    /// HTTP status of the response
    pub status: StatusCode,
    /// Raw `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
    /// Response body, read incrementally by the extractors
    pub body: Box<dyn Read + Send>,
}

impl FetchedResponse {
    pub fn new(
        status: StatusCode,
        content_type: Option<String>,
        body: impl Read + Send + 'static,
    ) -> Self {
        Self {
            status,
            content_type,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for FetchedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A [`Transport`] backed by a closure. See [`transport_fn`].
pub struct FnTransport<F>(F);

/// Wraps a closure as a [`Transport`], e.g. to serve canned responses in tests.
///
/// ```
/// use podfeed::{transport_fn, FetchedResponse};
/// use reqwest::StatusCode;
///
/// let transport = transport_fn(|_request| {
///     let page = r#"<button feed-url="https://example.com/feed.rss">Subscribe</button>"#;
///     Ok(FetchedResponse::new(StatusCode::OK, Some("text/html".into()), page.as_bytes()))
/// });
/// let feed = podfeed::resolve_with_transport(&transport, "https://example.com/podcast").unwrap();
/// assert_eq!(feed, "https://example.com/feed.rss");
/// ```
pub fn transport_fn<F>(f: F) -> FnTransport<F>
where
    F: Fn(Request) -> Result<FetchedResponse, TransportError>,
{
    FnTransport(f)
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(Request) -> Result<FetchedResponse, TransportError>,
{
    fn execute(&self, request: Request) -> Result<FetchedResponse, TransportError> {
        (self.0)(request)
    }
}

/// Requests `url` and returns the response if the server answered 200 OK.
///
/// # Errors
///
/// - [`Error::BadRequest`] if no request can be built for `url`
/// - [`Error::Fetch`] if the transport fails
/// - [`Error::BadHttpStatus`] for any status other than 200; the body is
///   released before returning
pub fn fetch<T>(transport: &T, url: &str) -> Result<FetchedResponse, Error>
where
    T: Transport + ?Sized,
{
    let request = new_request(url)?;

    let response = transport
        .execute(request)
        .map_err(|e| Error::Fetch(e.to_string()))?;

    if response.status != StatusCode::OK {
        let status = response.status;
        drop(response);
        return Err(Error::BadHttpStatus {
            code: status.as_u16(),
            reason: status_text(status),
        });
    }

    Ok(response)
}

/// Standard reason phrase, or `status code <n>` for unregistered codes
/// (which repeats the number: `600 status code 600`).
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("status code {}", status.as_u16()), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::TrackedBody;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io;
    use std::sync::atomic::Ordering;

    fn status_transport(code: u16) -> impl Transport {
        transport_fn(move |_| {
            let status = StatusCode::from_u16(code)?;
            Ok(FetchedResponse::new(status, None, io::empty()))
        })
    }

    #[test]
    fn test_transport_error_is_reported_verbatim() {
        let messages = [
            "it was nearly eleven when I started to return",
            "the night was unexpectedly dark",
        ];

        for message in messages {
            let transport = transport_fn(move |_| Err(message.into()));
            let err = fetch(&transport, "http://example.com/").unwrap_err();
            assert!(matches!(&err, Error::Fetch(cause) if cause == message));
            assert_eq!(err.to_string(), format!("fetch error: {message}"));
        }
    }

    #[test]
    fn test_bad_url_never_reaches_transport() {
        let transport = transport_fn(|_| panic!("transport must not be called"));
        let err = fetch(&transport, "").unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_known_status_codes() {
        let cases = [
            (403, "Forbidden"),
            (404, "Not Found"),
            (410, "Gone"),
            (418, "I'm a teapot"),
            (500, "Internal Server Error"),
            (502, "Bad Gateway"),
        ];

        for (code, reason) in cases {
            let err = fetch(&status_transport(code), "http://example.com/").unwrap_err();
            assert_eq!(err.to_string(), format!("bad HTTP Status: {code} {reason}"));
        }
    }

    #[test]
    fn test_unknown_status_codes_embed_the_code() {
        for code in [420, 444, 600] {
            let err = fetch(&status_transport(code), "http://example.com/").unwrap_err();
            match err {
                Error::BadHttpStatus { code: got, reason } => {
                    assert_eq!(got, code);
                    assert_eq!(reason, format!("status code {code}"));
                }
                other => panic!("expected BadHttpStatus, got {other:?}"),
            }
        }

        let err = fetch(&status_transport(600), "http://example.com/").unwrap_err();
        assert_eq!(err.to_string(), "bad HTTP Status: 600 status code 600");
    }

    #[test]
    fn test_non_ok_success_status_is_rejected() {
        let err = fetch(&status_transport(204), "http://example.com/").unwrap_err();
        assert_eq!(err.to_string(), "bad HTTP Status: 204 No Content");
    }

    #[test]
    fn test_body_released_on_bad_status() {
        let flags = RefCell::new(Vec::new());
        let transport = transport_fn(|_| {
            let (body, dropped) = TrackedBody::new(&b"404 page not found"[..]);
            flags.borrow_mut().push(dropped);
            Ok(FetchedResponse::new(StatusCode::NOT_FOUND, None, body))
        });

        assert!(fetch(&transport, "http://example.com/").is_err());

        let flags = flags.borrow();
        assert_eq!(flags.len(), 1);
        assert!(flags[0].load(Ordering::SeqCst));
    }

    #[test]
    fn test_ok_response_is_returned_open() {
        let transport = transport_fn(|request| {
            assert_eq!(request.url().as_str(), "http://example.com/page");
            Ok(FetchedResponse::new(
                StatusCode::OK,
                Some("text/html".into()),
                &b"<html></html>"[..],
            ))
        });

        let mut response = fetch(&transport, "http://example.com/page").unwrap();
        assert_eq!(response.content_type.as_deref(), Some("text/html"));

        let mut body = String::new();
        response.body.read_to_string(&mut body).unwrap();
        assert_eq!(body, "<html></html>");
    }
}
