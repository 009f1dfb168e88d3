use crate::media_type::MediaTypeError;
use thiserror::Error;

/// Errors returned by [`resolve`](crate::resolve) and
/// [`resolve_with_transport`](crate::resolve_with_transport).
///
/// The first failure anywhere in a redirect chain ends the resolution;
/// nothing is retried or suppressed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The target URL could not be turned into a request. Holds the
    /// innermost parser message with no wrapping.
    #[error("{0}")]
    BadRequest(String),

    /// The transport failed to execute the request (DNS, connection, TLS...).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The server answered with something other than 200 OK.
    #[error("bad HTTP Status: {code} {reason}")]
    BadHttpStatus { code: u16, reason: String },

    /// The Content-Type header is not a parsable media type.
    #[error("bad Content Type {content_type:?}: {cause}")]
    BadContentType {
        content_type: String,
        cause: MediaTypeError,
    },

    /// The Content-Type parsed, but it is neither HTML nor XML.
    #[error("unexpected Content Type {0:?}")]
    UnexpectedContentType(String),

    /// More than [`MAX_REDIRECTS`](crate::MAX_REDIRECTS) Goto documents
    /// were followed. Also the outcome of a redirect cycle.
    #[error("too many redirects")]
    TooManyRedirects,

    /// No feed URL was found in the page, or in any document it pointed to.
    ///
    /// This usually means the page is not a podcast page (an app page,
    /// an iTunes U course, a podcast with no episodes...).
    #[error("no feed found")]
    NoFeed,

    /// Reading the response body failed part way through.
    #[error("read error: {0}")]
    Read(#[source] std::io::Error),
}

impl Error {
    /// Returns `true` if the chain ended without finding a feed.
    pub fn is_no_feed(&self) -> bool {
        matches!(self, Error::NoFeed)
    }
}

/// Internal outcome of an extractor that did not produce a URL.
///
/// `EndOfInput` is control flow, not a failure callers should see: it is
/// turned into [`Error::NoFeed`] by the orchestrator and nowhere else.
#[derive(Debug)]
pub(crate) enum ExtractError {
    /// The document ended without the pattern being found.
    EndOfInput,
    /// The body reader failed.
    Read(std::io::Error),
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Read(err)
    }
}

impl From<ExtractError> for Error {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::EndOfInput => Error::NoFeed,
            ExtractError::Read(e) => Error::Read(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_end_of_input_becomes_no_feed() {
        let err: Error = ExtractError::EndOfInput.into();
        assert!(err.is_no_feed());
        assert_eq!(err.to_string(), "no feed found");
    }

    #[test]
    fn test_read_error_is_not_no_feed() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer hung up");
        let err: Error = ExtractError::from(io).into();
        assert!(!err.is_no_feed());
        assert_eq!(err.to_string(), "read error: peer hung up");
    }

    #[test]
    fn test_message_forms() {
        assert_eq!(
            Error::BadRequest("relative URL without a base".into()).to_string(),
            "relative URL without a base"
        );
        assert_eq!(
            Error::Fetch("connection refused".into()).to_string(),
            "fetch error: connection refused"
        );
        assert_eq!(
            Error::BadHttpStatus {
                code: 404,
                reason: "Not Found".into()
            }
            .to_string(),
            "bad HTTP Status: 404 Not Found"
        );
        assert_eq!(
            Error::BadContentType {
                content_type: "text/".into(),
                cause: MediaTypeError::ExpectedSubtype,
            }
            .to_string(),
            "bad Content Type \"text/\": mime: expected token after slash"
        );
        assert_eq!(
            Error::UnexpectedContentType("image/png".into()).to_string(),
            "unexpected Content Type \"image/png\""
        );
        assert_eq!(Error::TooManyRedirects.to_string(), "too many redirects");
    }
}
