use crate::config::ClientConfig;
use crate::extract::{html, plist};
use crate::media_type::parse_media_type;
use crate::transport::{fetch, HttpTransport, Transport};
use crate::Error;

/// Maximum number of Goto documents followed before giving up.
pub const MAX_REDIRECTS: u32 = 3;

/// Returns the RSS feed behind a podcast directory page, using a default
/// [`HttpTransport`].
///
/// See [`resolve_with_transport`] for the resolution rules.
///
/// # Errors
///
/// As [`resolve_with_transport`]. A failure to build the HTTP client is
/// reported as [`Error::Fetch`].
pub fn resolve(url: &str) -> Result<String, Error> {
    let transport =
        HttpTransport::new(&ClientConfig::default()).map_err(|e| Error::Fetch(e.to_string()))?;
    resolve_with_transport(&transport, url)
}

/// Returns the RSS feed behind a podcast directory page.
///
/// Each hop fetches a URL and dispatches on the response's media type:
///
/// - `text/html`: the page's `<button feed-url="...">` is the answer
/// - `text/xml`, `application/xml`: the body is a Goto document naming the
///   next URL to fetch, followed at most [`MAX_REDIRECTS`] times
/// - anything else is rejected
///
/// Every response body is dropped before the next hop starts or the call
/// returns.
///
/// # Errors
///
/// - [`Error::BadRequest`], [`Error::Fetch`], [`Error::BadHttpStatus`] from
///   fetching any hop
/// - [`Error::BadContentType`] / [`Error::UnexpectedContentType`] for a
///   response that is not HTML or XML
/// - [`Error::TooManyRedirects`] once a fourth Goto document is found, which
///   also stops redirect cycles
/// - [`Error::NoFeed`] if any document in the chain lacks what it should
///   contain
/// - [`Error::Read`] if a body fails part way through
pub fn resolve_with_transport<T>(transport: &T, url: &str) -> Result<String, Error>
where
    T: Transport + ?Sized,
{
    let mut target = url.to_owned();
    let mut redirects: u32 = 0;

    loop {
        tracing::debug!(url = %target, redirects, "Fetching directory page");
        let response = fetch(transport, &target)?;

        let content_type = response.content_type.as_deref().unwrap_or_default();
        let media_type = parse_media_type(content_type).map_err(|cause| Error::BadContentType {
            content_type: content_type.to_owned(),
            cause,
        })?;

        match media_type.essence() {
            "text/html" => {
                let feed = html::find_feed_url(response.body)?;
                tracing::debug!(feed = %feed, redirects, "Found feed URL");
                return Ok(feed);
            }
            "text/xml" | "application/xml" => {
                let next = plist::find_redirect(response.body)?;

                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    tracing::warn!(
                        url = %target,
                        next = %next,
                        max = MAX_REDIRECTS,
                        "Too many Goto redirects"
                    );
                    return Err(Error::TooManyRedirects);
                }

                tracing::debug!(from = %target, to = %next, redirects, "Following Goto redirect");
                target = next;
            }
            _ => return Err(Error::UnexpectedContentType(content_type.to_owned())),
        }
    }
}
