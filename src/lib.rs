//! Find the RSS feed behind a podcast directory page.
//!
//! Podcast directory pages (iTunes/Apple Podcasts listings) link to a show's
//! feed but are not the feed. When requested with an iTunes user agent they
//! come back in one of two shapes:
//!
//! - an HTML page whose subscribe button carries the feed in a `feed-url`
//!   attribute, or
//! - a small property-list document whose `Goto` action names another URL
//!   to request instead.
//!
//! [`resolve`] follows Goto documents (at most [`MAX_REDIRECTS`] of them)
//! until an HTML page yields the feed URL.
//!
//! ```no_run
//! let feed = podfeed::resolve("https://itunes.apple.com/podcast/id1234567890")?;
//! println!("{feed}");
//! # Ok::<(), podfeed::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`transport`] - request building, the [`Transport`] capability and the
//!   default reqwest-backed [`HttpTransport`]
//! - [`media_type`] - Content-Type parsing used to dispatch each response
//! - `extract` - the HTML and Goto document scanners
//! - [`config`] - settings for the default transport
//!
//! Calls are synchronous and hold no state between them. Supply your own
//! [`Transport`] to [`resolve_with_transport`] to control timeouts, proxies,
//! or to serve canned responses in tests.

pub mod config;
mod error;
mod extract;
pub mod media_type;
mod resolver;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::Error;
pub use media_type::{parse_media_type, MediaType, MediaTypeError};
pub use resolver::{resolve, resolve_with_transport, MAX_REDIRECTS};
pub use transport::{
    fetch, new_request, transport_fn, FetchedResponse, FnTransport, HttpTransport, Transport,
    TransportError, USER_AGENT,
};
