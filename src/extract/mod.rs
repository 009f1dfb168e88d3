//! Pulling URLs out of fetched documents.
//!
//! - [`html`] finds the feed URL on an HTML directory page
//! - [`plist`] finds the Goto target in a property-list redirect document
//!
//! Both read incrementally and stop at the first hit. Neither reports "not
//! found" as an [`Error`](crate::Error) directly; they return
//! `ExtractError::EndOfInput` and leave the translation to the resolver.

pub(crate) mod html;
pub(crate) mod plist;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

/// Expands XML and HTML character references (`&amp;`, `&#38;`, `&nbsp;`).
///
/// Input with an unknown or unterminated reference is returned unchanged.
pub(crate) fn unescape_markup(raw: &str) -> Cow<'_, str> {
    match unescape_with(raw, resolve_html5_entity) {
        Ok(unescaped) => unescaped,
        Err(e) => {
            tracing::trace!(error = %e, value = raw, "Leaving value with bad entity as-is");
            Cow::Borrowed(raw)
        }
    }
}
