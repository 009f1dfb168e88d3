//! Content-Type parsing.
//!
//! Only the media type decides how a response is handled, but the whole
//! header must be well formed: a garbled parameter list is reported the
//! same way as a garbled media type.
use thiserror::Error;

/// Why a Content-Type value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("mime: no media type")]
    NoMediaType,
    #[error("mime: expected slash after first token")]
    ExpectedSlash,
    #[error("mime: expected token after slash")]
    ExpectedSubtype,
    #[error("mime: unexpected content after media subtype")]
    TrailingContent,
    #[error("mime: invalid media parameter")]
    InvalidParameter,
    #[error("mime: duplicate parameter name")]
    DuplicateParameter,
}

/// A parsed Content-Type value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    /// The lowercased `type/subtype` with parameters stripped.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// Looks up a parameter by (case-insensitive) name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Parses a raw Content-Type header value such as `text/html; charset=utf-8`.
pub fn parse_media_type(raw: &str) -> Result<MediaType, MediaTypeError> {
    let base = raw.split(';').next().unwrap_or_default();
    let essence = base.trim().to_ascii_lowercase();
    check_essence(&essence)?;

    let mut params: Vec<(String, String)> = Vec::new();
    let mut rest = &raw[base.len()..];

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        match consume_param(rest) {
            Some((name, value, remainder)) => {
                if params.iter().any(|(key, _)| *key == name) {
                    return Err(MediaTypeError::DuplicateParameter);
                }
                params.push((name, value));
                rest = remainder;
            }
            // A lone trailing semicolon is tolerated
            None if rest.trim() == ";" => break,
            None => return Err(MediaTypeError::InvalidParameter),
        }
    }

    Ok(MediaType { essence, params })
}

/// Validates `type` or `type/subtype`.
fn check_essence(s: &str) -> Result<(), MediaTypeError> {
    let (kind, rest) = consume_token(s);
    if kind.is_empty() {
        return Err(MediaTypeError::NoMediaType);
    }
    if rest.is_empty() {
        return Ok(());
    }

    let Some(rest) = rest.strip_prefix('/') else {
        return Err(MediaTypeError::ExpectedSlash);
    };

    let (subtype, rest) = consume_token(rest);
    if subtype.is_empty() {
        return Err(MediaTypeError::ExpectedSubtype);
    }
    if !rest.is_empty() {
        return Err(MediaTypeError::TrailingContent);
    }

    Ok(())
}

/// Parses one `; name=value` pair, returning the lowercased name, the value
/// and whatever follows it.
fn consume_param(s: &str) -> Option<(String, String, &str)> {
    let rest = s.trim_start().strip_prefix(';')?.trim_start();

    let (name, rest) = consume_token(rest);
    if name.is_empty() {
        return None;
    }

    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let (value, remainder) = consume_value(rest)?;

    Some((name.to_ascii_lowercase(), value, remainder))
}

/// A parameter value is either a token or a quoted string.
fn consume_value(s: &str) -> Option<(String, &str)> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        return (!token.is_empty()).then(|| (token.to_owned(), rest));
    };

    let mut value = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &quoted[i + 1..])),
            '\\' => value.push(chars.next()?.1),
            '\r' | '\n' => return None,
            _ => value.push(c),
        }
    }

    // Unterminated
    None
}

fn consume_token(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|&(_, c)| !is_token_char(c))
        .map_or(s.len(), |(i, _)| i);
    s.split_at(end)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}
