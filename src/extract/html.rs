use crate::error::ExtractError;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::io::{self, Read};

const BUTTON_TAG: &str = "button";
const FEED_URL_ATTR: &str = "feed-url";

/// Bytes handed to the tokenizer per read.
const CHUNK_SIZE: usize = 8 * 1024;

/// Scans an HTML page for `<button feed-url="...">` and returns the first
/// non-empty `feed-url` value.
///
/// The page is run through an HTML5 tokenizer as it is read, and reading
/// stops after the chunk holding the first match. Script, style and other
/// raw-text elements are not scanned for tags. Malformed markup never stops
/// the scan; only the end of the body does.
pub(crate) fn find_feed_url<R: Read>(mut body: R) -> Result<String, ExtractError> {
    let mut tokenizer = Tokenizer::new(FeedButtonSink::default(), TokenizerOpts::default());
    let mut queue = BufferQueue::default();
    let mut decoder = Utf8Decoder::default();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut total = 0;

    loop {
        let n = match body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractError::Read(e)),
        };

        total += n;
        queue.push_back(decoder.decode(&chunk[..n]));
        let _ = tokenizer.feed(&mut queue);

        if let Some(url) = tokenizer.sink.feed_url.take() {
            return Ok(url);
        }
    }

    if let Some(rest) = decoder.finish() {
        queue.push_back(rest);
        let _ = tokenizer.feed(&mut queue);
    }
    tokenizer.end();

    let feed_url = tokenizer.sink.feed_url.take();
    if feed_url.is_none() {
        tracing::debug!(bytes = total, "Page has no feed button");
    }
    feed_url.ok_or(ExtractError::EndOfInput)
}

/// Watches start tags for the feed button and switches the tokenizer into
/// raw-text mode where a tree builder would.
#[derive(Default)]
struct FeedButtonSink {
    feed_url: Option<String>,
}

impl TokenSink for FeedButtonSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(tag) = token else {
            return TokenSinkResult::Continue;
        };

        // `<button/>` is not a start tag
        if tag.kind != TagKind::StartTag || tag.self_closing {
            return TokenSinkResult::Continue;
        }

        if self.feed_url.is_none() && &*tag.name == BUTTON_TAG {
            self.feed_url = feed_url_attribute(&tag);
        }

        text_mode(&tag.name)
    }
}

/// Names are lowercased and values entity-decoded by the tokenizer.
fn feed_url_attribute(tag: &Tag) -> Option<String> {
    tag.attrs
        .iter()
        .find(|attr| &*attr.name.local == FEED_URL_ATTR && !attr.value.is_empty())
        .map(|attr| attr.value.to_string())
}

/// Content of these elements is text, not markup.
fn text_mode(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

/// Turns body chunks into text, holding back a multi-byte character split
/// across reads. Invalid bytes become U+FFFD.
#[derive(Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> StrTendril {
        self.pending.extend_from_slice(bytes);

        let mut text = StrTendril::new();
        let mut held = 0;
        let mut chunks = self.pending.utf8_chunks().peekable();

        while let Some(chunk) = chunks.next() {
            text.push_slice(chunk.valid());

            let invalid = chunk.invalid();
            if invalid.is_empty() {
                continue;
            }
            if chunks.peek().is_none() {
                // Possibly the start of a character the next read completes
                held = invalid.len();
            } else {
                text.push_char(char::REPLACEMENT_CHARACTER);
            }
        }

        let consumed = self.pending.len() - held;
        self.pending.drain(..consumed);
        text
    }

    fn finish(self) -> Option<StrTendril> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending);
        Some(StrTendril::from_slice(&text))
    }
}
