use super::unescape_markup;
use crate::error::ExtractError;
use regex::bytes::Regex;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::LazyLock;

/// Line announcing that the next line holds the redirect target.
const GOTO_MARKER: &[u8] = b"<key>kind</key><string>Goto</string>";

/// Matches `<key>url</key><string>https://...</string>`
#[allow(clippy::expect_used)]
static GOTO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<key>url</key><string>(\S+)</string>$").expect("Goto URL regex is valid")
});

/// Finds the Goto target in a property-list redirect document.
///
/// The document is read line by line. A line exactly equal to
/// [`GOTO_MARKER`] must be followed by a `<key>url</key><string>...</string>`
/// line; the URL is entity-unescaped (`&amp;` → `&`) and returned. When the
/// line after a marker does not match, scanning resumes after it.
pub(crate) fn find_redirect<R: Read>(body: R) -> Result<String, ExtractError> {
    let mut lines = LineReader::new(BufReader::new(body));

    while let Some(line) = lines.next_line()? {
        if line != GOTO_MARKER {
            continue;
        }

        let Some(line) = lines.next_line()? else {
            break;
        };

        let Some(captures) = GOTO_URL.captures(line) else {
            continue;
        };

        // e.g. viewPodcast?urlDesc=&amp;id=1234567890 -> viewPodcast?urlDesc=&id=1234567890
        let raw = String::from_utf8_lossy(&captures[1]);
        return Ok(unescape_markup(&raw).into_owned());
    }

    Err(ExtractError::EndOfInput)
}

/// Reads `\n`-terminated lines as bytes, dropping the terminator and a
/// trailing `\r`.
struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }

        let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(Some(line))
    }
}
