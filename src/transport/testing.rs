//! Test doubles shared by the unit tests.

use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Response body that records when it is dropped.
pub(crate) struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    dropped: Arc<AtomicBool>,
}

impl TrackedBody {
    /// Returns the body along with a flag that turns true once it is dropped.
    pub(crate) fn new(content: impl Into<Vec<u8>>) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let body = Self {
            inner: Cursor::new(content.into()),
            dropped: Arc::clone(&dropped),
        };
        (body, dropped)
    }
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
