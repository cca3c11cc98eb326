//! [`Pattern`]s and the rolling [`OutputBuffer`] they are matched against.

use std::fmt;

/// Something the controller can wait for in a build's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A literal substring of the output.
    Literal(String),
    /// The output stream closed: the process has ended.
    Eof,
    /// Nothing matched before the wait deadline.
    Timeout,
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Pattern::Literal(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "{text:?}"),
            Pattern::Eof => f.write_str("<eof>"),
            Pattern::Timeout => f.write_str("<timeout>"),
        }
    }
}

/// Upper bound on retained unmatched output.
const MAX_BUFFER: usize = 10_000;
/// How much to keep when trimming an oversized buffer.
const KEEP_AFTER_TRIM: usize = 5_000;

/// Output that has arrived but has not been consumed by a match yet.
///
/// Bytes are decoded as UTF-8. A multibyte character split across two chunks
/// is held back until the rest of it arrives, so literals spanning a chunk
/// boundary still match.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
    pending: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk of raw output.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + len);
                        }
                    }
                }
            }
        }
        self.trim();
    }

    /// Flush any held-back partial character. Called once the stream ends.
    pub fn finish(&mut self) {
        if !self.pending.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
    }

    /// Find the literal that occurs earliest in the buffer.
    ///
    /// When two literals start at the same offset the one given first wins.
    /// Sentinels are skipped. On a match the buffer is consumed through the
    /// end of the literal and the text before it is returned along with the
    /// index of the winning pattern.
    pub fn take_first_match<'a, I>(&mut self, patterns: I) -> Option<(usize, String)>
    where
        I: IntoIterator<Item = &'a Pattern>,
    {
        let (start, index, end) = patterns
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let Pattern::Literal(lit) = p else {
                    return None;
                };
                self.text.find(lit.as_str()).map(|at| (at, i, at + lit.len()))
            })
            .min_by_key(|&(at, i, _)| (at, i))?;
        let before = self.text[..start].to_string();
        self.text.drain(..end);
        Some((index, before))
    }

    /// Take everything left in the buffer.
    pub fn take_all(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn trim(&mut self) {
        if self.text.len() <= MAX_BUFFER {
            return;
        }
        let mut cut = self.text.len() - KEEP_AFTER_TRIM;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        self.text.drain(..cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earliest_occurrence_wins() {
        let mut buf = OutputBuffer::new();
        buf.push(b"Build failed ... Build finished");
        let patterns = [Pattern::literal("Build finished"), Pattern::literal("Build failed")];
        let (idx, before) = buf.take_first_match(&patterns).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(before, "");
        assert_eq!(buf.as_str(), " ... Build finished");
    }

    #[test]
    fn test_same_start_breaks_tie_by_order() {
        let mut buf = OutputBuffer::new();
        buf.push(b"log: Build failed");
        let patterns = [Pattern::literal("Build"), Pattern::literal("Build failed")];
        let (idx, before) = buf.take_first_match(&patterns).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(before, "log: ");
        assert_eq!(buf.as_str(), " failed");
    }

    #[test]
    fn test_match_consumes_through_pattern() {
        let mut buf = OutputBuffer::new();
        buf.push(b"one\nWaiting for build\nrest");
        let patterns = [Pattern::literal("Waiting for build")];
        let (_, before) = buf.take_first_match(&patterns).unwrap();
        assert_eq!(before, "one\n");
        assert_eq!(buf.as_str(), "\nrest");
        assert!(buf.take_first_match(&patterns).is_none());
    }

    #[test]
    fn test_sentinels_never_match_text() {
        let mut buf = OutputBuffer::new();
        buf.push(b"<eof> <timeout>");
        assert!(buf.take_first_match(&[Pattern::Eof, Pattern::Timeout]).is_none());
    }

    #[test]
    fn test_match_across_chunks() {
        let mut buf = OutputBuffer::new();
        buf.push(b"Build fin");
        let patterns = [Pattern::literal("Build finished")];
        assert!(buf.take_first_match(&patterns).is_none());
        buf.push(b"ished!");
        assert!(buf.take_first_match(&patterns).is_some());
    }

    #[test]
    fn test_split_multibyte_character() {
        let mut buf = OutputBuffer::new();
        let text = "✔ Build finished".as_bytes();
        buf.push(&text[..2]);
        assert_eq!(buf.as_str(), "");
        buf.push(&text[2..]);
        assert_eq!(buf.as_str(), "✔ Build finished");
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut buf = OutputBuffer::new();
        buf.push(b"ok \xff done");
        assert_eq!(buf.as_str(), "ok \u{FFFD} done");
    }

    #[test]
    fn test_finish_flushes_partial() {
        let mut buf = OutputBuffer::new();
        buf.push(b"tail \xe2\x9c");
        buf.finish();
        assert!(buf.as_str().starts_with("tail "));
        assert!(buf.as_str().ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_trim_keeps_recent_output() {
        let mut buf = OutputBuffer::new();
        buf.push("é".repeat(6_000).as_bytes());
        assert!(buf.as_str().len() <= KEEP_AFTER_TRIM + 1);
        assert!(buf.as_str().chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pattern::literal("Build failed").to_string(), "\"Build failed\"");
        assert_eq!(Pattern::Eof.to_string(), "<eof>");
        assert!(Pattern::Timeout.is_sentinel());
    }
}
