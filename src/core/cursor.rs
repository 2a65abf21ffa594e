// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line cursor over a seekable text source.
//!
//! The cursor tracks the byte offset of the next unread line itself, so
//! positions never depend on how much the underlying reader has buffered.
//! [`LineCursor::seek`] drops any buffered look-ahead, which lets a caller peek
//! a line and then hand the same physical line to a parser for consumption.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::core::text_utils::remove_escapes;

const UTF8_BOM: &str = "\u{feff}";

pub struct LineCursor<R> {
    reader: BufReader<R>,
    pos: u64,
    last_len: u64,
}

impl<R: Read + Seek> LineCursor<R> {
    /// Wrap a source, starting at its current stream position.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        Ok(Self {
            reader: BufReader::new(inner),
            pos,
            last_len: 0,
        })
    }

    /// Byte offset of the next unread line.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Byte length of the last line read, terminator excluded. Measured on
    /// the source bytes, so undecodable bytes and a byte order mark count
    /// as they are stored.
    pub fn last_line_len(&self) -> u64 {
        self.last_len
    }

    /// True when no bytes remain.
    pub fn is_at_end(&mut self) -> io::Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    /// Read the next line, advancing past its terminator.
    ///
    /// The `\n` or `\r\n` terminator is removed and tabs become single spaces.
    /// Returns `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let start = self.pos;
        let mut buf = Vec::new();
        let read = self.reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.pos += read as u64;
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        self.last_len = buf.len() as u64;
        let decoded = String::from_utf8_lossy(&buf);
        let text: &str = if start == 0 {
            decoded.strip_prefix(UTF8_BOM).unwrap_or(&decoded)
        } else {
            &decoded
        };
        Ok(Some(remove_escapes(text)))
    }

    /// Read the next line without consuming it.
    pub fn peek_line(&mut self) -> io::Result<Option<String>> {
        let saved = self.pos;
        let line = self.read_line()?;
        self.seek(saved)?;
        Ok(line)
    }

    /// Reposition to an absolute byte offset, discarding buffered data.
    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LineCursor;
    use std::io::Cursor;

    fn cursor(text: &str) -> LineCursor<Cursor<Vec<u8>>> {
        LineCursor::new(Cursor::new(text.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn reads_lines_and_tracks_byte_offsets() {
        let mut cur = cursor("one\r\n\ttwo\nthree");
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("one"));
        assert_eq!(cur.position(), 5);
        assert_eq!(cur.read_line().unwrap().as_deref(), Some(" two"));
        assert_eq!(cur.position(), 10);
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("three"));
        assert_eq!(cur.position(), 15);
        assert!(cur.is_at_end().unwrap());
        assert_eq!(cur.read_line().unwrap(), None);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut cur = cursor("a\nb\n");
        assert_eq!(cur.peek_line().unwrap().as_deref(), Some("a"));
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("a"));
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn seek_replays_the_same_line() {
        let mut cur = cursor("first\nsecond\nthird\n");
        cur.read_line().unwrap();
        let mark = cur.position();
        let once = cur.read_line().unwrap();
        cur.read_line().unwrap();
        cur.seek(mark).unwrap();
        assert_eq!(cur.read_line().unwrap(), once);
        assert_eq!(cur.position(), 13);
    }

    #[test]
    fn blank_line_is_not_end_of_input() {
        let mut cur = cursor("\n\nx");
        assert_eq!(cur.read_line().unwrap().as_deref(), Some(""));
        assert!(!cur.is_at_end().unwrap());
        assert_eq!(cur.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn byte_order_mark_is_hidden_but_counted() {
        let mut cur = cursor("\u{feff}; hi\nnext");
        assert_eq!(cur.read_line().unwrap().as_deref(), Some("; hi"));
        assert_eq!(cur.position(), 8);
        assert_eq!(cur.last_line_len(), 7);
    }

    #[test]
    fn last_line_len_counts_source_bytes() {
        let mut cur = LineCursor::new(Cursor::new(b"; \x82\xa0\x82\xa2\r\nnext".to_vec())).unwrap();
        let text = cur.read_line().unwrap().unwrap();
        assert!(text.len() > 6);
        assert_eq!(cur.last_line_len(), 6);
        assert_eq!(cur.position(), 8);
    }
}
