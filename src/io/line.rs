//! Line reading and hex-digit parsing shared by every record format.

use std::io::{BufRead, BufReader, ErrorKind, Read};

use super::ImportError;

/// Running sum (mod 256) of the bytes of one record, excluding its checksum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Checksum(u8);

impl Checksum {
    pub fn new() -> Self {
        Self(0)
    }

    /// Fold the low `num_bytes` bytes of `value` into the sum.
    pub fn append(&mut self, value: u64, num_bytes: usize) {
        let mut v = value;
        for _ in 0..num_bytes {
            self.0 = self.0.wrapping_add(v as u8);
            v >>= 8;
        }
    }

    pub fn append_byte(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    pub fn sum(&self) -> u8 {
        self.0
    }
}

/// Reads `\n`-terminated lines from an owned stream, one at a time.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: BufReader<R>,
    line: Vec<u8>,
    line_number: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            inner: BufReader::new(stream),
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Number of lines read so far; the line returned last has this number.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line without its terminator (a trailing `\r` is dropped).
    ///
    /// Returns `Ok(None)` at end of stream. A final line that is not
    /// terminated by `\n` is still returned. Lines longer than `max_len`
    /// characters fail with [`ImportError::RecordTooLong`]; reading stops as
    /// soon as the limit is passed, so an unterminated stream cannot grow
    /// the buffer without bound.
    pub fn read_line(&mut self, max_len: usize) -> Result<Option<&[u8]>, ImportError> {
        self.line.clear();
        let mut consumed_any = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                break;
            }
            consumed_any = true;

            let newline = available.iter().position(|&b| b == b'\n');
            let take = newline.unwrap_or(available.len());
            self.line.extend_from_slice(&available[..take]);
            self.inner.consume(newline.map_or(take, |pos| pos + 1));

            // One extra byte of slack for a trailing '\r'.
            if self.line.len() > max_len + 1 {
                self.line_number += 1;
                return Err(ImportError::RecordTooLong {
                    line: self.line_number,
                });
            }
            if newline.is_some() {
                break;
            }
        }

        if !consumed_any {
            return Ok(None);
        }
        self.line_number += 1;

        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }
        if self.line.len() > max_len {
            return Err(ImportError::RecordTooLong {
                line: self.line_number,
            });
        }
        Ok(Some(self.line.as_slice()))
    }

    /// Like [`read_line`](Self::read_line), wrapped in a cursor that knows
    /// the line number.
    pub fn next_cursor(&mut self, max_len: usize) -> Result<Option<HexCursor<'_>>, ImportError> {
        if self.read_line(max_len)?.is_none() {
            return Ok(None);
        }
        Ok(Some(HexCursor::new(&self.line, self.line_number)))
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

/// Cursor over the characters of one record line.
#[derive(Debug)]
pub struct HexCursor<'a> {
    line: &'a [u8],
    pos: usize,
    line_number: usize,
}

impl<'a> HexCursor<'a> {
    pub fn new(line: &'a [u8], line_number: usize) -> Self {
        Self {
            line,
            pos: 0,
            line_number,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Characters not yet consumed.
    pub fn remaining(&self) -> usize {
        self.line.len() - self.pos
    }

    /// Take one raw character (record marks, type digits).
    pub fn next_char(&mut self) -> Option<u8> {
        let c = *self.line.get(self.pos)?;
        self.pos += 1;
        Some(c)
    }

    pub fn skip(&mut self, chars: usize) {
        self.pos = (self.pos + chars).min(self.line.len());
    }

    /// Parse `num_bytes * 2` hex digits as a big-endian value.
    ///
    /// On success the cursor advances and, if given, `checksum` absorbs the
    /// parsed bytes. On failure nothing is consumed.
    pub fn try_parse_hex(
        &mut self,
        num_bytes: usize,
        checksum: Option<&mut Checksum>,
    ) -> Option<u64> {
        debug_assert!((1..=4).contains(&num_bytes));
        let digits = num_bytes * 2;
        let text = self.line.get(self.pos..self.pos + digits)?;

        let mut value = 0u64;
        for &c in text {
            value = (value << 4) | u64::from(hex_digit(c)?);
        }
        self.pos += digits;

        if let Some(checksum) = checksum {
            checksum.append(value, num_bytes);
        }
        Some(value)
    }

    pub fn parse_hex(
        &mut self,
        num_bytes: usize,
        checksum: Option<&mut Checksum>,
    ) -> Result<u64, ImportError> {
        self.try_parse_hex(num_bytes, checksum)
            .ok_or(ImportError::InvalidHex {
                line: self.line_number,
            })
    }

    pub fn parse_byte(&mut self, checksum: Option<&mut Checksum>) -> Result<u8, ImportError> {
        self.parse_hex(1, checksum).map(|v| v as u8)
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}
