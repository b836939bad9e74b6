//! The per-format capability the import and export drivers are generic over.

use super::line::HexCursor;
use super::{HexCase, ImportError, push_hex_byte};

/// How the importer driver should treat the record it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// `len` bytes were written to the front of the caller's buffer.
    Data { address: u32, len: usize },
    /// Header, start address, unknown or unsupported lines.
    Skip,
    /// End-of-data marker; the pass is over.
    Termination,
    /// No record could be read: the stream ended before a termination record.
    Error,
}

/// Rules shared by reading and writing one textual hex-record format.
pub trait RecordFormat {
    /// Turn the byte sum of a record into its trailing checksum byte.
    fn checksum(sum: u8) -> u8;
}

pub trait RecordReader: RecordFormat {
    /// Used in "no ... records found".
    const DATA_RECORD_NAME: &'static str = "data";
    /// Used in "no ... record found".
    const EOF_RECORD_NAME: &'static str = "EOF";
    /// Longest line, in characters, a valid record can occupy.
    const MAX_LINE_LEN: usize;

    /// Decode one line. `buf` receives the payload of data records.
    ///
    /// Returning `Err` aborts the whole pass.
    fn read_record(
        &mut self,
        line: &mut HexCursor<'_>,
        buf: &mut [u8],
        records_read: usize,
    ) -> Result<RecordType, ImportError>;
}

pub trait RecordWriter: RecordFormat {
    /// Exclusive upper bound of the addresses this writer can encode.
    fn max_address(&self) -> u64;

    /// Most payload bytes a single data record can hold.
    fn max_record_length(&self) -> usize;

    /// Data records are never allowed to straddle a multiple of this.
    fn record_boundary(&self) -> Option<u64> {
        None
    }

    fn prologue(&mut self, _out: &mut RecordLines) {}

    fn data_record(&mut self, data: &[u8], address: u64, out: &mut RecordLines);

    fn epilogue(&mut self, _records_written: usize, _out: &mut RecordLines) {}
}

/// Lines produced by a writer for one driver call.
#[derive(Debug)]
pub struct RecordLines {
    case: HexCase,
    lines: Vec<String>,
}

impl RecordLines {
    pub fn new(case: HexCase) -> Self {
        Self {
            case,
            lines: Vec::new(),
        }
    }

    /// Start a record line with a literal (non-checksummed) prefix.
    pub fn start(&self, prefix: &str) -> RecordLine {
        RecordLine {
            text: prefix.to_string(),
            case: self.case,
            sum: 0,
        }
    }

    /// Append the checksum computed by `F` and queue the line.
    pub fn finish<F: RecordFormat>(&mut self, mut line: RecordLine) {
        let checksum = F::checksum(line.sum);
        push_hex_byte(&mut line.text, checksum, line.case);
        self.lines.push(line.text);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[derive(Debug, Clone)]
pub struct RecordLine {
    text: String,
    case: HexCase,
    sum: u8,
}

impl RecordLine {
    pub fn push_byte(&mut self, byte: u8) {
        push_hex_byte(&mut self.text, byte, self.case);
        self.sum = self.sum.wrapping_add(byte);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// Big-endian, `num_bytes` wide.
    pub fn push_address(&mut self, address: u64, num_bytes: usize) {
        for shift in (0..num_bytes).rev() {
            self.push_byte((address >> (8 * shift)) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Negate;

    impl RecordFormat for Negate {
        fn checksum(sum: u8) -> u8 {
            sum.wrapping_neg()
        }
    }

    #[test]
    fn test_record_line_address_and_checksum() {
        let mut out = RecordLines::new(HexCase::Upper);
        let mut line = out.start(":");
        line.push_address(0x0102_0304, 3);
        line.push_bytes(&[0xAB]);
        out.finish::<Negate>(line);

        let sum = 0x02u8 + 0x03 + 0x04 + 0xAB;
        let expected = format!(":020304AB{:02X}", sum.wrapping_neg());
        assert_eq!(out.into_lines(), vec![expected]);
    }

    #[test]
    fn test_record_line_lowercase() {
        let mut out = RecordLines::new(HexCase::Lower);
        let mut line = out.start("x");
        line.push_byte(0xFE);
        out.finish::<Negate>(line);
        assert_eq!(out.into_lines(), vec!["xfe02".to_string()]);
    }
}
