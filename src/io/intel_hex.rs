use std::io::{Read, Write};

use super::format::{RecordFormat, RecordLines, RecordReader, RecordType, RecordWriter};
use super::line::{Checksum, HexCursor};
use super::{ExportError, ExportOptions, HexExporter, HexImporter, ImportError, ImportOptions};
use crate::Segment;

const RECORD_DATA: u64 = 0x00;
const RECORD_EOF: u64 = 0x01;
const RECORD_EXTENDED_SEGMENT: u64 = 0x02;
const RECORD_EXTENDED_LINEAR: u64 = 0x04;

const CHARS_PER_BYTE: usize = 2;
// byte count + address + type + checksum
const OVERHEAD_BYTES: usize = 1 + 2 + 1 + 1;
const MAX_LINE_LEN: usize = 1 + CHARS_PER_BYTE * (OVERHEAD_BYTES + 256);
const MIN_LINE_LEN: usize = 1 + CHARS_PER_BYTE * OVERHEAD_BYTES;

const BANK_SIZE: u64 = 0x1_0000;

/// Intel HEX lines: `:<count><address><type><data><checksum>`.
///
/// Reading honours extended segment (02) and extended linear (04) address
/// records; writing emits an extended linear record whenever the upper 16
/// address bits change.
#[derive(Debug, Clone, Default)]
pub struct IntelHexFormat {
    base_address: u32,
    upper_address: u16,
}

impl IntelHexFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset currently added to data record addresses while reading.
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    fn write_hex_record(record_type: u8, data: &[u8], offset: u16, out: &mut RecordLines) {
        debug_assert!(data.len() <= 0xFF);
        let mut line = out.start(":");
        line.push_byte(data.len() as u8);
        line.push_address(u64::from(offset), 2);
        line.push_byte(record_type);
        line.push_bytes(data);
        out.finish::<Self>(line);
    }
}

impl RecordFormat for IntelHexFormat {
    fn checksum(sum: u8) -> u8 {
        sum.wrapping_neg()
    }
}

impl RecordReader for IntelHexFormat {
    const EOF_RECORD_NAME: &'static str = "Intel hex EOF";
    const MAX_LINE_LEN: usize = MAX_LINE_LEN;

    fn read_record(
        &mut self,
        line: &mut HexCursor<'_>,
        buf: &mut [u8],
        _records_read: usize,
    ) -> Result<RecordType, ImportError> {
        let line_len = line.remaining();
        let line_no = line.line_number();
        let starts_with_colon = line.next_char() == Some(b':');

        if line_len < MIN_LINE_LEN {
            if starts_with_colon {
                return Err(ImportError::ShortRecord { line: line_no });
            }
            return Ok(RecordType::Skip);
        }
        if !starts_with_colon {
            return Ok(RecordType::Skip);
        }

        let mut checksum = Checksum::new();
        let len = line.parse_byte(Some(&mut checksum))? as usize;
        if len > buf.len() {
            return Err(ImportError::RecordTooLong { line: line_no });
        }
        if line_len < 1 + CHARS_PER_BYTE * (OVERHEAD_BYTES + len) {
            return Err(ImportError::ShortRecord { line: line_no });
        }

        let offset = line.parse_hex(2, Some(&mut checksum))? as u32;
        let Some(record_type) = line.try_parse_hex(1, Some(&mut checksum)) else {
            return Ok(RecordType::Skip);
        };
        if !matches!(
            record_type,
            RECORD_DATA | RECORD_EOF | RECORD_EXTENDED_SEGMENT | RECORD_EXTENDED_LINEAR
        ) {
            // start segment (03), start linear (05) and anything unknown
            return Ok(RecordType::Skip);
        }

        for slot in &mut buf[..len] {
            *slot = line.parse_byte(Some(&mut checksum))?;
        }

        let actual = line.parse_byte(None)?;
        let expected = Self::checksum(checksum.sum());
        if actual != expected {
            return Err(ImportError::ChecksumMismatch {
                line: line_no,
                expected,
                actual,
            });
        }

        match record_type {
            RECORD_DATA => Ok(RecordType::Data {
                address: self.base_address + offset,
                len,
            }),
            RECORD_EOF => Ok(RecordType::Termination),
            _ => {
                if len != 2 {
                    return Err(ImportError::InvalidRecord {
                        line: line_no,
                        message: "extended address record must have 2 data bytes",
                    });
                }
                let value = u32::from(u16::from_be_bytes([buf[0], buf[1]]));
                self.base_address = if record_type == RECORD_EXTENDED_SEGMENT {
                    value << 4
                } else {
                    value << 16
                };
                tracing::trace!(
                    line = line_no,
                    base = self.base_address,
                    "extended address record"
                );
                Ok(RecordType::Skip)
            }
        }
    }
}

impl RecordWriter for IntelHexFormat {
    fn max_address(&self) -> u64 {
        1 << 32
    }

    fn max_record_length(&self) -> usize {
        0xFF
    }

    fn record_boundary(&self) -> Option<u64> {
        Some(BANK_SIZE)
    }

    fn data_record(&mut self, data: &[u8], address: u64, out: &mut RecordLines) {
        let upper = (address >> 16) as u16;
        if upper != self.upper_address {
            Self::write_hex_record(
                RECORD_EXTENDED_LINEAR as u8,
                &upper.to_be_bytes(),
                0,
                out,
            );
            self.upper_address = upper;
        }
        Self::write_hex_record(RECORD_DATA as u8, data, address as u16, out);
    }

    /// `:00000001FF`
    fn epilogue(&mut self, _records_written: usize, out: &mut RecordLines) {
        Self::write_hex_record(RECORD_EOF as u8, &[], 0, out);
    }
}

pub type IntelHexImporter<R> = HexImporter<R, IntelHexFormat>;
pub type IntelHexExporter<W> = HexExporter<W, IntelHexFormat>;

impl<R: Read> HexImporter<R, IntelHexFormat> {
    pub fn intel_hex(stream: R, options: ImportOptions) -> Self {
        Self::new(stream, IntelHexFormat::new(), options)
    }
}

impl<W: Write> HexExporter<W, IntelHexFormat> {
    pub fn intel_hex(stream: W, options: ExportOptions) -> Self {
        Self::new(stream, IntelHexFormat::new(), options)
    }
}

/// Parse Intel HEX input into runs of adjoining data, in file order.
pub fn parse_intel_hex(input: &[u8], options: ImportOptions) -> Result<Vec<Segment>, ImportError> {
    IntelHexImporter::intel_hex(input, options).read_segments()
}

/// Write Intel HEX output: data records (with extended linear address
/// records as needed) followed by the EOF record.
pub fn write_intel_hex(segments: &[Segment], options: ExportOptions) -> Result<Vec<u8>, ExportError> {
    let mut exporter = IntelHexExporter::intel_hex(Vec::new(), options);
    exporter.write_prologue();
    exporter.write_segments(segments)?;
    exporter.write_epilogue();
    exporter.finish()
}
