use std::io::{Read, Write};

use super::format::{RecordFormat, RecordLines, RecordReader, RecordType, RecordWriter};
use super::line::{Checksum, HexCursor};
use super::{ExportError, ExportOptions, HexExporter, HexImporter, ImportError, ImportOptions};
use crate::Segment;

const CHARS_PER_BYTE: usize = 2;

/// Address field width per record type; `None` for unsupported types.
const ADDRESS_BYTES: [Option<usize>; 10] = [
    Some(2),
    Some(2),
    Some(3),
    Some(4),
    None,
    Some(2),
    None,
    Some(4),
    Some(3),
    Some(2),
];

// type (1 byte equivalent) + byte count + address/data/checksum (at most 256)
const MAX_LINE_LEN: usize = CHARS_PER_BYTE * (1 + 1 + 256);
// type + byte count + 2 address bytes + checksum
const MIN_LINE_LEN: usize = CHARS_PER_BYTE * (1 + 1 + 2 + 1);

const HEADER_TYPE: u8 = 0;
const COUNT_TYPE: u8 = 5;

/// Data record type used by the exporter, which fixes the address width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SType {
    /// 16-bit addresses.
    #[default]
    S1,
    /// 24-bit addresses.
    S2,
    /// 32-bit addresses.
    S3,
}

impl SType {
    pub fn record_type(self) -> u8 {
        match self {
            SType::S1 => 1,
            SType::S2 => 2,
            SType::S3 => 3,
        }
    }

    pub fn address_bytes(self) -> usize {
        match self {
            SType::S1 => 2,
            SType::S2 => 3,
            SType::S3 => 4,
        }
    }

    /// Exclusive upper bound of the addresses this type can encode.
    pub fn max_address(self) -> u64 {
        1u64 << (8 * self.address_bytes())
    }

    /// Smallest type whose address range reaches `end` (exclusive).
    pub fn smallest_for(end: u64) -> SType {
        [SType::S1, SType::S2]
            .into_iter()
            .find(|t| end <= t.max_address())
            .unwrap_or(SType::S3)
    }
}

/// Motorola S-record lines: `S<type><count><address><data><checksum>`.
#[derive(Debug, Clone, Default)]
pub struct SRecordFormat {
    stype: SType,
}

impl SRecordFormat {
    pub fn new(stype: SType) -> Self {
        Self { stype }
    }

    pub fn stype(&self) -> SType {
        self.stype
    }

    fn write_srecord(
        record_type: u8,
        address_bytes: usize,
        data: &[u8],
        address: u64,
        out: &mut RecordLines,
    ) {
        debug_assert!(address_bytes + data.len() < 0xFF);
        let mut line = out.start(&format!("S{record_type}"));
        // count covers address, data and checksum
        line.push_byte((address_bytes + data.len() + 1) as u8);
        line.push_address(address, address_bytes);
        line.push_bytes(data);
        out.finish::<Self>(line);
    }
}

impl RecordFormat for SRecordFormat {
    fn checksum(sum: u8) -> u8 {
        !sum
    }
}

impl RecordReader for SRecordFormat {
    const DATA_RECORD_NAME: &'static str = "S1/S2/S3";
    const EOF_RECORD_NAME: &'static str = "S5";
    const MAX_LINE_LEN: usize = MAX_LINE_LEN;

    /// Lines that do not start with `S<digit>`, and types 4 and 6, are
    /// skipped. A recognised record cut short is a `ShortRecord`.
    ///
    /// The S5 count field is 16 bits wide, so it is checked against
    /// `records_read` modulo 0x10000: a file with 65536 + N data records
    /// passes an S5 that says N.
    fn read_record(
        &mut self,
        line: &mut HexCursor<'_>,
        buf: &mut [u8],
        records_read: usize,
    ) -> Result<RecordType, ImportError> {
        let line_len = line.remaining();
        let line_no = line.line_number();
        if !matches!(line.next_char(), Some(b'S' | b's')) {
            return Ok(RecordType::Skip);
        }
        let Some(record_type) = line.next_char().filter(u8::is_ascii_digit).map(|c| c - b'0')
        else {
            return Ok(RecordType::Skip);
        };
        let Some(address_bytes) = ADDRESS_BYTES[record_type as usize] else {
            return Ok(RecordType::Skip);
        };
        if line_len < MIN_LINE_LEN {
            return Err(ImportError::ShortRecord { line: line_no });
        }

        let mut checksum = Checksum::new();
        let byte_count = line.parse_byte(Some(&mut checksum))? as usize;

        let len = byte_count
            .checked_sub(address_bytes + 1)
            .ok_or(ImportError::ShortRecord { line: line_no })?;
        if len > buf.len() {
            return Err(ImportError::RecordTooLong { line: line_no });
        }
        if line_len < CHARS_PER_BYTE * (2 + byte_count) {
            return Err(ImportError::ShortRecord { line: line_no });
        }

        let address = line.parse_hex(address_bytes, Some(&mut checksum))?;
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
            HEADER_TYPE => Ok(RecordType::Skip),
            1..=3 => Ok(RecordType::Data {
                address: address as u32,
                len,
            }),
            COUNT_TYPE => {
                // The count field is 16 bits wide; larger files wrap.
                if address != records_read as u64 & 0xFFFF {
                    return Err(ImportError::RecordCountMismatch {
                        line: line_no,
                        expected: records_read,
                        actual: address,
                    });
                }
                // S7/S8/S9 may follow, but carry nothing we use.
                Ok(RecordType::Termination)
            }
            _ => Ok(RecordType::Skip),
        }
    }
}

impl RecordWriter for SRecordFormat {
    fn max_address(&self) -> u64 {
        self.stype.max_address()
    }

    fn max_record_length(&self) -> usize {
        0xFF - self.stype.address_bytes() - 1
    }

    /// S0 header carrying "HDR".
    fn prologue(&mut self, out: &mut RecordLines) {
        Self::write_srecord(HEADER_TYPE, 2, b"HDR", 0, out);
    }

    fn data_record(&mut self, data: &[u8], address: u64, out: &mut RecordLines) {
        let stype = self.stype;
        Self::write_srecord(stype.record_type(), stype.address_bytes(), data, address, out);
    }

    /// S5 record whose address field is the data record count.
    fn epilogue(&mut self, records_written: usize, out: &mut RecordLines) {
        Self::write_srecord(COUNT_TYPE, 2, &[], records_written as u64 & 0xFFFF, out);
    }
}

pub type SRecordImporter<R> = HexImporter<R, SRecordFormat>;
pub type SRecordExporter<W> = HexExporter<W, SRecordFormat>;

impl<R: Read> HexImporter<R, SRecordFormat> {
    pub fn srecord(stream: R, options: ImportOptions) -> Self {
        Self::new(stream, SRecordFormat::default(), options)
    }
}

impl<W: Write> HexExporter<W, SRecordFormat> {
    pub fn srecord(stream: W, stype: SType, options: ExportOptions) -> Self {
        Self::new(stream, SRecordFormat::new(stype), options)
    }
}

/// Parse Motorola S-record input into runs of adjoining data, in file order.
pub fn parse_srec(data: &[u8], options: ImportOptions) -> Result<Vec<Segment>, ImportError> {
    SRecordImporter::srecord(data, options).read_segments()
}

/// Write Motorola S-record output: S0 header, data records, S5 count.
///
/// Without an explicit `stype` the smallest type that covers every segment
/// is used.
pub fn write_srec(
    segments: &[Segment],
    stype: Option<SType>,
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let end = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(Segment::next_address)
        .max()
        .unwrap_or(0);
    let stype = stype.unwrap_or_else(|| SType::smallest_for(end));

    let mut exporter = SRecordExporter::srecord(Vec::new(), stype, options);
    exporter.write_prologue();
    exporter.write_segments(segments)?;
    exporter.write_epilogue();
    exporter.finish()
}
