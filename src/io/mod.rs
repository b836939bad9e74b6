mod error;
mod export;
mod format;
mod import;
mod intel_hex;
mod line;
mod srec;

pub use error::{ExportError, ImportError};
pub use export::{DEFAULT_RECORD_LENGTH, ExportOptions, HexExporter};
pub use format::{RecordFormat, RecordLine, RecordLines, RecordReader, RecordType, RecordWriter};
pub use import::{Chunk, HexImporter, ImportOptions, MAX_RECORD_DATA};
pub use intel_hex::{IntelHexExporter, IntelHexFormat, IntelHexImporter, parse_intel_hex, write_intel_hex};
pub use line::{Checksum, HexCursor, LineReader};
pub use srec::{SRecordExporter, SRecordFormat, SRecordImporter, SType, parse_srec, write_srec};

/// Letter case of the hex digits an exporter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexCase {
    #[default]
    Upper,
    Lower,
}

pub(crate) fn push_hex_byte(out: &mut String, byte: u8, case: HexCase) {
    let digits: &[u8; 16] = match case {
        HexCase::Upper => b"0123456789ABCDEF",
        HexCase::Lower => b"0123456789abcdef",
    };
    out.push(digits[(byte >> 4) as usize] as char);
    out.push(digits[(byte & 0x0F) as usize] as char);
}
