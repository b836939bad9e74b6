//! Streaming importers and exporters for Motorola S-record and Intel HEX.
//!
//! [`HexImporter`] pulls `(address, bytes)` records out of any [`std::io::Read`];
//! [`HexExporter`] pushes bytes into any [`std::io::Write`] as fixed-size
//! records. Both are generic over a [`RecordFormat`] ([`SRecordFormat`],
//! [`IntelHexFormat`]) and own their stream for their whole lifetime.

pub mod error;
pub mod io;
pub mod segment;

pub use error::Error;
pub use io::{
    Checksum, Chunk, DEFAULT_RECORD_LENGTH, ExportError, ExportOptions, HexCase, HexCursor,
    HexExporter, HexImporter, ImportError, ImportOptions, IntelHexExporter, IntelHexFormat,
    IntelHexImporter, LineReader, MAX_RECORD_DATA, RecordFormat, RecordLine, RecordLines,
    RecordReader, RecordType, RecordWriter, SRecordExporter, SRecordFormat, SRecordImporter,
    SType, parse_intel_hex, parse_srec, write_intel_hex, write_srec,
};
pub use segment::Segment;
