use std::io::Read;

use super::format::{RecordReader, RecordType};
use super::line::LineReader;
use super::ImportError;
use crate::Segment;

/// Largest payload a single S-record or Intel HEX record can carry.
pub const MAX_RECORD_DATA: usize = 255;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Accept data records that do not start where the previous one ended.
    pub allow_noncontiguous: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            allow_noncontiguous: true,
        }
    }
}

/// One decoded data record, as returned by [`HexImporter::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub address: u32,
    pub len: usize,
}

/// Pulls data records out of a line-based hex stream.
///
/// The importer owns its stream; dropping the importer closes it. Call
/// [`get`](Self::get) until it returns `None`, then inspect
/// [`error`](Self::error): `None` there means the input ended cleanly.
#[derive(Debug)]
pub struct HexImporter<R, F> {
    reader: LineReader<R>,
    format: F,
    next_address: u64,
    error: Option<ImportError>,
    records_read: usize,
    finished: bool,
    options: ImportOptions,
}

impl<R: Read, F: RecordReader> HexImporter<R, F> {
    pub fn new(stream: R, format: F, options: ImportOptions) -> Self {
        Self {
            reader: LineReader::new(stream),
            format,
            next_address: u64::MAX,
            error: None,
            records_read: 0,
            finished: false,
            options,
        }
    }

    /// Read the next data record into `buf`.
    ///
    /// Returns `None` at the end of the pass, whether it ended cleanly or
    /// not. A record whose payload does not fit in `buf` is an error, so a
    /// buffer of [`MAX_RECORD_DATA`] bytes always suffices.
    pub fn get(&mut self, buf: &mut [u8]) -> Option<Chunk> {
        if self.finished {
            return None;
        }

        match self.next_data_record(buf) {
            Ok(Some(chunk)) => Some(chunk),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                tracing::warn!(line = self.reader.line_number(), error = %err, "import aborted");
                self.error = Some(err);
                self.finished = true;
                None
            }
        }
    }

    fn next_data_record(&mut self, buf: &mut [u8]) -> Result<Option<Chunk>, ImportError> {
        let record = loop {
            match self.read_record(buf)? {
                RecordType::Skip => {
                    tracing::trace!(line = self.reader.line_number(), "skipping record");
                }
                other => break other,
            }
        };

        match record {
            RecordType::Data { address, len } => {
                if !self.options.allow_noncontiguous {
                    if self.records_read != 0 && u64::from(address) != self.next_address {
                        return Err(ImportError::NonAdjoiningAddress {
                            line: self.reader.line_number(),
                            expected: self.next_address,
                            actual: address,
                        });
                    }
                    self.next_address = u64::from(address) + len as u64;
                }
                self.records_read += 1;
                Ok(Some(Chunk { address, len }))
            }
            RecordType::Termination => {
                tracing::debug!(
                    line = self.reader.line_number(),
                    records = self.records_read,
                    "termination record"
                );
                if self.records_read == 0 {
                    return Err(ImportError::NoDataRecords {
                        name: F::DATA_RECORD_NAME,
                    });
                }
                Ok(None)
            }
            RecordType::Error | RecordType::Skip => Err(ImportError::NoTerminationRecord {
                name: F::EOF_RECORD_NAME,
            }),
        }
    }

    fn read_record(&mut self, buf: &mut [u8]) -> Result<RecordType, ImportError> {
        let Some(mut cursor) = self.reader.next_cursor(F::MAX_LINE_LEN)? else {
            return Ok(RecordType::Error);
        };
        self.format.read_record(&mut cursor, buf, self.records_read)
    }

    /// The error that ended the pass, if any.
    pub fn error(&self) -> Option<&ImportError> {
        self.error.as_ref()
    }

    /// Move the stored error out, leaving the importer finished.
    pub fn take_error(&mut self) -> Option<ImportError> {
        self.finished = true;
        self.error.take()
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn line_number(&self) -> usize {
        self.reader.line_number()
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Give the stream back. Input buffered but not yet parsed is lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Drain the importer, merging adjoining records into segments.
    ///
    /// A missing termination record is only logged; the data read before the
    /// end of input is returned.
    pub fn read_segments(mut self) -> Result<Vec<Segment>, ImportError> {
        let mut buf = [0u8; MAX_RECORD_DATA];
        let mut segments: Vec<Segment> = Vec::new();

        while let Some(chunk) = self.get(&mut buf) {
            let data = &buf[..chunk.len];
            match segments.last_mut() {
                Some(seg) if seg.next_address() == u64::from(chunk.address) => {
                    seg.data.extend_from_slice(data);
                }
                _ => segments.push(Segment::new(chunk.address, data.to_vec())),
            }
        }

        match self.take_error() {
            Some(err) if err.is_warning() => {
                tracing::warn!(error = %err, "import finished with warning");
                Ok(segments)
            }
            Some(err) => Err(err),
            None => Ok(segments),
        }
    }
}
