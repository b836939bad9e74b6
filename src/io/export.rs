use std::io::Write;

use super::format::{RecordLines, RecordWriter};
use super::{ExportError, HexCase};
use crate::Segment;

pub const DEFAULT_RECORD_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Address of the first record when `write_data` is given none.
    pub base_address: u32,
    /// Preferred payload bytes per record. 0 selects the default; values
    /// above what the format can hold are clamped.
    pub record_length: usize,
    pub case: HexCase,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            base_address: 0,
            record_length: DEFAULT_RECORD_LENGTH,
            case: HexCase::Upper,
        }
    }
}

/// Pushes data into a line-based hex stream, one record per line.
///
/// The exporter owns its stream; dropping it closes the stream. Use
/// [`finish`](Self::finish) to flush and get the stream back.
#[derive(Debug)]
pub struct HexExporter<W, F> {
    stream: W,
    format: F,
    next_address: u64,
    record_length: usize,
    case: HexCase,
    error: Option<ExportError>,
    records_written: usize,
}

impl<W: Write, F: RecordWriter> HexExporter<W, F> {
    pub fn new(stream: W, format: F, options: ExportOptions) -> Self {
        let record_length = if options.record_length == 0 {
            DEFAULT_RECORD_LENGTH
        } else {
            options.record_length
        }
        .min(format.max_record_length());

        Self {
            stream,
            format,
            next_address: u64::from(options.base_address),
            record_length,
            case: options.case,
            error: None,
            records_written: 0,
        }
    }

    pub fn write_prologue(&mut self) {
        let mut out = RecordLines::new(self.case);
        self.format.prologue(&mut out);
        self.write_lines(out);
    }

    pub fn write_epilogue(&mut self) {
        let mut out = RecordLines::new(self.case);
        self.format.epilogue(self.records_written, &mut out);
        self.write_lines(out);
    }

    /// Write `data` as one or more data records.
    ///
    /// `address` overrides the cursor; `None` continues where the previous
    /// call stopped (or at the base address).
    pub fn write_data(&mut self, data: &[u8], address: Option<u32>) {
        if let Some(address) = address {
            self.next_address = u64::from(address);
        }

        let mut rest = data;
        while !rest.is_empty() {
            let mut len = rest.len().min(self.record_length);
            if let Some(boundary) = self.format.record_boundary() {
                let to_boundary = boundary - self.next_address % boundary;
                len = len.min(usize::try_from(to_boundary).unwrap_or(usize::MAX));
            }
            let (chunk, tail) = rest.split_at(len);

            let mut out = RecordLines::new(self.case);
            self.format.data_record(chunk, self.next_address, &mut out);
            self.write_lines(out);

            self.next_address += len as u64;
            self.records_written += 1;
            rest = tail;
        }
    }

    /// Write every segment at its own address.
    ///
    /// Nothing is written if any segment reaches past
    /// [`max_address`](Self::max_address).
    pub fn write_segments(&mut self, segments: &[Segment]) -> Result<(), ExportError> {
        let max = self.format.max_address();
        if let Some(seg) = segments
            .iter()
            .find(|s| !s.is_empty() && s.next_address() > max)
        {
            return Err(ExportError::AddressOverflow {
                address: seg.next_address() - 1,
                max: max - 1,
            });
        }

        for seg in segments {
            self.write_data(&seg.data, Some(seg.start_address));
        }
        Ok(())
    }

    fn write_lines(&mut self, out: RecordLines) {
        for line in out.into_lines() {
            self.write_line(&line);
        }
    }

    /// Write `line` followed by `\n`. The first I/O failure is kept and
    /// every later write becomes a no-op.
    fn write_line(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .stream
            .write_all(line.as_bytes())
            .and_then(|()| self.stream.write_all(b"\n"));
        if let Err(err) = result {
            tracing::warn!(error = %err, "export write failed");
            self.error = Some(err.into());
        }
    }

    pub fn error(&self) -> Option<&ExportError> {
        self.error.as_ref()
    }

    /// Data records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Exclusive upper bound of the addresses the format can encode.
    pub fn max_address(&self) -> u64 {
        self.format.max_address()
    }

    pub fn next_address(&self) -> u64 {
        self.next_address
    }

    pub fn record_length(&self) -> usize {
        self.record_length
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Flush and hand the stream back, or report the first write failure.
    pub fn finish(mut self) -> Result<W, ExportError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.stream.flush()?;
        tracing::debug!(records = self.records_written, "export finished");
        Ok(self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::format::RecordFormat;

    /// `<addr>:<hex>` lines with a 16-byte boundary and no checksum rule.
    struct Toy;

    impl RecordFormat for Toy {
        fn checksum(sum: u8) -> u8 {
            sum
        }
    }

    impl RecordWriter for Toy {
        fn max_address(&self) -> u64 {
            0x100
        }

        fn max_record_length(&self) -> usize {
            8
        }

        fn record_boundary(&self) -> Option<u64> {
            Some(16)
        }

        fn data_record(&mut self, data: &[u8], address: u64, out: &mut RecordLines) {
            let mut line = out.start(&format!("{address:02X}:"));
            line.push_bytes(data);
            out.finish::<Toy>(line);
        }

        fn epilogue(&mut self, records_written: usize, out: &mut RecordLines) {
            let line = out.start(&format!("end {records_written} "));
            out.finish::<Toy>(line);
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn exporter(record_length: usize) -> HexExporter<Vec<u8>, Toy> {
        HexExporter::new(
            Vec::new(),
            Toy,
            ExportOptions {
                base_address: 0x0C,
                record_length,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_record_length_clamped_and_defaulted() {
        assert_eq!(exporter(0).record_length(), 8);
        assert_eq!(exporter(100).record_length(), 8);
        assert_eq!(exporter(3).record_length(), 3);
    }

    #[test]
    fn test_write_data_splits_at_boundary() {
        let mut exp = exporter(8);
        exp.write_data(&[1, 2, 3, 4, 5, 6], None);
        exp.write_epilogue();
        assert_eq!(exp.records_written(), 2);
        assert_eq!(exp.next_address(), 0x12);

        let text = String::from_utf8(exp.finish().unwrap()).unwrap();
        assert_eq!(text, "0C:010203040A\n10:05060B\nend 2 00\n");
    }

    #[test]
    fn test_write_data_address_override() {
        let mut exp = exporter(8);
        exp.write_data(&[0xAA], None);
        exp.write_data(&[0xBB], Some(0x40));
        exp.write_data(&[0xCC], None);
        let text = String::from_utf8(exp.finish().unwrap()).unwrap();
        assert_eq!(text, "0C:AAAA\n40:BBBB\n41:CCCC\n");
    }

    #[test]
    fn test_write_segments_rejects_overflow() {
        let mut exp = exporter(8);
        let segments = [
            Segment::new(0x00, vec![1]),
            Segment::new(0xFF, vec![1, 2]),
        ];
        let err = exp.write_segments(&segments).unwrap_err();
        assert!(matches!(
            err,
            ExportError::AddressOverflow {
                address: 0x100,
                max: 0xFF
            }
        ));
        assert_eq!(exp.records_written(), 0);
    }

    #[test]
    fn test_write_error_is_retained() {
        let mut exp = HexExporter::new(FailingWriter, Toy, ExportOptions::default());
        exp.write_data(&[1, 2], None);
        exp.write_data(&[3], None);
        assert!(matches!(exp.error(), Some(ExportError::Io(_))));
        assert_eq!(exp.records_written(), 2);
        assert!(exp.finish().is_err());
    }
}
