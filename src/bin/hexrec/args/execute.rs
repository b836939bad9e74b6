use hexrec::{ExportOptions, HexCase, ImportOptions, Segment};

use super::error::CliError;
use super::io::{load_input, write_output};
use super::types::{Args, ParseArgError};

impl Args {
    pub fn execute(&self) -> Result<(), CliError> {
        let input = self
            .input_file
            .as_ref()
            .ok_or(ParseArgError::MissingInputFile)?;
        let output = self
            .output_file
            .as_ref()
            .ok_or(ParseArgError::MissingOutputFile)?;

        let import_options = ImportOptions {
            allow_noncontiguous: !self.contiguous,
        };
        let (input_format, mut segments) = load_input(input, import_options)?;

        if let Some(base) = self.base {
            relocate(&mut segments, base)?;
        }

        let format = self.output_format.unwrap_or(input_format);
        let mut export_options = ExportOptions::default();
        if let Some(len) = self.record_length {
            export_options.record_length = len;
        }
        if self.lowercase {
            export_options.case = HexCase::Lower;
        }

        write_output(output, &segments, format, self.stype, export_options)?;
        tracing::debug!(path = %output.display(), ?format, "wrote output");
        Ok(())
    }
}

/// Shift every segment so the lowest address becomes `base`.
pub(super) fn relocate(segments: &mut [Segment], base: u32) -> Result<(), CliError> {
    let Some(lowest) = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.start_address)
        .min()
    else {
        return Ok(());
    };

    let offset = i64::from(base) - i64::from(lowest);
    if let Some(seg) = segments
        .iter()
        .filter(|s| !s.is_empty())
        .find(|s| s.next_address() as i64 + offset > 1 << 32)
    {
        return Err(format!(
            "relocating to {base:#X} moves {:#X} past the 32-bit address space",
            seg.start_address
        )
        .into());
    }

    for seg in segments.iter_mut().filter(|s| !s.is_empty()) {
        seg.start_address = (i64::from(seg.start_address) + offset) as u32;
    }
    Ok(())
}
