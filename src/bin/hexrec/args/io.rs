use std::path::Path;

use hexrec::{ExportOptions, ImportOptions, SType, Segment};

use super::error::CliError;
use super::types::FileFormat;

/// Detect the record format from the first non-empty line.
pub(super) fn detect_format(content: &[u8]) -> Option<FileFormat> {
    let first_line = content
        .split(|&b| b == b'\n')
        .map(<[u8]>::trim_ascii)
        .find(|line| !line.is_empty())?;

    match first_line.first() {
        Some(b':') => Some(FileFormat::IntelHex),
        Some(b'S' | b's') => Some(FileFormat::SRecord),
        _ => None,
    }
}

pub(super) fn load_input(
    path: &Path,
    options: ImportOptions,
) -> Result<(FileFormat, Vec<Segment>), CliError> {
    let content = std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let format = detect_format(&content).ok_or_else(|| CliError::UnknownFormat(path.into()))?;
    let segments = match format {
        FileFormat::SRecord => hexrec::parse_srec(&content, options)?,
        FileFormat::IntelHex => hexrec::parse_intel_hex(&content, options)?,
    };
    tracing::debug!(
        path = %path.display(),
        ?format,
        segments = segments.len(),
        "loaded input"
    );
    Ok((format, segments))
}

pub(super) fn write_output(
    path: &Path,
    segments: &[Segment],
    format: FileFormat,
    stype: Option<SType>,
    options: ExportOptions,
) -> Result<(), CliError> {
    let output = match format {
        FileFormat::SRecord => hexrec::write_srec(segments, stype, options)?,
        FileFormat::IntelHex => hexrec::write_intel_hex(segments, options)?,
    };
    std::fs::write(path, output).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
