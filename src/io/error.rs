use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record too long at line {line}")]
    RecordTooLong { line: usize },

    #[error("invalid hexadecimal at line {line}")]
    InvalidHex { line: usize },

    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: &'static str },

    #[error("short record at line {line}")]
    ShortRecord { line: usize },

    #[error("checksum mismatch at line {line}: expected {expected:02X}, got {actual:02X}")]
    ChecksumMismatch {
        line: usize,
        expected: u8,
        actual: u8,
    },

    #[error("mismatch in number of records at line {line}: read {expected}, record says {actual}")]
    RecordCountMismatch {
        line: usize,
        expected: usize,
        actual: u64,
    },

    #[error("non-adjoining address at line {line}: expected {expected:#X}, got {actual:#X}")]
    NonAdjoiningAddress {
        line: usize,
        expected: u64,
        actual: u32,
    },

    #[error("no {name} records found")]
    NoDataRecords { name: &'static str },

    #[error("no {name} record found")]
    NoTerminationRecord { name: &'static str },
}

impl ImportError {
    /// Warnings still end the pass, but the data read so far is usable.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NoTerminationRecord { .. })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("address overflow: {address:#X} exceeds limit {max:#X}")]
    AddressOverflow { address: u64, max: u64 },
}
