use std::path::PathBuf;

use hexrec::SType;

use super::parse::{parse_option, split_option};

/// Record format of an input or output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    SRecord,
    IntelHex,
}

#[derive(Debug, Default)]
pub struct Args {
    pub input_file: Option<PathBuf>,
    // -o <file>
    pub output_file: Option<PathBuf>,

    // --format srec|ihex; defaults to the input format
    pub output_format: Option<FileFormat>,
    // --stype 1|2|3; picked from the image when absent
    pub stype: Option<SType>,
    // --record-length N
    pub record_length: Option<usize>,
    // --base ADDR
    pub base: Option<u32>,
    pub lowercase: bool,
    // --contiguous: reject gaps between data records
    pub contiguous: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseArgError {
    MissingInputFile,
    MissingOutputFile,
    InvalidOption(String),
    InvalidNumber(String),
    InvalidValue { option: String, value: String },
    MissingValue(String),
}

impl std::fmt::Display for ParseArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingInputFile => write!(f, "missing input file"),
            Self::MissingOutputFile => write!(f, "missing output file (-o)"),
            Self::InvalidOption(s) => write!(f, "invalid option: {s}"),
            Self::InvalidNumber(s) => write!(f, "invalid number: {s}"),
            Self::InvalidValue { option, value } => {
                write!(f, "invalid value for {option}: {value}")
            }
            Self::MissingValue(s) => write!(f, "missing value for {s}"),
        }
    }
}

impl std::error::Error for ParseArgError {}

impl Args {
    pub fn parse() -> Result<Self, ParseArgError> {
        Self::parse_from(std::env::args().skip(1).collect())
    }

    pub fn parse_from(args: Vec<String>) -> Result<Self, ParseArgError> {
        let mut result = Args::default();
        let mut args_iter = args.into_iter();
        let mut force_positional = false;

        while let Some(arg) = args_iter.next() {
            if arg == "--" {
                force_positional = true;
                continue;
            }

            let is_option = !force_positional && arg.len() > 1 && arg.starts_with('-');
            if !is_option {
                if result.input_file.is_some() {
                    return Err(ParseArgError::InvalidOption(arg));
                }
                result.input_file = Some(PathBuf::from(arg));
                continue;
            }

            let (name, inline_value) = split_option(&arg);
            let mut value = || match inline_value {
                Some(v) => Ok(v.to_string()),
                None => args_iter
                    .next()
                    .ok_or_else(|| ParseArgError::MissingValue(name.to_string())),
            };
            parse_option(&mut result, name, inline_value.is_some(), &mut value)?;
        }

        if result.input_file.is_none() {
            return Err(ParseArgError::MissingInputFile);
        }
        if result.output_file.is_none() {
            return Err(ParseArgError::MissingOutputFile);
        }
        Ok(result)
    }
}
