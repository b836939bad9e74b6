use hexrec::SType;

use super::types::{Args, FileFormat, ParseArgError};


/// Split `--name=value` into its name and inline value.
pub(super) fn split_option(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((name, value)) if name.starts_with("--") => (name, Some(value)),
        _ => (arg, None),
    }
}

pub(super) fn parse_option(
    result: &mut Args,
    name: &str,
    has_inline_value: bool,
    value: &mut dyn FnMut() -> Result<String, ParseArgError>,
) -> Result<(), ParseArgError> {
    let flag = |set: &mut bool| {
        if has_inline_value {
            return Err(ParseArgError::InvalidOption(name.to_string()));
        }
        *set = true;
        Ok(())
    };

    match name {
        "-o" | "--output" => result.output_file = Some(value()?.into()),
        "-f" | "--format" => {
            let v = value()?;
            result.output_format = Some(parse_format(&v).ok_or_else(|| invalid(name, &v))?);
        }
        "--stype" => {
            let v = value()?;
            result.stype = Some(parse_stype(&v).ok_or_else(|| invalid(name, &v))?);
        }
        "-l" | "--record-length" => {
            let v = value()?;
            let len = parse_number(&v)?;
            if len == 0 || len > 255 {
                return Err(invalid(name, &v));
            }
            result.record_length = Some(len as usize);
        }
        "-b" | "--base" => result.base = Some(parse_number(&value()?)?),
        "--lowercase" => flag(&mut result.lowercase)?,
        "--contiguous" => flag(&mut result.contiguous)?,
        "-v" | "--verbose" => flag(&mut result.verbose)?,
        _ => return Err(ParseArgError::InvalidOption(name.to_string())),
    }
    Ok(())
}

fn invalid(option: &str, value: &str) -> ParseArgError {
    ParseArgError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

pub(super) fn parse_format(s: &str) -> Option<FileFormat> {
    match s.to_ascii_lowercase().as_str() {
        "srec" | "s19" | "s28" | "s37" | "mot" => Some(FileFormat::SRecord),
        "ihex" | "hex" | "intel" => Some(FileFormat::IntelHex),
        _ => None,
    }
}

pub(super) fn parse_stype(s: &str) -> Option<SType> {
    match s.trim_start_matches(['S', 's']) {
        "1" => Some(SType::S1),
        "2" => Some(SType::S2),
        "3" => Some(SType::S3),
        _ => None,
    }
}

/// Parse a decimal or `0x`-prefixed hex number. `_` separators are ignored.
pub(super) fn parse_number(s: &str) -> Result<u32, ParseArgError> {
    let s = s.trim();
    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, s),
    };

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(ParseArgError::InvalidNumber(s.to_string()));
    }
    u32::from_str_radix(&cleaned, radix).map_err(|_| ParseArgError::InvalidNumber(s.to_string()))
}
