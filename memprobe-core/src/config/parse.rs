//! Parser for the embedded device configuration
//!
//! Minimal TOML subset parser, enough for `memprobe.toml`:
//!
//! - `[section]` headers (`region`, `self_test`, `usb`, `probe`)
//! - `key = value` pairs with string, integer (decimal or `0x` hex) and
//!   boolean values
//! - Comments (`# ...`), full-line and trailing
//!
//! The firmware build script validates the same file with the full `toml`
//! crate, so this parser only has to accept well-formed input.

use heapless::String;

use super::types::{ProbeConfig, MAX_USB_STRING_LEN};
use crate::memtest::DescendingSweep;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key not known in its section
    UnknownKey,
    /// Line is neither a header nor a key/value pair
    InvalidLine,
    /// Region start is not below region end
    InvalidRegion,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Region,
    SelfTest,
    Usb,
    Probe,
}

/// Parse TOML configuration into a `ProbeConfig`
///
/// Keys that are not present keep their default value.
pub fn parse_config(input: &str) -> Result<ProbeConfig, ParseError> {
    let mut config = ProbeConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    if !config.region.is_valid() {
        return Err(ParseError::InvalidRegion);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "region" => Ok(Section::Region),
        "self_test" => Ok(Section::SelfTest),
        "usb" => Ok(Section::Usb),
        "probe" => Ok(Section::Probe),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    config: &mut ProbeConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Region, "start") => config.region.start = parse_int(value)?,
        (Section::Region, "end") => config.region.end = parse_int(value)?,

        (Section::SelfTest, "run_at_boot") => config.self_test.run_at_boot = parse_bool(value)?,
        (Section::SelfTest, "descending_sweep") => {
            config.self_test.descending_sweep = parse_sweep(value)?
        }

        (Section::Usb, "vid") => config.usb.vid = parse_int(value)?,
        (Section::Usb, "pid") => config.usb.pid = parse_int(value)?,
        (Section::Usb, "manufacturer") => config.usb.manufacturer = parse_label(value)?,
        (Section::Usb, "product") => config.usb.product = parse_label(value)?,
        (Section::Usb, "serial") => config.usb.serial = parse_label(value)?,

        (Section::Probe, "poll_interval_ms") => {
            let interval: u16 = parse_int(value)?;
            if interval == 0 {
                return Err(ParseError::InvalidValue);
            }
            config.probe.poll_interval_ms = interval;
        }

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Cut a line at the first `#` that is not inside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut escaped = false;
    for (pos, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..pos],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_label(value: &str) -> Result<String<MAX_USB_STRING_LEN>, ParseError> {
    String::try_from(parse_string(value)).map_err(|_| ParseError::InvalidValue)
}

/// Parse an integer value, decimal or `0x` hex
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let raw = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&strip_separators(hex)?, 16),
        None => strip_separators(value)?.parse(),
    }
    .map_err(|_| ParseError::InvalidValue)?;
    T::try_from(raw).map_err(|_| ParseError::InvalidValue)
}

/// Drop TOML `_` digit separators
fn strip_separators(value: &str) -> Result<String<16>, ParseError> {
    let mut digits = String::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::InvalidValue)?;
    }
    Ok(digits)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_sweep(value: &str) -> Result<DescendingSweep, ParseError> {
    match parse_string(value) {
        "reference" => Ok(DescendingSweep::Reference),
        "window" => Ok(DescendingSweep::Window),
        _ => Err(ParseError::InvalidValue),
    }
}
