//! Build script for memprobe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates memprobe.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest window a bank can back (must match memprobe-hal-rp2040)
const MAX_WINDOW_SIZE: i64 = 0x8000;

/// Longest USB string descriptor value (must match memprobe-core)
const MAX_USB_STRING_LEN: usize = 32;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("failed to create memory.x");
    f.write_all(memory_x).expect("failed to write memory.x");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    #[cfg(feature = "defmt")]
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate memprobe.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=memprobe.toml");

    let config_path = Path::new("memprobe.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: memprobe.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds memprobe.toml at build time.                ║\n\
            ║  Please create one in the memprobe-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read memprobe.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in memprobe.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_region(&config, &mut errors);
    validate_self_test(&config, &mut errors);
    validate_usb(&config, &mut errors);
    validate_probe(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in memprobe.toml                   ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=memprobe.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only known sections may appear, and only as tables
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        match name.as_str() {
            "region" | "self_test" | "usb" | "probe" => {
                if !value.is_table() {
                    errors.push(format!("[{}] must be a table", name));
                }
            }
            _ => errors.push(format!("Unknown section or key '{}'", name)),
        }
    }
}

/// Look up an integer key, recording an error if it has the wrong type
fn get_int(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    let value = config.get(section)?.get(key)?;
    match value.as_integer() {
        Some(v) => Some(v),
        None => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            None
        }
    }
}

fn validate_region(config: &toml::Value, errors: &mut Vec<String>) {
    let start = get_int(config, "region", "start", errors).unwrap_or(0x2000);
    let end = get_int(config, "region", "end", errors).unwrap_or(0x4000);

    for (key, value) in [("start", start), ("end", end)] {
        if !(0..=0xFFFF).contains(&value) {
            errors.push(format!("[region] '{}' = {} is outside 0..=0xFFFF", key, value));
        }
    }
    if start >= end {
        errors.push(format!("[region] start ({:#06x}) must be below end ({:#06x})", start, end));
    } else if end - start > MAX_WINDOW_SIZE {
        errors.push(format!(
            "[region] window of {} bytes exceeds {} per bank",
            end - start,
            MAX_WINDOW_SIZE
        ));
    }
}

fn validate_self_test(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(section) = config.get("self_test") else {
        return;
    };
    if let Some(value) = section.get("run_at_boot") {
        if !value.is_bool() {
            errors.push("[self_test] 'run_at_boot' must be true or false".to_string());
        }
    }
    if let Some(value) = section.get("descending_sweep") {
        match value.as_str() {
            Some("reference") | Some("window") => {}
            _ => errors.push(
                "[self_test] 'descending_sweep' must be \"reference\" or \"window\"".to_string(),
            ),
        }
    }
}

fn validate_usb(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["vid", "pid"] {
        if let Some(value) = get_int(config, "usb", key, errors) {
            if !(0..=0xFFFF).contains(&value) {
                errors.push(format!("[usb] '{}' = {} is outside 0..=0xFFFF", key, value));
            }
        }
    }

    let Some(section) = config.get("usb") else {
        return;
    };
    for key in ["manufacturer", "product", "serial"] {
        let Some(value) = section.get(key) else {
            continue;
        };
        match value.as_str() {
            Some(s) if s.len() > MAX_USB_STRING_LEN => errors.push(format!(
                "[usb] '{}' is longer than {} bytes",
                key, MAX_USB_STRING_LEN
            )),
            Some(_) => {}
            None => errors.push(format!("[usb] '{}' must be a string", key)),
        }
    }
}

fn validate_probe(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(interval) = get_int(config, "probe", "poll_interval_ms", errors) {
        if !(1..=0xFFFF).contains(&interval) {
            errors.push(format!(
                "[probe] 'poll_interval_ms' = {} must be between 1 and 65535",
                interval
            ));
        }
    }
}
