//! Embedded configuration loading
//!
//! memprobe.toml is compiled into the image. build.rs has already checked
//! it, so the fallbacks below only trigger if the host check and the
//! on-target parser disagree.

use defmt::*;

use memprobe_core::config::{parse_config, ProbeConfig};
use memprobe_hal_rp2040::SramWindow;

/// Embedded configuration (compiled into firmware)
/// Edit memprobe.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../memprobe.toml");

/// Parse the embedded configuration, falling back to defaults on error
pub fn load_config() -> ProbeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            ProbeConfig::default()
        }
    }
}

/// Fit the configured region to the bank storage
///
/// On failure the default window is used and `config.region` is updated to
/// match, so the interpreter and the memory agree on the window.
pub fn resolve_window(config: &mut ProbeConfig) -> SramWindow {
    match SramWindow::new(config.region) {
        Ok(window) => window,
        Err(e) => {
            error!(
                "Region {:#06x}..={:#06x} unusable: {:?}",
                config.region.start, config.region.end, e
            );
            let window = SramWindow::default();
            warn!(
                "Falling back to {:#06x}..={:#06x}",
                window.region().start,
                window.region().end
            );
            config.region = window.region();
            window
        }
    }
}
