//! Configuration types
//!
//! Board-agnostic configuration structures and the parser for the TOML
//! file embedded in the firmware image.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
