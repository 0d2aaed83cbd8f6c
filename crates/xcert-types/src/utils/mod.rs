//! Utility functions for common type conversions.

pub mod conversion;
pub mod formatting;
pub mod helpers;

pub use conversion::{parse_bytes32, parse_uint256, ConversionError};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::{current_timestamp, sha};
