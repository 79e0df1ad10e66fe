//! # Mosaic Common
//!
//! Shared types, errors, and constants used across Mosaic components.
//!
//! ## Modules
//! - `types` - Wire types (PartialPayload, captcha DTOs)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::MosaicError;
pub use types::*;
