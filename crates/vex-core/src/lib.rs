//! VexCore — OpenVEX document model, parsing, and statement validation.

pub mod document;
pub mod statement;
pub mod types;

pub use types::*;
