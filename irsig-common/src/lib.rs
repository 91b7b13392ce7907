//! IR Signature Lister - Common Types and Utilities
//!
//! This crate contains the shared types and error definitions used by
//! the frontend and the driver.

pub mod error;
pub mod source_loc;

pub use error::IrError;
pub use source_loc::{SourceLocation, SourceSpan};
