//! Common Types and Error Handling

pub mod error;

pub use error::{Result, ZDropError};
