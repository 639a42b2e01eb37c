//! Strata Common - Core types and utilities shared across all crates
//!
//! This crate provides the foundational types used throughout Strata:
//! - `ElementType`: the storage tag of vectors and blocks
//! - `DataType`: declared operand types and their widening rules
//! - `Value`: row-at-a-time value representation
//! - `Error`: unified error types
//! - `ComputeConfig` and process logging setup

pub mod config;
pub mod element_type;
pub mod error;
pub mod logging;
pub mod source;
pub mod types;
pub mod value;

pub use config::ComputeConfig;
pub use element_type::ElementType;
pub use error::{Error, ResolutionFailure, Result};
pub use source::{Location, Source};
pub use types::DataType;
pub use value::Value;
