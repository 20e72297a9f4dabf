//! # lmix Common Library
//!
//! Shared code for the lmix workspace:
//! - Error and result types
//! - TOML configuration file model and loading

pub mod config;
pub mod error;

pub use error::{Error, Result};
