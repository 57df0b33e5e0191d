//! # TrendBasket Common Library
//!
//! Shared code for the TrendBasket crates:
//! - Error and result types
//! - TOML configuration loading and data folder resolution
//! - Logging bootstrap

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
