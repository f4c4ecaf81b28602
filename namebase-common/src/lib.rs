//! # Namebase Common Library
//!
//! Shared code for the namebase service:
//! - Error and result types
//! - Configuration loading and resolution
//! - Database initialization and row models
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
