//! Core types for emerge's extraction pipeline.
//!
//! Provides the result data model ([`results::FileResult`], [`results::EntityResult`]
//! and the [`results::ResultSet`] arena that owns them), the run-scoped
//! [`analysis::Analysis`] context with its diagnostics counters, language tags,
//! and configuration loading.

pub mod analysis;
pub mod config;
pub mod error;
pub mod language;
pub mod results;
pub mod statistics;

pub use error::{Error, Result};
