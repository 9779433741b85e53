//! Core types and trait definitions for the matchup pairing service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod engine;
pub mod error;
pub mod group;
pub mod participant;
pub mod policy;
pub mod reveal;
pub mod store;

pub use engine::MatchEngine;
pub use error::Error;
