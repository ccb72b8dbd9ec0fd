//! Orgreport Core
//!
//! Core types and abstractions for the organization report pipeline.
//!
//! This crate contains:
//! - Domain types: repository records, page cursors, publish targets
//! - Predicates: pure per-repository checks evaluated on fetched nodes
//! - Report kinds and the report builder (sorting, header, CSV)
//! - DTOs: wire shapes of the GitHub GraphQL and contents APIs
//!
//! Nothing in here performs I/O.

pub mod csv;
pub mod domain;
pub mod dto;
pub mod error;
pub mod kind;
pub mod predicate;
pub mod report;

pub use error::ReportError;
