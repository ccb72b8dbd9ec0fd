//! Core domain types
//!
//! These types describe what a single report run fetches and where it
//! writes. They are owned by the run and never outlive the process.

pub mod page;
pub mod repository;
pub mod target;
