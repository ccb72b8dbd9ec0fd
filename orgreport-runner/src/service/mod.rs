//! Service layer
//!
//! Business logic of a report run. Services orchestrate repository calls:
//! the collector walks every page of the organization, the publisher writes
//! the artifact exactly once.

mod collector;
mod publisher;

pub use collector::PaginatedCollector;
pub use publisher::{ConflictPolicy, IdempotentPublisher, PublishOutcome};
