//! Data Transfer Objects for the GitHub APIs
//!
//! Wire shapes of the GraphQL repository listing and the REST contents
//! endpoint. Domain types are produced from these at the edge so nothing
//! past the client crate sees raw GitHub JSON.

pub mod contents;
pub mod graphql;
