//! Storage Gateway: the only component that holds connections to the relational store

mod errors;
mod gateway;
mod schema;
mod types;

pub use errors::StorageError;
pub use gateway::StorageGateway;
pub use types::SqlValue;
