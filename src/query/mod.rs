//! Query engine collaborator
//!
//! The projection core only needs a lazily evaluated, forward-only stream of
//! rows inside a read transaction. This module defines that seam and ships an
//! in-memory engine used by the server binary and the tests.

pub mod engine;
pub mod memory;
pub mod row;

// Re-export main types
pub use engine::{
    cypher_id, GraphQuery, NodeSelector, Params, QueryEngine, QueryError, QueryResult, ReadTransaction,
    ResultStream, RowStream, DESCRIBE_NODE_COLUMN, DESCRIBE_REL_COLUMN, DESCRIBE_VALUE_COLUMN,
};
pub use memory::MemoryEngine;
pub use row::{Relationship, Row, Value};
