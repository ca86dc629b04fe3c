//! Store write operations
//!
//! Bulk inserts and conflict-tolerant upserts executed as a single request.

pub mod operation;

pub use operation::{Resolution, Returning, Write, WriteResult};
