//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs for the operations that write to it

pub mod candidate;
pub mod decision;
pub mod guard;
pub mod outcome;
pub mod segment_rollup;
