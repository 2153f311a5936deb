//! Request handlers, one module per resource.

pub mod candidates;
pub mod decisions;
pub mod health_guard;
pub mod rank;
pub mod segments;
