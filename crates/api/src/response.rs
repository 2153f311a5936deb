//! Response envelope for list endpoints.

use serde::Serialize;

/// Wraps a collection as `{ "data": [...] }` on the wire.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
}
