//! Pure domain logic for the candidate ranking engine.
//!
//! Everything in this crate is deterministic and side-effect free (the only
//! exception is the injected RNG in [`explore`]): candidate profiles, feature
//! extraction, the coarse and fine ranking passes, and the epsilon-greedy
//! exploration policy. Persistence lives in `modelpick-db`, orchestration in
//! `modelpick-engine`.

pub mod candidate;
pub mod capabilities;
pub mod coarse;
pub mod error;
pub mod estimate;
pub mod explore;
pub mod features;
pub mod filters;
pub mod fine;
pub mod segment;
pub mod task;
pub mod types;
pub mod validation;
pub mod weights;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
