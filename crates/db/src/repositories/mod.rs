//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods that
//! accept `&PgPool` as the first argument.

pub mod breaker_repo;
pub mod candidate_repo;
pub mod decision_repo;
pub mod epsilon_repo;
pub mod lkg_repo;
pub mod outcome_repo;
pub mod segment_rollup_repo;

pub use breaker_repo::BreakerRepo;
pub use candidate_repo::CandidateRepo;
pub use decision_repo::DecisionRepo;
pub use epsilon_repo::EpsilonRepo;
pub use lkg_repo::LkgRepo;
pub use outcome_repo::OutcomeRepo;
pub use segment_rollup_repo::SegmentRollupRepo;
