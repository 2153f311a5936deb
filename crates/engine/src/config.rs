//! Engine tuning knobs loaded from environment variables.

use chrono::Utc;

use modelpick_core::explore::{clamp_epsilon, DEFAULT_EPSILON};
use modelpick_core::types::Timestamp;

/// Breaker hold after an ordinary failure report.
pub const NORMAL_BREAK_SECS: i64 = 300;

/// Breaker hold after a severe failure report (auth revoked, outage).
pub const SEVERE_BREAK_SECS: i64 = 1_800;

/// Lifetime of a last-known-good entry.
pub const LKG_TTL_SECS: i64 = 3_600;

/// Trailing window for rollups and candidate snapshots.
pub const ROLLUP_WINDOW_HOURS: i64 = 24;

/// Rank deadline when the request does not carry one.
pub const DEFAULT_DEADLINE_MS: u64 = 10_000;

/// Engine configuration.
///
/// All fields have defaults suitable for local development; production
/// overrides via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Starting epsilon for segments without adaptive state.
    pub epsilon_default: f64,
    /// Breaker hold in seconds for ordinary failures (default: `300`).
    pub normal_break_secs: i64,
    /// Breaker hold in seconds for severe failures (default: `1800`).
    pub severe_break_secs: i64,
    /// Last-known-good TTL in seconds (default: `3600`).
    pub lkg_ttl_secs: i64,
    /// Rolling window in hours for rollups and snapshots (default: `24`).
    pub rollup_window_hours: i64,
    /// Rank deadline in milliseconds when the request carries none
    /// (default: `10000`).
    pub default_deadline_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon_default: DEFAULT_EPSILON,
            normal_break_secs: NORMAL_BREAK_SECS,
            severe_break_secs: SEVERE_BREAK_SECS,
            lkg_ttl_secs: LKG_TTL_SECS,
            rollup_window_hours: ROLLUP_WINDOW_HOURS,
            default_deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `EXPLORE_EPSILON`     | `0.10`  |
    /// | `BREAKER_NORMAL_SECS` | `300`   |
    /// | `BREAKER_SEVERE_SECS` | `1800`  |
    /// | `LKG_TTL_SECS`        | `3600`  |
    /// | `ROLLUP_WINDOW_HOURS` | `24`    |
    /// | `RANK_DEADLINE_MS`    | `10000` |
    pub fn from_env() -> Self {
        let epsilon_default: f64 = std::env::var("EXPLORE_EPSILON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EPSILON);

        let normal_break_secs: i64 = std::env::var("BREAKER_NORMAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(NORMAL_BREAK_SECS);

        let severe_break_secs: i64 = std::env::var("BREAKER_SEVERE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SEVERE_BREAK_SECS);

        let lkg_ttl_secs: i64 = std::env::var("LKG_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LKG_TTL_SECS);

        let rollup_window_hours: i64 = std::env::var("ROLLUP_WINDOW_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(ROLLUP_WINDOW_HOURS);

        let default_deadline_ms: u64 = std::env::var("RANK_DEADLINE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DEADLINE_MS);

        Self {
            epsilon_default: clamp_epsilon(epsilon_default),
            normal_break_secs,
            severe_break_secs,
            lkg_ttl_secs,
            rollup_window_hours,
            default_deadline_ms,
        }
    }

    /// When a breaker opened now would release.
    pub fn break_until(&self, severe: bool) -> Timestamp {
        let hold = if severe {
            self.severe_break_secs
        } else {
            self.normal_break_secs
        };
        Utc::now() + chrono::Duration::seconds(hold)
    }

    /// Expiry for a last-known-good entry recorded now.
    pub fn lkg_expires_at(&self) -> Timestamp {
        Utc::now() + chrono::Duration::seconds(self.lkg_ttl_secs)
    }

    /// Start of the current rolling aggregation window.
    pub fn window_start(&self) -> Timestamp {
        Utc::now() - chrono::Duration::hours(self.rollup_window_hours)
    }
}
