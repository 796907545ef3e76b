//! Per-pass performance metrics for the synchronization engine.
//!
//! [`SyncMetrics`] captures timing and counter data for a single pass,
//! plus cumulative pass counts for the session.

/// Timing and counter metrics collected during a single sync pass.
///
/// All durations are in microseconds. The engine fills these after each
/// [`sync()`](crate::SyncContext::sync) call, including passes that end in
/// an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncMetrics {
    /// Wall-clock time for the entire pass, in microseconds.
    pub total_us: u64,
    /// Time spent advancing the time axis, in microseconds.
    pub time_axis_us: u64,
    /// Time spent resolving state paths (full passes only), in microseconds.
    pub resolve_us: u64,
    /// Time spent creating nodes and recording values, in microseconds.
    pub materialize_us: u64,
    /// Time spent refreshing existing leaves (incremental passes only),
    /// in microseconds.
    pub update_us: u64,
    /// Number of state identifiers in the step results.
    pub states_seen: usize,
    /// Cumulative number of full passes in this session.
    pub full_passes: u64,
    /// Cumulative number of incremental passes in this session.
    pub incremental_passes: u64,
}
