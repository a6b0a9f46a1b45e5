//! Rolling-window 90/180 compliance engine.
//!
//! Pure, deterministic computation: a [`ComplianceResult`] is always a
//! function of `(intervals, reference_date)` and is never stored as a
//! source of truth. Every query recomputes the window from scratch;
//! incremental sliding-window state is deliberately avoided because the
//! interval set can mutate between queries.

mod engine;
mod timeline;

pub use engine::{ComplianceCalculator, ComplianceResult, ComplianceWindow, IntervalUsage};
pub use timeline::DayUsage;
