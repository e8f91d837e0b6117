//! Measurements of compression results
//!
//! Contains reconstruction quality and coverage statistics

/// Error and coverage metrics for a compression run
pub mod quality;
