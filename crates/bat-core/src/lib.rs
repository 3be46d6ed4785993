/// Signal entity, metrics, and shared configuration for batscope.
///
/// This crate contains the types every other batscope crate builds on:
/// the immutable [`signal::AudioSignal`], its derived metrics, and the
/// TOML-backed analysis configuration.

pub mod config;
pub mod error;
pub mod signal;

pub use config::AnalysisConfig;
pub use error::CoreError;
pub use signal::{AudioSignal, SignalMetrics};
