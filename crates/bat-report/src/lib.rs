// Export of analysis results: CSV event table, JSON report, and WAV
// clips of the detected events.

pub mod csv;
pub mod json;
pub mod wav;

pub use csv::write_events_csv;
pub use json::{AnalysisReport, write_report};
pub use wav::write_event_clips;
