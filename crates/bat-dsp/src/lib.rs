// Processing stages for batscope: DC removal, segmentation, band-pass
// filtering, and spectral analysis.

pub mod dc;
pub mod error;
pub mod filter;
pub mod segment;
pub mod spectrum;
pub mod stage;

pub use dc::DcRemover;
pub use error::DspError;
pub use filter::{HighPassFilter, LowPassFilter};
pub use segment::Segmenter;
pub use spectrum::{Spectrum, SpectrumAnalyzer};
pub use stage::Stage;
