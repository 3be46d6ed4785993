use thiserror::Error;

/// Errors originating from the event detector.
#[derive(Error, Debug)]
pub enum DetectError {
    /// Energy threshold must be non-negative.
    #[error("Seuil d'énergie négatif : {threshold}")]
    NegativeThreshold {
        /// The rejected threshold.
        threshold: f64,
    },

    /// Frame duration must span at least one sample.
    #[error("Durée de frame invalide : {frame_duration_ms} ms à {sample_rate} Hz")]
    InvalidFrameDuration {
        /// Requested frame duration, milliseconds.
        frame_duration_ms: f64,
        /// Sample rate of the input signal.
        sample_rate: u32,
    },
}
