use bat_core::CoreError;
use thiserror::Error;

/// Errors originating from the processing stages.
#[derive(Error, Debug)]
pub enum DspError {
    /// A stage output was read before `process` ran.
    #[error("La sortie n'est pas encore disponible : appeler `process` d'abord")]
    NotProcessed,

    /// Cutoff frequency outside `(0, Nyquist)`.
    #[error("Fréquence de coupure invalide : {cutoff_hz} Hz (Nyquist : {nyquist_hz} Hz)")]
    InvalidCutoff {
        /// Requested cutoff.
        cutoff_hz: f64,
        /// Half the sample rate of the input.
        nyquist_hz: f64,
    },

    /// Filter order must be at least 1.
    #[error("Ordre de filtre invalide : {order}")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
    },

    /// Segment window outside the valid parameter space.
    #[error("Fenêtre de segment invalide : début {start_time} s, durée {duration} s")]
    InvalidSegment {
        /// Requested start, seconds.
        start_time: f64,
        /// Requested duration, seconds.
        duration: f64,
    },

    /// Operation is mathematically undefined on an empty input.
    #[error("Entrée vide : {operation} indéfini")]
    EmptyInput {
        /// Operation that needed at least one sample.
        operation: &'static str,
    },

    /// The FFT backend rejected the buffer.
    #[error("Échec de la FFT : {0}")]
    Fft(String),

    /// Error bubbled up from the core signal entity.
    #[error(transparent)]
    Core(#[from] CoreError),
}
