use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Sample rate must be strictly positive.
    #[error("Fréquence d'échantillonnage invalide : {rate} Hz")]
    InvalidSampleRate {
        /// The rejected rate.
        rate: u32,
    },

    /// Operation is mathematically undefined on an empty signal.
    #[error("Signal vide : {operation} indéfini")]
    EmptySignal {
        /// Operation that needed at least one sample.
        operation: &'static str,
    },

    /// Dynamic range is undefined when every sample is zero.
    #[error("Signal silencieux : dynamique indéfinie (tous les échantillons sont nuls)")]
    SilentSignal,
}
