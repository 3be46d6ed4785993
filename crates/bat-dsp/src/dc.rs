use bat_core::AudioSignal;

use crate::error::DspError;
use crate::stage::Stage;

/// Retire la composante continue : sortie = échantillons − moyenne.
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// use bat_dsp::{DcRemover, Stage};
///
/// let input = AudioSignal::new(vec![1.0, 2.0, 3.0], 8_000).unwrap();
/// let mut stage = DcRemover::new(input);
/// stage.process().unwrap();
/// let out = stage.into_output().unwrap();
/// assert_eq!(out.samples(), &[-1.0, 0.0, 1.0]);
/// ```
pub struct DcRemover {
    input: AudioSignal,
    output: Option<AudioSignal>,
}

impl DcRemover {
    /// Aucun paramètre : l'offset est estimé par la moyenne arithmétique.
    #[must_use]
    pub fn new(input: AudioSignal) -> Self {
        Self {
            input,
            output: None,
        }
    }
}

impl Stage for DcRemover {
    type Output = AudioSignal;

    /// # Errors
    /// [`DspError::EmptyInput`] : la moyenne d'un signal vide est indéfinie.
    fn process(&mut self) -> Result<(), DspError> {
        if self.input.is_empty() {
            return Err(DspError::EmptyInput {
                operation: "retrait de la composante continue",
            });
        }

        let sum: f64 = self.input.samples().iter().map(|&s| f64::from(s)).sum();
        let mean = sum / self.input.len() as f64;

        let samples = self
            .input
            .samples()
            .iter()
            .map(|&s| (f64::from(s) - mean) as f32)
            .collect();

        self.output = Some(AudioSignal::new(samples, self.input.sample_rate())?);
        Ok(())
    }

    fn output(&self) -> Result<&AudioSignal, DspError> {
        self.output.as_ref().ok_or(DspError::NotProcessed)
    }

    fn into_output(self) -> Result<AudioSignal, DspError> {
        self.output.ok_or(DspError::NotProcessed)
    }
}
