use bat_core::AudioSignal;

use crate::error::DspError;
use crate::stage::Stage;

/// Extrait une fenêtre temporelle du signal.
///
/// La conversion en indices d'échantillons arrondit :
/// `start = round(start_time · fs)`, `end = start + round(duration · fs)`,
/// intervalle semi-ouvert. Une fenêtre qui dépasse la fin du signal est
/// tronquée à ce qui est disponible, sans erreur.
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// use bat_dsp::{Segmenter, Stage};
///
/// let input = AudioSignal::new(vec![0.0; 8_000], 8_000).unwrap();
/// let mut stage = Segmenter::new(input, 0.5, 0.25).unwrap();
/// stage.process().unwrap();
/// assert_eq!(stage.output().unwrap().len(), 2_000);
/// ```
pub struct Segmenter {
    input: AudioSignal,
    start_time: f64,
    duration: f64,
    output: Option<AudioSignal>,
}

impl Segmenter {
    /// Construit le segmenteur.
    ///
    /// # Errors
    /// [`DspError::InvalidSegment`] si `start_time < 0`, `duration ≤ 0`,
    /// ou si l'un des deux n'est pas fini.
    pub fn new(input: AudioSignal, start_time: f64, duration: f64) -> Result<Self, DspError> {
        if !start_time.is_finite() || !duration.is_finite() || start_time < 0.0 || duration <= 0.0
        {
            return Err(DspError::InvalidSegment {
                start_time,
                duration,
            });
        }
        Ok(Self {
            input,
            start_time,
            duration,
            output: None,
        })
    }
}

impl Stage for Segmenter {
    type Output = AudioSignal;

    fn process(&mut self) -> Result<(), DspError> {
        let fs = f64::from(self.input.sample_rate());
        let available = self.input.len();

        let start = ((self.start_time * fs).round() as usize).min(available);
        let wanted = (self.duration * fs).round() as usize;
        let end = start.saturating_add(wanted).min(available);

        let samples = self.input.samples()[start..end].to_vec();
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
