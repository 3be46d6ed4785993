use bat_core::AudioSignal;
use realfft::RealFftPlanner;

use crate::error::DspError;
use crate::stage::Stage;

/// Spectre d'amplitude unilatéral : les `N/2` premiers bins.
///
/// Le bin `k` couvre la fréquence `k · sample_rate / N`. Les amplitudes
/// sont les modules bruts de la transformée, sans fenêtrage ni
/// normalisation : les consommateurs comparent des bins entre eux, pas
/// des niveaux absolus.
#[derive(Clone, Debug)]
pub struct Spectrum {
    /// Module de chaque bin.
    pub magnitudes: Vec<f32>,
    /// Fréquence centrale de chaque bin, en Hz.
    pub frequencies: Vec<f32>,
    /// Fréquence d'échantillonnage du signal analysé (les consommateurs
    /// en ont besoin pour borner l'affichage à Nyquist).
    pub sample_rate: u32,
}

/// Calcule le spectre d'amplitude unilatéral du signal entier.
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// use bat_dsp::{SpectrumAnalyzer, Stage};
///
/// let input = AudioSignal::new(vec![0.0; 1_024], 8_000).unwrap();
/// let mut stage = SpectrumAnalyzer::new(input);
/// stage.process().unwrap();
/// let spectrum = stage.into_output().unwrap();
/// assert_eq!(spectrum.magnitudes.len(), 512);
/// assert_eq!(spectrum.frequencies.len(), 512);
/// ```
pub struct SpectrumAnalyzer {
    input: AudioSignal,
    output: Option<Spectrum>,
}

impl SpectrumAnalyzer {
    #[must_use]
    pub fn new(input: AudioSignal) -> Self {
        Self {
            input,
            output: None,
        }
    }
}

impl Stage for SpectrumAnalyzer {
    type Output = Spectrum;

    /// # Errors
    /// [`DspError::EmptyInput`] : la transformée d'un signal vide est
    /// indéfinie.
    fn process(&mut self) -> Result<(), DspError> {
        let n = self.input.len();
        if n == 0 {
            return Err(DspError::EmptyInput { operation: "FFT" });
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(n);

        let mut input_buf = plan.make_input_vec();
        input_buf.copy_from_slice(self.input.samples());
        let mut spectrum_buf = plan.make_output_vec();
        let mut scratch = plan.make_scratch_vec();

        plan.process_with_scratch(&mut input_buf, &mut spectrum_buf, &mut scratch)
            .map_err(|e| DspError::Fft(e.to_string()))?;

        let half = n / 2;
        let bin_hz = self.input.sample_rate() as f32 / n as f32;

        self.output = Some(Spectrum {
            magnitudes: spectrum_buf[..half]
                .iter()
                .map(|c| (c.re * c.re + c.im * c.im).sqrt())
                .collect(),
            frequencies: (0..half).map(|k| k as f32 * bin_hz).collect(),
            sample_rate: self.input.sample_rate(),
        });
        Ok(())
    }

    fn output(&self) -> Result<&Spectrum, DspError> {
        self.output.as_ref().ok_or(DspError::NotProcessed)
    }

    fn into_output(self) -> Result<Spectrum, DspError> {
        self.output.ok_or(DspError::NotProcessed)
    }
}
