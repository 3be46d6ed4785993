//! Filtres de Butterworth passe-haut / passe-bas, appliqués sans
//! distorsion de phase.
//!
//! Le filtre d'ordre N est réalisé en cascade de sections biquad
//! (Transposed Direct Form II, arithmétique f64) dont les Q proviennent
//! des angles des pôles du prototype de Butterworth ; un ordre impair
//! ajoute une section du premier ordre. L'application est aller-retour
//! (forward-backward) : la réponse en amplitude est élevée au carré et le
//! retard de groupe s'annule, ce que supposent l'alignement spectral et
//! le chronométrage des événements en aval.

use std::f64::consts::PI;

use bat_core::AudioSignal;

use crate::error::DspError;
use crate::stage::Stage;

/// Ordre utilisé quand l'appelant n'en précise pas.
pub const DEFAULT_ORDER: usize = 5;

/// Coefficients d'une section du second ordre, normalisés (a0 = 1).
#[derive(Clone, Copy, Debug)]
struct SectionCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl SectionCoeffs {
    /// Section passe-bas (formes du cookbook RBJ).
    fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Section passe-haut (formes du cookbook RBJ).
    fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 + cos_omega) / 2.0;
        let b1 = -(1.0 + cos_omega);
        let b2 = (1.0 + cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Section du premier ordre (transformation bilinéaire), pour les
    /// ordres impairs. `b2 = a2 = 0` : la section dégénère proprement.
    fn first_order(kind: FilterKind, freq: f64, sample_rate: f64) -> Self {
        let k = (PI * freq / sample_rate).tan();
        let a1 = (k - 1.0) / (k + 1.0);
        match kind {
            FilterKind::LowPass => {
                let b0 = k / (k + 1.0);
                Self {
                    b0,
                    b1: b0,
                    b2: 0.0,
                    a1,
                    a2: 0.0,
                }
            }
            FilterKind::HighPass => {
                let b0 = 1.0 / (k + 1.0);
                Self {
                    b0,
                    b1: -b0,
                    b2: 0.0,
                    a1,
                    a2: 0.0,
                }
            }
        }
    }
}

/// Section biquad Transposed Direct Form II.
#[derive(Clone, Debug)]
struct Section {
    coeffs: SectionCoeffs,
    z1: f64,
    z2: f64,
}

impl Section {
    fn new(coeffs: SectionCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline(always)]
    fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}

#[derive(Clone, Copy, Debug)]
enum FilterKind {
    LowPass,
    HighPass,
}

/// Cascade de sections réalisant un Butterworth d'ordre N.
#[derive(Clone, Debug)]
struct ButterworthCascade {
    sections: Vec<Section>,
}

impl ButterworthCascade {
    /// Conçoit la cascade pour la coupure et l'ordre donnés.
    ///
    /// Q des paires de pôles : `1 / (2·cos(φ))` avec, pour N pair,
    /// `φ = (2k+1)π/2N`, et pour N impair, `φ = kπ/N` plus un pôle réel
    /// réalisé en section du premier ordre.
    fn design(
        kind: FilterKind,
        cutoff_hz: f64,
        order: usize,
        sample_rate: f64,
    ) -> Result<Self, DspError> {
        let nyquist_hz = sample_rate / 2.0;
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist_hz {
            return Err(DspError::InvalidCutoff {
                cutoff_hz,
                nyquist_hz,
            });
        }
        if order == 0 {
            return Err(DspError::InvalidOrder { order });
        }

        let n = order as f64;
        let mut sections = Vec::with_capacity(order.div_ceil(2));

        if order % 2 == 1 {
            sections.push(Section::new(SectionCoeffs::first_order(
                kind,
                cutoff_hz,
                sample_rate,
            )));
        }

        let pairs = order / 2;
        for k in 0..pairs {
            let phi = if order % 2 == 0 {
                PI * (2 * k + 1) as f64 / (2.0 * n)
            } else {
                PI * (k + 1) as f64 / n
            };
            let q = 1.0 / (2.0 * phi.cos());
            let coeffs = match kind {
                FilterKind::LowPass => SectionCoeffs::lowpass(cutoff_hz, q, sample_rate),
                FilterKind::HighPass => SectionCoeffs::highpass(cutoff_hz, q, sample_rate),
            };
            sections.push(Section::new(coeffs));
        }

        log::debug!(
            "Butterworth {kind:?} ordre {order} : {} section(s)",
            sections.len()
        );
        Ok(Self { sections })
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    #[inline]
    fn process_sample(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |x, section| section.process_sample(x))
    }

    /// Application à phase nulle : passe avant, puis passe arrière, état
    /// remis à zéro entre les deux. La passe arrière parcourt le buffer
    /// en place de la fin vers le début, ce qui rend directement le
    /// résultat dans l'ordre temporel. La longueur de sortie est
    /// exactement celle de l'entrée.
    fn filtfilt(&mut self, samples: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();

        self.reset();
        for x in &mut buffer {
            *x = self.process_sample(*x);
        }

        self.reset();
        for x in buffer.iter_mut().rev() {
            *x = self.process_sample(*x);
        }

        buffer.into_iter().map(|x| x as f32).collect()
    }
}

/// Atténue les fréquences sous la coupure (Butterworth, phase nulle).
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// use bat_dsp::{HighPassFilter, Stage};
///
/// let input = AudioSignal::new(vec![0.0; 256], 48_000).unwrap();
/// let mut stage = HighPassFilter::new(input, 2_500.0).unwrap();
/// stage.process().unwrap();
/// assert_eq!(stage.output().unwrap().len(), 256);
/// ```
pub struct HighPassFilter {
    input: AudioSignal,
    cascade: ButterworthCascade,
    output: Option<AudioSignal>,
}

impl HighPassFilter {
    /// Ordre par défaut ([`DEFAULT_ORDER`]).
    ///
    /// # Errors
    /// [`DspError::InvalidCutoff`] si la coupure sort de `(0, Nyquist)`.
    pub fn new(input: AudioSignal, cutoff_hz: f64) -> Result<Self, DspError> {
        Self::with_order(input, cutoff_hz, DEFAULT_ORDER)
    }

    /// Ordre explicite.
    ///
    /// # Errors
    /// [`DspError::InvalidCutoff`] ou [`DspError::InvalidOrder`].
    pub fn with_order(
        input: AudioSignal,
        cutoff_hz: f64,
        order: usize,
    ) -> Result<Self, DspError> {
        let cascade = ButterworthCascade::design(
            FilterKind::HighPass,
            cutoff_hz,
            order,
            f64::from(input.sample_rate()),
        )?;
        Ok(Self {
            input,
            cascade,
            output: None,
        })
    }
}

impl Stage for HighPassFilter {
    type Output = AudioSignal;

    fn process(&mut self) -> Result<(), DspError> {
        let samples = self.cascade.filtfilt(self.input.samples());
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

/// Atténue les fréquences au-dessus de la coupure (Butterworth, phase nulle).
pub struct LowPassFilter {
    input: AudioSignal,
    cascade: ButterworthCascade,
    output: Option<AudioSignal>,
}

impl LowPassFilter {
    /// Ordre par défaut ([`DEFAULT_ORDER`]).
    ///
    /// # Errors
    /// [`DspError::InvalidCutoff`] si la coupure sort de `(0, Nyquist)`.
    pub fn new(input: AudioSignal, cutoff_hz: f64) -> Result<Self, DspError> {
        Self::with_order(input, cutoff_hz, DEFAULT_ORDER)
    }

    /// Ordre explicite.
    ///
    /// # Errors
    /// [`DspError::InvalidCutoff`] ou [`DspError::InvalidOrder`].
    pub fn with_order(
        input: AudioSignal,
        cutoff_hz: f64,
        order: usize,
    ) -> Result<Self, DspError> {
        let cascade = ButterworthCascade::design(
            FilterKind::LowPass,
            cutoff_hz,
            order,
            f64::from(input.sample_rate()),
        )?;
        Ok(Self {
            input,
            cascade,
            output: None,
        })
    }
}

impl Stage for LowPassFilter {
    type Output = AudioSignal;

    fn process(&mut self) -> Result<(), DspError> {
        let samples = self.cascade.filtfilt(self.input.samples());
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

#[cfg(test)]
mod tests {
    use super::*;

    const FS: u32 = 48_000;

    fn tone(freq: f64, seconds: f64) -> AudioSignal {
        let n = (seconds * f64::from(FS)) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / f64::from(FS)).sin() as f32)
            .collect();
        AudioSignal::new(samples, FS).expect("valid signal")
    }

    fn rms(samples: &[f32]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / samples.len() as f64).sqrt()
    }

    #[test]
    fn output_length_equals_input_length() {
        let input = tone(1_000.0, 0.1);
        let n = input.len();
        let mut stage = HighPassFilter::new(input, 2_000.0).expect("valid filter");
        stage.process().expect("filtering");
        assert_eq!(stage.output().expect("processed").len(), n);
    }

    #[test]
    fn highpass_attenuates_tone_below_cutoff() {
        // Tone at 0.1 × cutoff: order-5 zero-phase leaves essentially nothing.
        let input = tone(200.0, 0.5);
        let reference = rms(input.samples());
        let mut stage = HighPassFilter::new(input, 2_000.0).expect("valid filter");
        stage.process().expect("filtering");
        let out = stage.into_output().expect("processed");
        assert!(
            rms(out.samples()) < reference * 1e-3,
            "tone below cutoff survived the high-pass"
        );
    }

    #[test]
    fn lowpass_attenuates_tone_above_cutoff() {
        // Tone at 2 × cutoff: single pass ≈ 2⁻⁵, squared by the backward pass.
        let input = tone(8_000.0, 0.5);
        let reference = rms(input.samples());
        let mut stage = LowPassFilter::new(input, 4_000.0).expect("valid filter");
        stage.process().expect("filtering");
        let out = stage.into_output().expect("processed");
        assert!(
            rms(out.samples()) < reference * 0.05,
            "tone above cutoff survived the low-pass"
        );
    }

    #[test]
    fn lowpass_preserves_passband_tone() {
        let input = tone(1_000.0, 0.5);
        let reference = rms(input.samples());
        let mut stage = LowPassFilter::new(input, 4_000.0).expect("valid filter");
        stage.process().expect("filtering");
        let out = stage.into_output().expect("processed");
        assert!(
            rms(out.samples()) > reference * 0.7,
            "passband tone was attenuated"
        );
    }

    #[test]
    fn cascade_preserves_length_and_band() {
        // High-pass then low-pass with f1 < f2, per the chain contract.
        let input = tone(3_000.0, 0.25);
        let n = input.len();
        let mut hp = HighPassFilter::new(input, 2_000.0).expect("valid filter");
        hp.process().expect("high-pass");
        let mut lp = LowPassFilter::new(hp.into_output().expect("processed"), 4_000.0)
            .expect("valid filter");
        lp.process().expect("low-pass");
        let out = lp.into_output().expect("processed");
        assert_eq!(out.len(), n);
        assert!(rms(out.samples()) > 0.3, "in-band tone vanished");
    }

    #[test]
    fn odd_and_even_orders_both_design() {
        for order in 1..=6 {
            let input = tone(1_000.0, 0.01);
            let stage = LowPassFilter::with_order(input, 4_000.0, order);
            assert!(stage.is_ok(), "order {order} failed to design");
        }
    }

    #[test]
    fn cutoff_at_nyquist_is_a_configuration_error() {
        let input = tone(1_000.0, 0.01);
        assert!(matches!(
            LowPassFilter::new(input, f64::from(FS) / 2.0),
            Err(DspError::InvalidCutoff { .. })
        ));
    }

    #[test]
    fn non_positive_cutoff_is_a_configuration_error() {
        let input = tone(1_000.0, 0.01);
        assert!(matches!(
            HighPassFilter::new(input, 0.0),
            Err(DspError::InvalidCutoff { .. })
        ));
    }

    #[test]
    fn zero_order_is_a_configuration_error() {
        let input = tone(1_000.0, 0.01);
        assert!(matches!(
            HighPassFilter::with_order(input, 2_000.0, 0),
            Err(DspError::InvalidOrder { order: 0 })
        ));
    }

    #[test]
    fn reading_output_before_process_is_a_state_error() {
        let stage = LowPassFilter::new(tone(1_000.0, 0.01), 4_000.0).expect("valid filter");
        assert!(matches!(stage.output(), Err(DspError::NotProcessed)));
    }
}
