use crate::error::CoreError;

/// Une séquence mono d'échantillons avec sa fréquence d'échantillonnage.
///
/// Immuable après construction : chaque étage de traitement produit un
/// nouveau `AudioSignal` plutôt que de modifier son entrée.
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// let signal = AudioSignal::new(vec![0.0, 0.5, -0.5], 48_000).unwrap();
/// assert_eq!(signal.len(), 3);
/// assert!((signal.duration_secs() - 3.0 / 48_000.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct AudioSignal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSignal {
    /// Construit un signal mono.
    ///
    /// # Errors
    /// Retourne [`CoreError::InvalidSampleRate`] si `sample_rate == 0`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, CoreError> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Construit un signal mono depuis des données entrelacées
    /// multi-canal en ne conservant que le canal 0. Sélection
    /// déterministe : jamais de downmix.
    ///
    /// # Errors
    /// Retourne [`CoreError::InvalidSampleRate`] si `sample_rate == 0`,
    /// [`CoreError::Config`] si `channels == 0`.
    pub fn from_interleaved(
        interleaved: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, CoreError> {
        if channels == 0 {
            return Err(CoreError::Config(String::from(
                "nombre de canaux nul",
            )));
        }
        let samples = interleaved.iter().step_by(channels).copied().collect();
        Self::new(samples, sample_rate)
    }

    /// Les échantillons, dans l'ordre temporel.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Fréquence d'échantillonnage en Hz (strictement positive).
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nombre d'échantillons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` si le signal ne contient aucun échantillon.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Durée en secondes (`len / sample_rate`).
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Calcule le résumé métrique du signal.
    ///
    /// Dérivation pure, sans effet de bord. Les accumulations se font en
    /// f64 pour rester stables sur de longs enregistrements.
    ///
    /// # Errors
    /// Retourne [`CoreError::EmptySignal`] pour un signal vide et
    /// [`CoreError::SilentSignal`] pour un signal entièrement nul : la
    /// dynamique (`20·log10(peak / mean|x|)`) y est indéfinie. Jamais
    /// de NaN ni de ±∞ en sortie.
    pub fn metrics(&self) -> Result<SignalMetrics, CoreError> {
        if self.samples.is_empty() {
            return Err(CoreError::EmptySignal {
                operation: "calcul des métriques",
            });
        }

        let mut energy = 0.0_f64;
        let mut abs_sum = 0.0_f64;
        let mut peak = 0.0_f64;
        for &s in &self.samples {
            let s = f64::from(s);
            energy += s * s;
            abs_sum += s.abs();
            peak = peak.max(s.abs());
        }

        if peak == 0.0 {
            return Err(CoreError::SilentSignal);
        }

        let n = self.samples.len() as f64;
        let mean_abs = abs_sum / n;

        Ok(SignalMetrics {
            energy,
            peak,
            rms: (energy / n).sqrt(),
            dynamic_range_db: 20.0 * (peak / mean_abs).log10(),
        })
    }
}

/// Résumé métrique en lecture seule d'un [`AudioSignal`].
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct SignalMetrics {
    /// Énergie totale : somme des carrés des échantillons.
    pub energy: f64,
    /// Amplitude absolue maximale.
    pub peak: f64,
    /// `sqrt(mean(x²))`.
    pub rms: f64,
    /// `20·log10(peak / mean(|x|))`.
    pub dynamic_range_db: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            AudioSignal::new(vec![0.1], 0),
            Err(CoreError::InvalidSampleRate { rate: 0 })
        ));
    }

    #[test]
    fn duration_matches_sample_count() {
        let signal = AudioSignal::new(vec![0.0; 48_000], 48_000).expect("valid signal");
        assert!((signal.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn from_interleaved_keeps_first_channel() {
        let stereo = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        let signal = AudioSignal::from_interleaved(&stereo, 2, 44_100).expect("valid signal");
        assert_eq!(signal.samples(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn metrics_on_known_signal() {
        let signal = AudioSignal::new(vec![1.0, -1.0, 1.0, -1.0], 8_000).expect("valid signal");
        let m = signal.metrics().expect("metrics defined");
        assert!((m.energy - 4.0).abs() < 1e-12);
        assert!((m.peak - 1.0).abs() < 1e-12);
        assert!((m.rms - 1.0).abs() < 1e-12);
        // peak == mean|x| => 0 dB
        assert!(m.dynamic_range_db.abs() < 1e-12);
    }

    #[test]
    fn metrics_fail_on_empty_signal() {
        let signal = AudioSignal::new(Vec::new(), 8_000).expect("valid signal");
        assert!(matches!(
            signal.metrics(),
            Err(CoreError::EmptySignal { .. })
        ));
    }

    #[test]
    fn metrics_fail_on_all_zero_signal() {
        let signal = AudioSignal::new(vec![0.0; 64], 8_000).expect("valid signal");
        assert!(matches!(signal.metrics(), Err(CoreError::SilentSignal)));
    }
}
