use anyhow::{Context, Result};
use bat_core::{AnalysisConfig, AudioSignal};
use bat_detect::{Event, EventDetector};
use bat_dsp::{
    DcRemover, HighPassFilter, LowPassFilter, Segmenter, Spectrum, SpectrumAnalyzer, Stage,
};

/// Résultats d'une passe d'analyse complète.
///
/// Vues en lecture seule pour les consommateurs (rapport, export,
/// visualisation) : rien ici n'est modifié après la passe.
pub struct AnalysisOutput {
    /// Le segment filtré.
    pub filtered: AudioSignal,
    /// Spectre d'amplitude unilatéral du segment filtré.
    pub spectrum: Spectrum,
    /// Événements détectés, ordonnés dans le temps.
    pub events: Vec<Event>,
}

/// Enchaîne les étages dans l'ordre du contrat :
/// DC → segment → passe-haut → passe-bas → {spectre ∥ détection}.
///
/// Chaque étage est une fonction pure de son entrée et de ses
/// paramètres ; les deux consommateurs du segment filtré sont
/// indépendants et tournent en parallèle via `rayon::join`, seul point
/// de parallélisme du pipeline.
///
/// # Errors
/// Toute erreur d'étage (état, configuration, données) interrompt la
/// passe avec son contexte. Rien n'est fatal au-delà du fichier courant.
pub fn run_analysis(signal: &AudioSignal, config: &AnalysisConfig) -> Result<AnalysisOutput> {
    let mut dc = DcRemover::new(signal.clone());
    dc.process().context("Retrait de la composante continue")?;
    let signal = dc.into_output()?;

    log::info!(
        "Segmentation : {:.3} s + {:.3} s",
        config.segment.start_time,
        config.segment.duration
    );
    let mut segmenter = Segmenter::new(signal, config.segment.start_time, config.segment.duration)?;
    segmenter.process().context("Segmentation")?;
    let segment = segmenter.into_output()?;

    log::info!(
        "Filtrage : passe-haut {} Hz, passe-bas {} Hz (ordre {})",
        config.highpass.cutoff_hz,
        config.lowpass.cutoff_hz,
        config.highpass.order
    );
    let mut highpass =
        HighPassFilter::with_order(segment, config.highpass.cutoff_hz, config.highpass.order)?;
    highpass.process().context("Filtrage passe-haut")?;

    let mut lowpass = LowPassFilter::with_order(
        highpass.into_output()?,
        config.lowpass.cutoff_hz,
        config.lowpass.order,
    )?;
    lowpass.process().context("Filtrage passe-bas")?;
    let filtered = lowpass.into_output()?;

    let (spectrum, events) = rayon::join(
        || -> Result<Spectrum> {
            let mut analyzer = SpectrumAnalyzer::new(filtered.clone());
            analyzer.process().context("Analyse spectrale")?;
            Ok(analyzer.into_output()?)
        },
        || -> Result<Vec<Event>> {
            let mut detector = EventDetector::new(filtered.clone(), config.detector)?;
            detector.process().context("Détection d'événements")?;
            Ok(detector.into_output()?)
        },
    );

    Ok(AnalysisOutput {
        filtered,
        spectrum: spectrum?,
        events: events?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bat_core::config::SegmentConfig;
    use std::f64::consts::PI;

    const FS: u32 = 48_000;

    /// In-band tone + low-frequency hum + DC offset.
    fn test_signal(seconds: f64) -> AudioSignal {
        let n = (seconds * f64::from(FS)) as usize;
        let samples = (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(FS);
                ((2.0 * PI * 3_000.0 * t).sin()
                    + 0.3 * (2.0 * PI * 120.0 * t).sin()
                    + 0.5) as f32
            })
            .collect();
        AudioSignal::new(samples, FS).expect("valid signal")
    }

    #[test]
    fn full_chain_round_trip_succeeds() {
        let signal = test_signal(1.0);
        let config = AnalysisConfig {
            segment: SegmentConfig {
                start_time: 0.1,
                duration: 0.5,
            },
            ..AnalysisConfig::default()
        };

        let output = run_analysis(&signal, &config).expect("analysis succeeds");
        assert_eq!(output.filtered.len(), 24_000);
        assert_eq!(output.spectrum.magnitudes.len(), 12_000);
        // Metrics on the processed result stay defined: the 3 kHz tone
        // sits inside the 2.5–5 kHz band.
        let metrics = output.filtered.metrics().expect("metrics defined");
        assert!(metrics.rms > 0.0);
    }

    #[test]
    fn window_past_the_end_truncates_and_still_analyzes() {
        let signal = test_signal(1.0);
        let config = AnalysisConfig {
            segment: SegmentConfig {
                start_time: 0.5,
                duration: 10.0,
            },
            ..AnalysisConfig::default()
        };

        let output = run_analysis(&signal, &config).expect("analysis succeeds");
        assert_eq!(output.filtered.len(), 24_000);
    }
}
