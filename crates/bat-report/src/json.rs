use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use bat_core::{AnalysisConfig, SignalMetrics};
use bat_detect::Event;
use serde::Serialize;

/// Rapport d'analyse complet, sérialisé en JSON pour archivage.
///
/// Regroupe tout ce qu'il faut pour rejouer ou auditer une analyse :
/// le fichier source, les métriques du signal, la fenêtre analysée,
/// les paramètres effectifs et la liste des événements.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    /// Chemin du fichier analysé.
    pub file_path: String,
    /// Métriques du signal complet, avant traitement.
    pub metrics: SignalMetrics,
    /// Fenêtre analysée, en secondes.
    pub segment: SegmentSummary,
    /// Paramètres effectifs de l'analyse.
    pub parameters: ReportParameters,
    /// Événements détectés.
    pub events: &'a [Event],
}

/// Bornes de la fenêtre analysée, en secondes.
#[derive(Debug, Serialize)]
pub struct SegmentSummary {
    pub start: f64,
    pub end: f64,
}

/// Paramètres effectifs, repris de la configuration.
#[derive(Debug, Serialize)]
pub struct ReportParameters {
    pub high_pass_cutoff: f64,
    pub low_pass_cutoff: f64,
    pub energy_threshold: f64,
    /// En nombre de frames consécutives, pas en secondes.
    pub min_frames: usize,
    pub frame_duration_ms: f64,
    pub focus_band: Option<(f32, f32)>,
}

impl<'a> AnalysisReport<'a> {
    /// Assemble le rapport depuis la configuration et les résultats.
    #[must_use]
    pub fn new(
        file_path: &Path,
        metrics: SignalMetrics,
        config: &AnalysisConfig,
        events: &'a [Event],
    ) -> Self {
        Self {
            file_path: file_path.display().to_string(),
            metrics,
            segment: SegmentSummary {
                start: config.segment.start_time,
                end: config.segment.start_time + config.segment.duration,
            },
            parameters: ReportParameters {
                high_pass_cutoff: config.highpass.cutoff_hz,
                low_pass_cutoff: config.lowpass.cutoff_hz,
                energy_threshold: config.detector.energy_threshold,
                min_frames: config.detector.min_frames,
                frame_duration_ms: config.detector.frame_duration_ms,
                focus_band: config.detector.focus_band,
            },
            events,
        }
    }
}

/// Écrit le rapport en JSON indenté.
///
/// # Errors
/// Retourne une erreur si le fichier ne peut pas être créé ou si la
/// sérialisation échoue.
pub fn write_report(path: &Path, report: &AnalysisReport<'_>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Échec de la sérialisation du rapport {}", path.display()))?;
    log::info!("Rapport écrit : {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bat_core::AudioSignal;

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");

        let signal =
            AudioSignal::new(vec![0.5, -0.5, 0.25, -0.25], 44_100).expect("valid signal");
        let metrics = signal.metrics().expect("metrics defined");
        let base = AnalysisConfig::default();
        let config = AnalysisConfig {
            detector: bat_core::config::DetectorConfig {
                focus_band: Some((2_500.0, 5_000.0)),
                ..base.detector
            },
            ..base
        };
        let events = [Event {
            start_time: 0.012,
            end_time: 0.030,
        }];

        let report = AnalysisReport::new(Path::new("recording.wav"), metrics, &config, &events);
        write_report(&path, &report).expect("report written");

        let content = std::fs::read_to_string(&path).expect("readable");
        let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
        assert_eq!(value["file_path"], "recording.wav");
        assert_eq!(value["segment"]["end"], 10.0);
        assert_eq!(value["parameters"]["high_pass_cutoff"], 2_500.0);
        assert_eq!(value["parameters"]["min_frames"], 3);
        assert_eq!(value["events"].as_array().map(Vec::len), Some(1));
    }
}
