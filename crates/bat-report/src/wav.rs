use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bat_core::AudioSignal;
use bat_detect::Event;

/// Marge ajoutée de part et d'autre d'un événement, en millisecondes,
/// pour couvrir l'attaque et la queue du cri.
const CLIP_PADDING_MS: f64 = 100.0;

/// Découpe chaque événement du signal et l'écrit en WAV mono float
/// (`event_NN.wav`) dans `out_dir`. Les bornes sont élargies de
/// [`CLIP_PADDING_MS`] puis rabattues sur les limites du signal.
///
/// Retourne les chemins écrits, dans l'ordre des événements.
///
/// # Errors
/// Retourne une erreur si le dossier ou un fichier ne peut pas être créé.
pub fn write_event_clips(
    signal: &AudioSignal,
    events: &[Event],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if events.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Impossible de créer {}", out_dir.display()))?;

    let fs = f64::from(signal.sample_rate());
    let padding_s = CLIP_PADDING_MS / 1_000.0;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut paths = Vec::with_capacity(events.len());
    for (index, event) in events.iter().enumerate() {
        let start_s = (event.start_time - padding_s).max(0.0);
        let end_s = (event.end_time + padding_s).min(signal.duration_secs());

        let end = ((end_s * fs).round() as usize).min(signal.len());
        let start = ((start_s * fs).round() as usize).min(end);

        let path = out_dir.join(format!("event_{index:02}.wav"));
        let mut writer = hound::WavWriter::create(&path, spec)
            .with_context(|| format!("Impossible de créer {}", path.display()))?;
        for &sample in &signal.samples()[start..end] {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        log::debug!("Clip écrit : {} ({} échantillons)", path.display(), end - start);
        paths.push(path);
    }

    Ok(paths)
}
