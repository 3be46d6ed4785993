use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

pub mod cli;
pub mod decode;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    // 3. Charger la config et appliquer les overrides CLI
    let config = resolve_config(&cli)?;

    // 4. Décoder le signal
    log::info!("Étape 1/4 : Chargement de {}", cli.input.display());
    let signal = decode::decode_file(&cli.input)?;

    // 5. Métriques du signal complet
    let metrics = signal
        .metrics()
        .context("Métriques du signal d'entrée")?;
    log::info!(
        "Durée {:.3} s — pic {:.4}, RMS {:.4}, dynamique {:.1} dB",
        signal.duration_secs(),
        metrics.peak,
        metrics.rms,
        metrics.dynamic_range_db
    );

    // 6. Pipeline de traitement
    log::info!("Étape 2/4 : Traitement");
    let output = pipeline::run_analysis(&signal, &config)?;

    // 7. Export des résultats
    log::info!("Étape 3/4 : Export");
    let out_dir = resolve_out_dir(&cli);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Impossible de créer {}", out_dir.display()))?;

    let stem = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("analyse");
    bat_report::write_events_csv(&out_dir.join(format!("{stem}_events.csv")), &output.events)?;

    let report = bat_report::AnalysisReport::new(&cli.input, metrics, &config, &output.events);
    bat_report::write_report(&out_dir.join(format!("{stem}_report.json")), &report)?;

    if !cli.no_clips {
        let clips =
            bat_report::write_event_clips(&output.filtered, &output.events, &out_dir.join("events"))?;
        if !clips.is_empty() {
            log::info!("{} clip(s) WAV écrits dans {}", clips.len(), out_dir.join("events").display());
        }
    }

    // 8. Bilan
    log::info!(
        "Étape 4/4 : Terminé — {} événement(s) détecté(s)",
        output.events.len()
    );
    for (index, event) in output.events.iter().enumerate() {
        log::debug!(
            "  événement {index} : {:.3} s → {:.3} s ({:.1} ms)",
            event.start_time,
            event.end_time,
            event.duration_ms()
        );
    }

    Ok(())
}

/// Résout la configuration : fichier TOML, puis overrides CLI, puis
/// validation (les overrides peuvent invalider une config valide).
fn resolve_config(cli: &cli::Cli) -> Result<bat_core::AnalysisConfig> {
    let mut config = if cli.config.exists() {
        bat_core::config::load_config(&cli.config)?
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        bat_core::AnalysisConfig::default()
    };

    if let Some(v) = cli.start {
        config.segment.start_time = v;
    }
    if let Some(v) = cli.duration {
        config.segment.duration = v;
    }
    if let Some(v) = cli.highpass {
        config.highpass.cutoff_hz = v;
    }
    if let Some(v) = cli.lowpass {
        config.lowpass.cutoff_hz = v;
    }
    if let Some(v) = cli.threshold {
        config.detector.energy_threshold = v;
    }
    if let Some(v) = cli.min_frames {
        config.detector.min_frames = v;
    }

    config.validate()?;
    Ok(config)
}

/// Dossier de sortie : `--out-dir`, sinon `out/<nom du fichier>`.
fn resolve_out_dir(cli: &cli::Cli) -> PathBuf {
    cli.out_dir.clone().unwrap_or_else(|| {
        let stem = cli
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("analyse");
        PathBuf::from("out").join(stem)
    })
}
