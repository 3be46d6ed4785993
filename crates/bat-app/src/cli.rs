use std::path::PathBuf;

use clap::Parser;

/// batscope — Analyse hors-ligne d'enregistrements de chauves-souris.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier audio à analyser (WAV, FLAC, OGG).
    pub input: PathBuf,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Début du segment analysé, en secondes (écrase la config).
    #[arg(long)]
    pub start: Option<f64>,

    /// Durée du segment analysé, en secondes (écrase la config).
    #[arg(long)]
    pub duration: Option<f64>,

    /// Coupure du passe-haut, en Hz (écrase la config).
    #[arg(long)]
    pub highpass: Option<f64>,

    /// Coupure du passe-bas, en Hz (écrase la config).
    #[arg(long)]
    pub lowpass: Option<f64>,

    /// Seuil d'énergie par frame, linéaire (écrase la config).
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Longueur minimale d'un événement, en frames (écrase la config).
    #[arg(long)]
    pub min_frames: Option<usize>,

    /// Dossier de sortie. Défaut : out/<nom du fichier>.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Ne pas écrire les clips WAV des événements détectés.
    #[arg(long, default_value_t = false)]
    pub no_clips: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
