use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Paramètres d'analyse complets d'un enregistrement.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine ;
/// un fichier de configuration partiel est fusionné sur ces défauts.
///
/// # Example
/// ```
/// use bat_core::AnalysisConfig;
/// let config = AnalysisConfig::default();
/// assert_eq!(config.highpass.order, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Fenêtre temporelle à extraire de l'enregistrement.
    pub segment: SegmentConfig,
    /// Filtre passe-haut appliqué au segment.
    pub highpass: FilterConfig,
    /// Filtre passe-bas appliqué après le passe-haut.
    pub lowpass: FilterConfig,
    /// Détection d'événements sur le segment filtré.
    pub detector: DetectorConfig,
}

/// Fenêtre d'extraction, en secondes.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SegmentConfig {
    /// Début de la fenêtre (≥ 0).
    pub start_time: f64,
    /// Durée de la fenêtre (> 0). Tronquée à ce qui est disponible.
    pub duration: f64,
}

/// Paramètres d'un filtre de Butterworth.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Fréquence de coupure en Hz. Doit rester dans `(0, Nyquist)` ;
    /// la borne de Nyquist est vérifiée à la construction du filtre,
    /// quand la fréquence d'échantillonnage est connue.
    pub cutoff_hz: f64,
    /// Ordre du filtre (≥ 1).
    pub order: usize,
}

/// Paramètres du détecteur d'événements.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// Seuil d'énergie par frame (somme des carrés, linéaire, ≥ 0).
    pub energy_threshold: f64,
    /// Longueur minimale d'un événement, en NOMBRE DE FRAMES consécutives
    /// (pas en secondes). Les bornes des événements sont, elles, en
    /// secondes : les consommateurs doivent normaliser avant de comparer.
    pub min_frames: usize,
    /// Durée d'une frame d'analyse en millisecondes (> 0).
    pub frame_duration_ms: f64,
    /// Bande de fréquences d'intérêt (Hz), transmise telle quelle aux
    /// consommateurs (rapport, visualisation). Jamais utilisée par la
    /// détection elle-même.
    pub focus_band: Option<(f32, f32)>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segment: SegmentConfig {
                start_time: 0.0,
                duration: 10.0,
            },
            highpass: FilterConfig {
                cutoff_hz: 2_500.0,
                order: 5,
            },
            lowpass: FilterConfig {
                cutoff_hz: 5_000.0,
                order: 5,
            },
            detector: DetectorConfig {
                energy_threshold: 1.0,
                min_frames: 3,
                frame_duration_ms: 6.0,
                focus_band: None,
            },
        }
    }
}

impl AnalysisConfig {
    /// Vérifie les invariants indépendants de la fréquence
    /// d'échantillonnage. À appeler avant tout traitement : les valeurs
    /// hors plage sont des erreurs de configuration, jamais corrigées en
    /// silence.
    ///
    /// # Errors
    /// Retourne [`CoreError::Config`] pour la première valeur invalide.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.segment.start_time < 0.0 {
            return Err(CoreError::Config(format!(
                "start_time négatif : {}",
                self.segment.start_time
            )));
        }
        if self.segment.duration <= 0.0 {
            return Err(CoreError::Config(format!(
                "duration non positive : {}",
                self.segment.duration
            )));
        }
        for (name, filter) in [("highpass", &self.highpass), ("lowpass", &self.lowpass)] {
            if filter.cutoff_hz <= 0.0 {
                return Err(CoreError::Config(format!(
                    "{name}.cutoff_hz non positif : {}",
                    filter.cutoff_hz
                )));
            }
            if filter.order == 0 {
                return Err(CoreError::Config(format!("{name}.order nul")));
            }
        }
        if self.detector.energy_threshold < 0.0 {
            return Err(CoreError::Config(format!(
                "energy_threshold négatif : {}",
                self.detector.energy_threshold
            )));
        }
        if self.detector.frame_duration_ms <= 0.0 {
            return Err(CoreError::Config(format!(
                "frame_duration_ms non positif : {}",
                self.detector.frame_duration_ms
            )));
        }
        if self.highpass.cutoff_hz >= self.lowpass.cutoff_hz {
            log::warn!(
                "La bande passante est vide : passe-haut {} Hz ≥ passe-bas {} Hz",
                self.highpass.cutoff_hz,
                self.lowpass.cutoff_hz
            );
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    segment: Option<SegmentSection>,
    highpass: Option<FilterSection>,
    lowpass: Option<FilterSection>,
    detector: Option<DetectorSection>,
}

#[derive(Deserialize)]
struct SegmentSection {
    start_time: Option<f64>,
    duration: Option<f64>,
}

#[derive(Deserialize)]
struct FilterSection {
    cutoff_hz: Option<f64>,
    order: Option<usize>,
}

#[derive(Deserialize)]
struct DetectorSection {
    energy_threshold: Option<f64>,
    min_frames: Option<usize>,
    frame_duration_ms: Option<f64>,
    focus_band: Option<(f32, f32)>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if the
/// merged configuration fails [`AnalysisConfig::validate`].
///
/// # Example
/// ```no_run
/// use bat_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("TOML invalide dans {}", path.display()))?;

    let mut config = AnalysisConfig::default();

    if let Some(s) = file.segment {
        if let Some(v) = s.start_time {
            config.segment.start_time = v;
        }
        if let Some(v) = s.duration {
            config.segment.duration = v;
        }
    }
    if let Some(f) = file.highpass {
        if let Some(v) = f.cutoff_hz {
            config.highpass.cutoff_hz = v;
        }
        if let Some(v) = f.order {
            config.highpass.order = v;
        }
    }
    if let Some(f) = file.lowpass {
        if let Some(v) = f.cutoff_hz {
            config.lowpass.cutoff_hz = v;
        }
        if let Some(v) = f.order {
            config.lowpass.order = v;
        }
    }
    if let Some(d) = file.detector {
        if let Some(v) = d.energy_threshold {
            config.detector.energy_threshold = v;
        }
        if let Some(v) = d.min_frames {
            config.detector.min_frames = v;
        }
        if let Some(v) = d.frame_duration_ms {
            config.detector.frame_duration_ms = v;
        }
        if let Some(v) = d.focus_band {
            config.detector.focus_band = Some(v);
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_merges_onto_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[detector]\nenergy_threshold = 2.5\nmin_frames = 4\n")
            .expect("config written");

        let config = load_config(&path).expect("config loads");
        assert!((config.detector.energy_threshold - 2.5).abs() < 1e-12);
        assert_eq!(config.detector.min_frames, 4);
        // Untouched sections keep their defaults.
        assert!((config.segment.duration - 10.0).abs() < 1e-12);
        assert!((config.highpass.cutoff_hz - 2_500.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_file_values_are_rejected_at_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[segment]\nduration = -1.0\n").expect("config written");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn validate_rejects_negative_start() {
        let base = AnalysisConfig::default();
        let config = AnalysisConfig {
            segment: SegmentConfig {
                start_time: -1.0,
                ..base.segment
            },
            ..base
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_threshold() {
        let base = AnalysisConfig::default();
        let config = AnalysisConfig {
            detector: DetectorConfig {
                energy_threshold: -0.1,
                ..base.detector
            },
            ..base
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_order() {
        let base = AnalysisConfig::default();
        let config = AnalysisConfig {
            lowpass: FilterConfig {
                order: 0,
                ..base.lowpass
            },
            ..base
        };
        assert!(config.validate().is_err());
    }
}
