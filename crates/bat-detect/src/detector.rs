use bat_core::AudioSignal;
use bat_core::config::DetectorConfig;
use bat_dsp::{DspError, Stage};

use crate::error::DetectError;
use crate::event::Event;

/// Détecte les événements de forte énergie dans un segment filtré.
///
/// Le signal est découpé en frames consécutives et disjointes de
/// `frame_duration_ms` millisecondes (la dernière peut être plus
/// courte), chaque frame reçoit un score d'énergie (somme des carrés),
/// puis un balayage avant unique applique le seuil :
///
/// - énergie > seuil et aucun événement actif → la frame courante
///   devient le début actif ;
/// - énergie ≤ seuil et un événement actif → le run se ferme, et n'est
///   retenu que si sa longueur en frames atteint `min_frames`. Les
///   bornes émises sont `start = début · frame_s` et
///   `end = frame courante · frame_s`, en secondes.
///
/// Un run encore actif après la dernière frame est abandonné : sa borne
/// de fin n'a pas été mesurée. Un signal vide produit une liste vide,
/// pas une erreur.
///
/// # Example
/// ```
/// use bat_core::AudioSignal;
/// use bat_core::config::DetectorConfig;
/// use bat_detect::EventDetector;
/// use bat_dsp::Stage;
///
/// let params = DetectorConfig {
///     energy_threshold: 5.0,
///     min_frames: 2,
///     frame_duration_ms: 6.0,
///     focus_band: None,
/// };
/// let signal = AudioSignal::new(vec![0.0; 480], 8_000).unwrap();
/// let mut detector = EventDetector::new(signal, params).unwrap();
/// detector.process().unwrap();
/// assert!(detector.into_output().unwrap().is_empty());
/// ```
pub struct EventDetector {
    input: AudioSignal,
    params: DetectorConfig,
    frame_len: usize,
    output: Option<Vec<Event>>,
}

impl EventDetector {
    /// Construit le détecteur et valide ses paramètres.
    ///
    /// `min_frames` compte des FRAMES consécutives, pas des secondes ;
    /// `min_frames == 0` retient tout franchissement d'au moins une
    /// frame. `focus_band` est transporté tel quel pour les
    /// consommateurs (rapport, visualisation) et n'influence jamais la
    /// détection.
    ///
    /// # Errors
    /// [`DetectError::NegativeThreshold`] si le seuil est négatif,
    /// [`DetectError::InvalidFrameDuration`] si la frame ne couvre pas
    /// au moins un échantillon.
    pub fn new(input: AudioSignal, params: DetectorConfig) -> Result<Self, DetectError> {
        if !params.energy_threshold.is_finite() || params.energy_threshold < 0.0 {
            return Err(DetectError::NegativeThreshold {
                threshold: params.energy_threshold,
            });
        }

        let fs = f64::from(input.sample_rate());
        let frame_len = if params.frame_duration_ms.is_finite() && params.frame_duration_ms > 0.0
        {
            (params.frame_duration_ms / 1_000.0 * fs).round() as usize
        } else {
            0
        };
        if frame_len == 0 {
            return Err(DetectError::InvalidFrameDuration {
                frame_duration_ms: params.frame_duration_ms,
                sample_rate: input.sample_rate(),
            });
        }

        Ok(Self {
            input,
            params,
            frame_len,
            output: None,
        })
    }

    /// Paramètres effectifs du détecteur.
    #[must_use]
    pub fn params(&self) -> &DetectorConfig {
        &self.params
    }

    /// Énergie (somme des carrés, f64) de chaque frame, dans l'ordre.
    fn frame_energies(&self) -> Vec<f64> {
        self.input
            .samples()
            .chunks(self.frame_len)
            .map(|frame| {
                frame
                    .iter()
                    .map(|&s| f64::from(s) * f64::from(s))
                    .sum::<f64>()
            })
            .collect()
    }
}

impl Stage for EventDetector {
    type Output = Vec<Event>;

    fn process(&mut self) -> Result<(), DspError> {
        let energies = self.frame_energies();
        let frame_s = self.params.frame_duration_ms / 1_000.0;

        let mut events = Vec::new();
        let mut active_start: Option<usize> = None;

        for (index, &energy) in energies.iter().enumerate() {
            if energy > self.params.energy_threshold {
                if active_start.is_none() {
                    active_start = Some(index);
                }
            } else if let Some(start) = active_start.take() {
                if index - start >= self.params.min_frames {
                    events.push(Event {
                        start_time: start as f64 * frame_s,
                        end_time: index as f64 * frame_s,
                    });
                }
            }
        }

        if let Some(start) = active_start {
            log::debug!(
                "Run actif abandonné en fin de segment (frame {start} → fin)"
            );
        }

        log::info!(
            "{} événement(s) détecté(s) sur {} frame(s)",
            events.len(),
            energies.len()
        );
        self.output = Some(events);
        Ok(())
    }

    fn output(&self) -> Result<&Vec<Event>, DspError> {
        self.output.as_ref().ok_or(DspError::NotProcessed)
    }

    fn into_output(self) -> Result<Vec<Event>, DspError> {
        self.output.ok_or(DspError::NotProcessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: u32 = 1_000;
    const FRAME_MS: f64 = 6.0;
    const FRAME_LEN: usize = 6;

    fn params(threshold: f64, min_frames: usize) -> DetectorConfig {
        DetectorConfig {
            energy_threshold: threshold,
            min_frames,
            frame_duration_ms: FRAME_MS,
            focus_band: None,
        }
    }

    /// Builds a signal whose per-frame energies match `energies` exactly:
    /// each frame holds `FRAME_LEN` constant samples of `sqrt(e / len)`.
    fn signal_with_energies(energies: &[f64]) -> AudioSignal {
        let mut samples = Vec::with_capacity(energies.len() * FRAME_LEN);
        for &energy in energies {
            let amplitude = (energy / FRAME_LEN as f64).sqrt() as f32;
            samples.extend(std::iter::repeat_n(amplitude, FRAME_LEN));
        }
        AudioSignal::new(samples, FS).expect("valid signal")
    }

    fn detect(energies: &[f64], threshold: f64, min_frames: usize) -> Vec<Event> {
        let mut detector =
            EventDetector::new(signal_with_energies(energies), params(threshold, min_frames))
                .expect("valid params");
        detector.process().expect("detection");
        detector.into_output().expect("processed")
    }

    #[test]
    fn reference_scenario_emits_one_event() {
        let events = detect(&[0.0, 0.0, 10.0, 10.0, 10.0, 0.0, 0.0], 5.0, 2);
        assert_eq!(events.len(), 1);
        assert!((events[0].start_time - 0.012).abs() < 1e-12);
        assert!((events[0].end_time - 0.030).abs() < 1e-12);
        assert!((events[0].duration_ms() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn run_shorter_than_min_frames_is_discarded() {
        // Run length 3 < 4.
        let events = detect(&[0.0, 0.0, 10.0, 10.0, 10.0, 0.0, 0.0], 5.0, 4);
        assert!(events.is_empty());
    }

    #[test]
    fn run_still_active_at_end_is_dropped() {
        let events = detect(&[0.0, 10.0, 10.0], 5.0, 2);
        assert!(events.is_empty(), "truncated run must not be emitted");
    }

    #[test]
    fn min_frames_zero_keeps_single_frame_runs() {
        let events = detect(&[0.0, 10.0, 0.0, 10.0, 0.0], 5.0, 0);
        assert_eq!(events.len(), 2);
        assert!((events[0].start_time - 0.006).abs() < 1e-12);
        assert!((events[0].end_time - 0.012).abs() < 1e-12);
    }

    #[test]
    fn events_are_ordered_and_disjoint() {
        let events = detect(
            &[10.0, 10.0, 0.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0],
            5.0,
            2,
        );
        assert_eq!(events.len(), 3);
        for pair in events.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
        }
    }

    #[test]
    fn partial_last_frame_participates_in_the_scan() {
        // Two loud full frames, then 3 silent samples: the partial frame
        // closes the run at index 2.
        let mut samples = vec![(10.0_f64 / FRAME_LEN as f64).sqrt() as f32; 2 * FRAME_LEN];
        samples.extend_from_slice(&[0.0, 0.0, 0.0]);
        let signal = AudioSignal::new(samples, FS).expect("valid signal");
        let mut detector = EventDetector::new(signal, params(5.0, 2)).expect("valid params");
        detector.process().expect("detection");
        let events = detector.into_output().expect("processed");
        assert_eq!(events.len(), 1);
        assert!((events[0].start_time - 0.0).abs() < 1e-12);
        assert!((events[0].end_time - 0.012).abs() < 1e-12);
    }

    #[test]
    fn empty_signal_yields_empty_event_list() {
        let signal = AudioSignal::new(Vec::new(), FS).expect("valid signal");
        let mut detector = EventDetector::new(signal, params(5.0, 2)).expect("valid params");
        detector.process().expect("detection");
        assert!(detector.into_output().expect("processed").is_empty());
    }

    #[test]
    fn negative_threshold_is_a_configuration_error() {
        let signal = signal_with_energies(&[0.0]);
        assert!(matches!(
            EventDetector::new(signal, params(-1.0, 2)),
            Err(DetectError::NegativeThreshold { .. })
        ));
    }

    #[test]
    fn sub_sample_frame_duration_is_a_configuration_error() {
        let signal = signal_with_energies(&[0.0]);
        let mut p = params(5.0, 2);
        p.frame_duration_ms = 0.1; // 0.1 ms at 1 kHz rounds to zero samples
        assert!(matches!(
            EventDetector::new(signal, p),
            Err(DetectError::InvalidFrameDuration { .. })
        ));
    }

    #[test]
    fn reading_output_before_process_is_a_state_error() {
        let detector = EventDetector::new(signal_with_energies(&[0.0]), params(5.0, 2))
            .expect("valid params");
        assert!(matches!(detector.output(), Err(DspError::NotProcessed)));
    }
}
