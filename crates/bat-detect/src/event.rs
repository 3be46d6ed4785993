use serde::Serialize;

/// Un événement acoustique détecté, borné en secondes.
///
/// Les événements d'une même passe de détection sont ordonnés dans le
/// temps et disjoints par construction (le détecteur balaye le signal
/// une seule fois, vers l'avant).
///
/// # Example
/// ```
/// use bat_detect::Event;
/// let event = Event { start_time: 0.012, end_time: 0.030 };
/// assert!((event.duration_ms() - 18.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Event {
    /// Début, en secondes depuis le début du signal analysé.
    pub start_time: f64,
    /// Fin (exclue), en secondes.
    pub end_time: f64,
}

impl Event {
    /// Durée en millisecondes, dérivée des bornes en secondes.
    ///
    /// Attention aux unités : la longueur minimale d'un événement se
    /// règle en nombre de frames ([`bat_core::config::DetectorConfig::min_frames`]),
    /// pas en millisecondes. Normaliser avant toute comparaison.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.end_time - self.start_time) * 1_000.0
    }
}
