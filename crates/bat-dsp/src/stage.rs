use crate::error::DspError;

/// Une transformation à but unique sur un signal.
///
/// Chaque étage est construit avec son signal d'entrée et ses paramètres,
/// exécute sa transformation une fois via [`Stage::process`], puis expose
/// son résultat. Lire la sortie avant `process` est une erreur d'état
/// ([`DspError::NotProcessed`]), jamais une valeur par défaut silencieuse.
///
/// Tous les étages concrets produisent un nouveau
/// [`bat_core::AudioSignal`] à la fréquence d'échantillonnage de leur
/// entrée, sauf l'analyseur spectral qui produit un
/// [`crate::Spectrum`]. Les entrées sont mono par construction : le
/// matériel multi-canal est réduit au canal 0 à la frontière de décodage.
///
/// # Example
/// ```
/// use bat_dsp::{DspError, Stage};
///
/// struct Doubler {
///     input: Vec<f32>,
///     output: Option<Vec<f32>>,
/// }
///
/// impl Stage for Doubler {
///     type Output = Vec<f32>;
///     fn process(&mut self) -> Result<(), DspError> {
///         self.output = Some(self.input.iter().map(|x| x * 2.0).collect());
///         Ok(())
///     }
///     fn output(&self) -> Result<&Vec<f32>, DspError> {
///         self.output.as_ref().ok_or(DspError::NotProcessed)
///     }
///     fn into_output(self) -> Result<Vec<f32>, DspError> {
///         self.output.ok_or(DspError::NotProcessed)
///     }
/// }
///
/// let mut stage = Doubler { input: vec![1.0], output: None };
/// assert!(stage.output().is_err());
/// stage.process().unwrap();
/// assert_eq!(stage.into_output().unwrap(), vec![2.0]);
/// ```
pub trait Stage {
    /// Type produit par l'étage.
    type Output;

    /// Exécute la transformation et stocke le résultat.
    ///
    /// # Errors
    /// Erreur de configuration ou de données, selon l'étage.
    fn process(&mut self) -> Result<(), DspError>;

    /// Emprunte le résultat.
    ///
    /// # Errors
    /// [`DspError::NotProcessed`] si `process` n'a pas encore tourné.
    fn output(&self) -> Result<&Self::Output, DspError>;

    /// Consomme l'étage et rend le résultat, sans copie.
    ///
    /// # Errors
    /// [`DspError::NotProcessed`] si `process` n'a pas encore tourné.
    fn into_output(self) -> Result<Self::Output, DspError>;
}
