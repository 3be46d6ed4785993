use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bat_detect::Event;

/// Écrit la table des événements : une ligne par événement, colonnes
/// `start,end,duration_ms` (secondes, secondes, millisecondes).
///
/// # Errors
/// Retourne une erreur si le fichier ne peut pas être créé ou écrit.
///
/// # Example
/// ```no_run
/// use bat_detect::Event;
/// use bat_report::write_events_csv;
/// use std::path::Path;
///
/// let events = [Event { start_time: 0.012, end_time: 0.030 }];
/// write_events_csv(Path::new("events.csv"), &events).unwrap();
/// ```
pub fn write_events_csv(path: &Path, events: &[Event]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "start,end,duration_ms")?;
    for event in events {
        writeln!(
            writer,
            "{:.6},{:.6},{:.3}",
            event.start_time,
            event.end_time,
            event.duration_ms()
        )?;
    }
    writer.flush()?;

    log::info!("{} événement(s) exporté(s) vers {}", events.len(), path.display());
    Ok(())
}
