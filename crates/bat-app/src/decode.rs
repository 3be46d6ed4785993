use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use bat_core::AudioSignal;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Décode un fichier audio en [`AudioSignal`] mono.
///
/// Sur du matériel multi-canal, seul le canal 0 est conservé : jamais
/// de downmix. Aucune décimation non plus, les cris d'intérêt vivent
/// près de Nyquist.
///
/// # Errors
/// Retourne une erreur si le fichier ne peut pas être ouvert, sondé ou
/// décodé, ou si le flux n'annonce pas sa fréquence d'échantillonnage.
///
/// # Example
/// ```no_run
/// use bat_app::decode::decode_file;
/// use std::path::Path;
/// let signal = decode_file(Path::new("recording.wav")).unwrap();
/// ```
pub fn decode_file(path: &Path) -> Result<AudioSignal> {
    let file =
        File::open(path).with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Format audio non reconnu")?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .context("Aucune piste audio par défaut")?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Fréquence d'échantillonnage absente du flux")?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Impossible de créer le décodeur audio")?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Erreur de lecture d'un paquet : {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Erreur de décodage d'un paquet : {e}");
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger.
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        // Canal 0 uniquement.
        samples.extend(buf.samples().iter().step_by(channels));
    }

    log::info!(
        "Décodé : {} échantillons @ {sample_rate} Hz ({channels} canal/canaux) depuis {}",
        samples.len(),
        path.display()
    );

    Ok(AudioSignal::new(samples, sample_rate)?)
}
