//! Opening a track into a paused `rodio` sink.
//!
//! Split in two: `decode` touches the filesystem and may block for as long
//! as the file does, so it runs off the worker's command loop; `attach`
//! only needs the output stream and is instant.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::error::VisualError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// A decoded track and its duration, when the decoder or the file's
/// properties know it.
pub(super) struct Decoded {
    pub source: FileSource,
    pub duration: Option<Duration>,
}

pub(super) fn decode(path: &Path) -> Result<Decoded, VisualError> {
    let file = File::open(path).map_err(|source| VisualError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| VisualError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Streams without a seek table (VBR mp3, ogg) don't report a total; the
    // container header usually does.
    let duration = source.total_duration().or_else(|| probe_duration(path));
    Ok(Decoded { source, duration })
}

/// Queue `source` on a new, paused sink on `stream`.
pub(super) fn attach(stream: &OutputStream, source: FileSource, volume: f32) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    sink
}

fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
