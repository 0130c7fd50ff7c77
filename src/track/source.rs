use std::fs;
use std::path::{Path, PathBuf};

use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::format::format_duration;
use super::locator::resolve_locator;
use super::model::TrackDescriptor;

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "wav", "ogg"];
const ART_STEMS: [&str; 4] = ["cover", "folder", "front", "album"];
const ART_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid track file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{} is neither a .toml track file nor a supported audio file", .0.display())]
    Unsupported(PathBuf),
}

/// Where the current descriptor comes from. Reloading re-reads the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// The built-in demo track.
    Demo,
    /// A TOML file holding a descriptor.
    File(PathBuf),
    /// An audio file described by its own tags.
    Audio(PathBuf),
}

impl TrackSource {
    /// Pick a source from a command line argument.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, TrackError> {
        let Some(arg) = arg else {
            return Ok(Self::Demo);
        };
        let path = PathBuf::from(arg);
        if has_extension(&path, &["toml"]) {
            Ok(Self::File(path))
        } else if has_extension(&path, &AUDIO_EXTENSIONS) {
            Ok(Self::Audio(path))
        } else {
            Err(TrackError::Unsupported(path))
        }
    }

    pub fn load(&self) -> Result<TrackDescriptor, TrackError> {
        match self {
            Self::Demo => Ok(TrackDescriptor::demo()),
            Self::File(path) => load_track_file(path),
            Self::Audio(path) => Ok(describe_audio_file(path)),
        }
    }

    /// Short label for status lines.
    pub fn label(&self) -> String {
        match self {
            Self::Demo => "demo track".to_string(),
            Self::File(path) | Self::Audio(path) => path.display().to_string(),
        }
    }
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Parse a TOML track file. Relative locators are resolved against the
/// file's directory.
pub fn load_track_file(path: &Path) -> Result<TrackDescriptor, TrackError> {
    let text = fs::read_to_string(path).map_err(|source| TrackError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut track: TrackDescriptor = toml::from_str(&text).map_err(|source| TrackError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent();
    track.audio_url = resolve_locator(base, &track.audio_url);
    if !track.album_art_url.is_empty() {
        track.album_art_url = resolve_locator(base, &track.album_art_url);
    }
    debug!(path = %path.display(), audio_url = %track.audio_url, "loaded track file");
    Ok(track)
}

/// Build a descriptor from the tags of an audio file. Unreadable tags leave
/// the display fields empty; the player reports whether the audio itself loads.
pub fn describe_audio_file(path: &Path) -> TrackDescriptor {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut track = TrackDescriptor {
        title,
        artist: String::new(),
        audio_url: path.display().to_string(),
        album_art_url: String::new(),
        length: String::new(),
        genre: String::new(),
        added_on: String::new(),
        mood: String::new(),
        instruments: String::new(),
        key: String::new(),
        tempo: String::new(),
    };

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            track.length = format_duration(tagged.properties().duration().as_secs_f64());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                let text = |key: ItemKey| {
                    tag.get_string(key)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                };
                if let Some(v) = text(ItemKey::TrackTitle) {
                    track.title = v;
                }
                track.artist = text(ItemKey::TrackArtist).unwrap_or_default();
                track.genre = text(ItemKey::Genre).unwrap_or_default();
                track.mood = text(ItemKey::Mood).unwrap_or_default();
                track.key = text(ItemKey::InitialKey).unwrap_or_default();
                track.tempo = text(ItemKey::Bpm)
                    .or_else(|| text(ItemKey::IntegerBpm))
                    .map(|bpm| format!("{bpm} BPM"))
                    .unwrap_or_default();
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "could not read tags"),
    }

    if let Some(art) = find_cover_art(containing_dir(path)) {
        track.album_art_url = art.display().to_string();
    }
    track
}

/// Directory holding `path`. A bare file name has an empty parent, which
/// means the working directory.
pub(super) fn containing_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Look for a cover image directly inside `dir`, preferring `cover` over
/// `folder` over `front` over `album`.
pub fn find_cover_art(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.into_path();
            let rank = art_rank(&path)?;
            Some((rank, path))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

fn art_rank(path: &Path) -> Option<usize> {
    if !has_extension(path, &ART_EXTENSIONS) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
    ART_STEMS.iter().position(|s| *s == stem)
}
