use serde::Deserialize;

/// Descriptive data for the one track shown by the player.
///
/// Only `audio_url` matters to the player's resource lifecycle; every other
/// field is display text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackDescriptor {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(alias = "audioUrl")]
    pub audio_url: String,
    #[serde(default, alias = "albumArt", alias = "albumArtUrl")]
    pub album_art_url: String,
    /// Length as written by whoever described the track, e.g. "3:45".
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, alias = "addedOn")]
    pub added_on: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub instruments: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub tempo: String,
}

impl TrackDescriptor {
    /// The track shown when no source was given on the command line.
    pub fn demo() -> Self {
        Self {
            title: "Starry Dreams".to_string(),
            artist: "Luna Melody".to_string(),
            audio_url: "music.mp3".to_string(),
            album_art_url: "albumCover1.jpeg".to_string(),
            length: "3:45".to_string(),
            genre: "Ethereal Ambient".to_string(),
            added_on: "20 Jan 2024".to_string(),
            mood: "Soothing, Dreamy".to_string(),
            instruments: "Piano, Synthesiser, Violin".to_string(),
            key: "A Minor".to_string(),
            tempo: "60 BPM".to_string(),
        }
    }

    /// Label/value pairs for the metadata grid, in display order. The first
    /// entry is the descriptor's own length string; the player replaces it
    /// with the decoded duration once known.
    pub fn grid_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("Length", self.length.as_str()),
            ("Genre", self.genre.as_str()),
            ("Added On", self.added_on.as_str()),
            ("Mood", self.mood.as_str()),
            ("Instruments", self.instruments.as_str()),
            ("Key", self.key.as_str()),
            ("Tempo", self.tempo.as_str()),
        ]
    }
}
