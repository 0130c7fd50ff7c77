use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spindle/config.toml` or `~/.config/spindle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPINDLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub visualization: VisualizationSettings,
    pub player: PlayerSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume applied to every new handle (1.0 = unity gain).
    pub volume: f32,
    /// Fade-out applied whenever a playing handle is destroyed: on quit, on
    /// reload with a new track, on a load timeout (milliseconds).
    /// Set to 0 to stop immediately.
    #[serde(alias = "quit_fade_out_ms")]
    pub fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            fade_out_ms: 300,
        }
    }
}

/// Look of the waveform strip. Colors are `#RRGGBB` or any ratatui color name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizationSettings {
    pub wave_color: String,
    pub progress_color: String,
    pub cursor_color: String,
    /// Width of a single bar, in cells.
    pub bar_width: u16,
    /// Blank cells between two bars.
    pub bar_gap: u16,
    /// Rows reserved for the strip.
    pub height: u16,
    /// How often a playing handle publishes its position (milliseconds).
    pub tick_ms: u64,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            wave_color: "#D1D5DB".to_string(),
            progress_color: "#F97316".to_string(),
            cursor_color: "#F97316".to_string(),
            bar_width: 1,
            bar_gap: 1,
            height: 3,
            tick_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Give up on a load that has not reported back after this many
    /// milliseconds. 0 waits forever.
    pub load_timeout_ms: u64,
    /// Whether to expose the player on the session bus.
    pub mpris: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            mpris: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Label rendered in the top-left corner of the widget.
    pub header_text: String,
    /// Placeholder shown in the Length cell until the duration is known.
    pub loading_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: "Track".to_string(),
            loading_text: "Loading...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `SPINDLE_LOG`.
    pub level: String,
    /// Log file; defaults to `$XDG_STATE_HOME/spindle/spindle.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
