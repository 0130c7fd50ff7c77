use std::str::FromStr;
use std::time::Duration;

use ratatui::style::Color;

use crate::config;
use crate::visual::VisualizerConfig;

/// Load settings, falling back to defaults. The second value says why the
/// defaults were used; logging is not up yet, so the caller reports it.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                (
                    config::Settings::default(),
                    Some(format!("invalid config, using defaults: {msg}")),
                )
            } else {
                (s, None)
            }
        }
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

fn color_or(value: &str, fallback: Color) -> Color {
    Color::from_str(value).unwrap_or(fallback)
}

/// What each visualization handle is built with.
pub fn visualizer_config(settings: &config::Settings) -> VisualizerConfig {
    let vis = &settings.visualization;
    let defaults = VisualizerConfig::default();
    VisualizerConfig {
        wave_color: color_or(&vis.wave_color, defaults.wave_color),
        progress_color: color_or(&vis.progress_color, defaults.progress_color),
        cursor_color: color_or(&vis.cursor_color, defaults.cursor_color),
        bar_width: vis.bar_width.max(1),
        bar_gap: vis.bar_gap,
        tick_ms: vis.tick_ms.max(1),
        volume: settings.audio.volume,
    }
}

/// `None` when the timeout is turned off.
pub fn load_timeout(settings: &config::Settings) -> Option<Duration> {
    match settings.player.load_timeout_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    }
}
