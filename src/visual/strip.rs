//! Terminal rendering of a handle's waveform strip.
//!
//! The strip is a row of evenly spaced bars: the played part takes the
//! progress color, the rest the wave color, and a cursor marks the playhead.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::types::VisualizerConfig;

const BAR: &str = "█";
const CURSOR: &str = "▌";

/// Draw the strip into `area`. `progress` is the played fraction (0.0..=1.0),
/// or `None` while nothing is loaded, which dims the bars and hides the cursor.
pub fn render_strip(
    progress: Option<f64>,
    config: &VisualizerConfig,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.is_empty() {
        return;
    }

    let step = config.bar_width.max(1) + config.bar_gap;
    let width = area.width as f64;
    let played_cols = progress.map(|p| (p.clamp(0.0, 1.0) * width).floor() as u16);
    let cursor_col = played_cols.map(|c| c.min(area.width - 1));

    for dx in 0..area.width {
        let is_bar = dx % step < config.bar_width.max(1);
        let is_cursor = cursor_col == Some(dx);
        if !is_bar && !is_cursor {
            continue;
        }

        let (symbol, color) = if is_cursor {
            (CURSOR, config.cursor_color)
        } else if played_cols.is_some_and(|played| dx < played) {
            (BAR, config.progress_color)
        } else {
            (BAR, config.wave_color)
        };

        for y in area.top()..area.bottom() {
            if let Some(cell) = buf.cell_mut((area.left() + dx, y)) {
                cell.set_symbol(symbol).set_fg(color);
                if progress.is_none() {
                    cell.modifier.insert(Modifier::DIM);
                }
            }
        }
    }
}

/// Played fraction from a position and an optional duration.
pub fn progress_of(position_secs: f64, duration_secs: Option<f64>) -> Option<f64> {
    match duration_secs {
        Some(total) if total > 0.0 => Some((position_secs / total).clamp(0.0, 1.0)),
        Some(_) => Some(0.0),
        None => None,
    }
}
