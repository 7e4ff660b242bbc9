//! Color constants and chart helpers for the TUI.

use ratatui::style::Color;

/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Progress gauge fill.
pub const PROGRESS: Color = Color::Green;
/// Highlighted row.
pub const FOCUS: Color = Color::Yellow;
/// Enabled component or selected option.
pub const ON: Color = Color::Green;
/// Disabled component or hidden series.
pub const OFF: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Status line after an acknowledged submit.
pub const SAVED: Color = Color::Green;
/// Status line after a rejected submit.
pub const FAILED: Color = Color::Red;

/// Line colors for load series, reused in order.
const SERIES_COLORS: [Color; 4] = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Blue];

/// Color for the `idx`-th load series.
pub fn series_color(idx: usize) -> Color {
    SERIES_COLORS[idx % SERIES_COLORS.len()]
}

/// Computes Y-axis bounds from chart series with 10% padding.
pub fn auto_bounds_y<'a>(series: impl IntoIterator<Item = &'a [(f64, f64)]>) -> [f64; 2] {
    let (min, max) = series
        .into_iter()
        .flatten()
        .map(|&(_, y)| y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_around_data() {
        let a = [(0.0, 2.0), (1.0, 12.0)];
        let b = [(0.0, 4.0)];
        let [lo, hi] = auto_bounds_y([&a[..], &b[..]]);
        assert!((lo - 1.0).abs() < 1e-9);
        assert!((hi - 13.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_without_data_are_unit() {
        assert_eq!(auto_bounds_y(std::iter::empty()), [0.0, 1.0]);
    }
}
