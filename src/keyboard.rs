use ratatui::style::Color;

use crate::config::Config;
use crate::pitch::PlayState;
use crate::scale;

// ── Palette ───────────────────────────────────────────────────────────────────

const ACTIVE: Color = Color::Rgb(0x44, 0x44, 0xff);
const DISABLED: Color = Color::Rgb(0x00, 0x00, 0x22);
const CONTRAST_EVEN: Color = Color::Rgb(0x55, 0x55, 0x77);
const CONTRAST_ODD: Color = Color::Rgb(0x66, 0x66, 0x88);
const NORMAL_EVEN: Color = Color::Rgb(0x22, 0x22, 0x44);
const NORMAL_ODD: Color = Color::Rgb(0x33, 0x33, 0x55);
const POINTER_ACTIVE: Color = Color::Rgb(0xff, 0x44, 0x44);
const POINTER_IDLE: Color = Color::Rgb(0x88, 0x88, 0x88);

// ── Cell layout ───────────────────────────────────────────────────────────────

/// One keyboard cell, ready to fill: a horizontal span plus its color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyCell {
    pub x: f64,
    pub width: f64,
    pub color: Color,
}

/// Lay out the full keyboard band for the current viewport width.
///
/// Always 12 cells per configured octave — disabled notes are drawn in their
/// own shade rather than collapsed.  Pure function of its inputs, recomputed
/// from scratch every frame.  A degenerate octave range yields no cells.
pub fn cell_colors(width: f64, config: &Config, state: &PlayState) -> Vec<KeyCell> {
    let octaves = config.max_output_octave.saturating_sub(config.min_output_octave);
    if octaves <= 0 {
        return Vec::new();
    }
    let num_cells = octaves.saturating_mul(12) as usize;
    let cell_width = width / num_cells as f64;
    let base_semitone = config.min_output_octave.saturating_mul(12);

    let mut cells = Vec::with_capacity(num_cells);
    for i in 0..num_cells {
        let index_semitone = base_semitone.saturating_add(i as i32);
        let nearest = scale::nearest_in_scale(index_semitone, &config.scale);
        let enabled = index_semitone == nearest;
        let is_active = index_semitone == state.semitone;

        // Precedence: active note > disabled > octave band, each band with
        // its own alternating cell-parity pair.
        let color = if is_active {
            ACTIVE
        } else if !enabled {
            DISABLED
        } else if contrasted_octave(nearest) {
            if i % 2 == 0 { CONTRAST_EVEN } else { CONTRAST_ODD }
        } else if i % 2 == 0 {
            NORMAL_EVEN
        } else {
            NORMAL_ODD
        };

        cells.push(KeyCell { x: i as f64 * cell_width, width: cell_width, color });
    }
    cells
}

/// Alternate shading every other octave, octaves split between B and C.
/// `%` truncates toward zero, so the two sides of zero get their own anchor:
/// B (class 2) counting down for negatives, C (class 3) counting up for
/// non-negatives.  Each condition uses period 24 so a band spans one full
/// octave, and together they stay continuous across the B/C boundary.
fn contrasted_octave(semitone: i32) -> bool {
    // i64 keeps the offsets total over the whole i32 range.
    let from_c = semitone as i64 - 3;
    let from_b = semitone as i64 - 2;
    let below = from_b <= 0 && from_b % 24 <= -12;
    let above = from_c >= 0 && from_c % 24 <= 11;
    below || above
}

// ── Pointer marker ────────────────────────────────────────────────────────────

/// Marker drawn at the pointer location, colored by gesture state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMarker {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

pub fn pointer_marker(x: f64, y: f64, active: bool) -> PointerMarker {
    PointerMarker {
        x,
        y,
        color: if active { POINTER_ACTIVE } else { POINTER_IDLE },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> PlayState {
        // Park the voice far outside the drawn range so no cell is active.
        PlayState { semitone: 1000, ..PlayState::default() }
    }

    #[test]
    fn cell_count_matches_octave_range() {
        let config = Config::default(); // -3..3
        let cells = cell_colors(720.0, &config, &idle());
        assert_eq!(cells.len(), 72);
    }

    #[test]
    fn cells_tile_the_viewport_exactly() {
        let config = Config::default();
        let cells = cell_colors(777.0, &config, &idle());
        let mut expected_x = 0.0;
        let mut total = 0.0;
        for cell in &cells {
            assert!((cell.x - expected_x).abs() < 1e-9, "gap or overlap at {}", cell.x);
            expected_x = cell.x + cell.width;
            total += cell.width;
        }
        assert!((total - 777.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_octave_range_yields_no_cells() {
        let mut config = Config::default();
        config.min_output_octave = 1;
        config.max_output_octave = 1;
        assert!(cell_colors(100.0, &config, &idle()).is_empty());
        config.max_output_octave = 0;
        assert!(cell_colors(100.0, &config, &idle()).is_empty());
    }

    #[test]
    fn extreme_octave_bounds_do_not_break_the_layout() {
        let mut config = Config::default();
        config.min_output_octave = 200_000_000; // collapses against max = 3
        assert!(cell_colors(100.0, &config, &idle()).is_empty());

        config.min_output_octave = i32::MIN;
        config.max_output_octave = i32::MIN + 1;
        let cells = cell_colors(120.0, &config, &idle());
        assert_eq!(cells.len(), 12);
    }

    #[test]
    fn active_note_outranks_disabled_shade() {
        let mut config = Config::default();
        config.min_output_octave = 0;
        config.max_output_octave = 1;
        config.scale = [false; 12];
        config.scale[0] = true;
        // Semitone 5 is disabled, but it is the currently played cell.
        let state = PlayState { semitone: 5, ..PlayState::default() };
        let cells = cell_colors(120.0, &config, &state);
        assert_eq!(cells[5].color, ACTIVE);
        // Its disabled neighbors keep the disabled shade.
        assert_eq!(cells[4].color, DISABLED);
        assert_eq!(cells[6].color, DISABLED);
    }

    #[test]
    fn banding_flips_exactly_at_the_b_c_boundary() {
        // B4 = 2, C5 = 3: band edges sit between them, and each band spans a
        // full octave on either side.
        assert!(!contrasted_octave(2)); // B4
        assert!(contrasted_octave(3)); // C5
        assert!(contrasted_octave(14)); // B5, same band as C5
        assert!(!contrasted_octave(15)); // C6, next band
        assert!(!contrasted_octave(-9)); // C4, same band as B4
        assert!(contrasted_octave(-10)); // B3
        assert!(contrasted_octave(-21)); // C3, same band as B3
        assert!(!contrasted_octave(-22)); // B2
    }

    #[test]
    fn banding_alternates_whole_octaves() {
        // Every semitone within one band agrees with its band edge.
        for s in 3..=14 {
            assert!(contrasted_octave(s), "hole in band at {s}");
        }
        for s in -9..=2 {
            assert!(!contrasted_octave(s), "spill into band at {s}");
        }
        for s in -21..=-10 {
            assert!(contrasted_octave(s), "hole in band at {s}");
        }
    }

    #[test]
    fn adjacent_enabled_cells_use_parity_shades() {
        let mut config = Config::default();
        config.min_output_octave = 0;
        config.max_output_octave = 1;
        let cells = cell_colors(120.0, &config, &idle());
        // Semitones 0..=2 (A4..B4) share a band; their shades alternate.
        assert_eq!(cells[0].color, NORMAL_EVEN);
        assert_eq!(cells[1].color, NORMAL_ODD);
        assert_eq!(cells[2].color, NORMAL_EVEN);
        // Semitone 3 (C5) starts the contrasted band.
        assert_eq!(cells[3].color, CONTRAST_ODD);
        assert_eq!(cells[4].color, CONTRAST_EVEN);
    }

    #[test]
    fn disabled_cells_mask_their_band_shade() {
        let mut config = Config::default();
        config.min_output_octave = 0;
        config.max_output_octave = 1;
        config.scale = [false; 12];
        config.scale[0] = true;
        let cells = cell_colors(120.0, &config, &idle());
        // Only the A cell is enabled; everything else is the disabled shade.
        assert_eq!(cells[0].color, NORMAL_EVEN);
        for cell in &cells[1..] {
            assert_eq!(cell.color, DISABLED);
        }
    }

    #[test]
    fn pointer_marker_colors_follow_gesture() {
        assert_eq!(pointer_marker(3.0, 4.0, true).color, POINTER_ACTIVE);
        assert_eq!(pointer_marker(3.0, 4.0, false).color, POINTER_IDLE);
    }
}
