use crate::config::Config;
use crate::scale;

// ── Play state ────────────────────────────────────────────────────────────────

/// The single playing voice as the rest of the program sees it.  Mutated by
/// pointer and key handlers, read by every render tick and by the synth
/// glue — never by the pure mapping functions below.
#[derive(Clone, Copy, Debug)]
pub struct PlayState {
    /// Current semitone relative to A4 = 0.
    pub semitone: i32,
    /// Frequency derived from `semitone`, Hz.
    pub frequency: f64,
    /// True while the trigger gesture (mouse button or space) is held.
    pub active: bool,
}

impl Default for PlayState {
    fn default() -> Self {
        Self { semitone: 0, frequency: 440.0, active: false }
    }
}

/// Portamento request produced by a pitch change while the gesture is held.
/// The caller forwards it to the synthesizer; the computation itself stays
/// side-effect free.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlideEvent {
    pub frequency: f64,
    pub seconds: f32,
}

// ── Mapping ───────────────────────────────────────────────────────────────────

/// Equal temperament around A4 = 440 Hz.
pub fn semitone_to_frequency(semitone: i32) -> f64 {
    440.0 * (semitone as f64 / 12.0).exp2()
}

/// Map a horizontal position in `[0, width)` onto the configured semitone
/// range `[min*12, max*12)`, floor to an integer, then snap to the enabled
/// scale.  The interval is half open: the rightmost pixel lands just below
/// the upper bound.  A zero-width viewport or an empty octave range has no
/// addressable span and clamps to the minimum bound.
pub fn position_to_semitone(position: f64, width: f64, config: &Config) -> i32 {
    // Saturating so that out-of-range octave bounds cannot overflow the
    // semitone arithmetic.
    let min = config.min_output_octave.saturating_mul(12);
    let max = config.max_output_octave.saturating_mul(12);
    if width <= 0.0 || max <= min {
        return min;
    }
    let raw = (min as f64 + (max as f64 - min as f64) * position / width).floor() as i32;
    scale::nearest_in_scale(raw, &config.scale)
}

/// Recompute the semitone for `position` and fold it into `state`.  Returns
/// a glide request when the note changed while the gesture is held; an
/// unchanged note or an idle gesture produces nothing.
pub fn update_pitch(
    position: f64,
    width: f64,
    config: &Config,
    state: &mut PlayState,
    glide_seconds: f32,
) -> Option<GlideEvent> {
    let semitone = position_to_semitone(position, width, config);
    if semitone == state.semitone {
        return None;
    }
    state.semitone = semitone;
    state.frequency = semitone_to_frequency(semitone);
    state
        .active
        .then(|| GlideEvent { frequency: state.frequency, seconds: glide_seconds })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-9
    }

    #[test]
    fn reference_frequencies() {
        assert!(close(semitone_to_frequency(0), 440.0));
        assert!(close(semitone_to_frequency(12), 880.0));
        assert!(close(semitone_to_frequency(-12), 220.0));
        assert!(close(semitone_to_frequency(24), 1760.0));
    }

    #[test]
    fn leftmost_position_maps_to_minimum_bound() {
        let config = Config::default(); // octaves -3..3, all classes enabled
        assert_eq!(position_to_semitone(0.0, 800.0, &config), -36);
    }

    #[test]
    fn rightmost_position_stays_below_upper_bound() {
        let config = Config::default();
        let s = position_to_semitone(799.0, 800.0, &config);
        assert!(s < 36, "half-open interval breached: {s}");
        assert!(s >= 0);
    }

    #[test]
    fn interpolation_floors_at_cell_boundaries() {
        let mut config = Config::default();
        config.min_output_octave = 0;
        config.max_output_octave = 1;
        // 12 semitones over 120 units: each semitone spans 10 units.
        assert_eq!(position_to_semitone(0.0, 120.0, &config), 0);
        assert_eq!(position_to_semitone(9.9, 120.0, &config), 0);
        assert_eq!(position_to_semitone(10.0, 120.0, &config), 1);
        assert_eq!(position_to_semitone(119.0, 120.0, &config), 11);
    }

    #[test]
    fn degenerate_ranges_clamp_to_minimum() {
        let config = Config::default();
        assert_eq!(position_to_semitone(100.0, 0.0, &config), -36);

        let mut flat = Config::default();
        flat.min_output_octave = 2;
        flat.max_output_octave = 2;
        assert_eq!(position_to_semitone(50.0, 100.0, &flat), 24);
        flat.max_output_octave = 1;
        assert_eq!(position_to_semitone(50.0, 100.0, &flat), 24);
    }

    #[test]
    fn mapping_composes_with_quantization() {
        let mut config = Config::default();
        config.min_output_octave = 0;
        config.max_output_octave = 1;
        config.scale = [false; 12];
        config.scale[0] = true;
        // Raw semitone 5 (D) snaps down to 0 (A).
        assert_eq!(position_to_semitone(50.0, 120.0, &config), 0);
    }

    #[test]
    fn extreme_octave_bounds_saturate_instead_of_overflowing() {
        let mut config = Config::default();
        config.min_output_octave = 200_000_000;
        // The semitone range saturates and collapses to a degenerate span.
        assert_eq!(position_to_semitone(0.0, 100.0, &config), i32::MAX);

        config.min_output_octave = -200_000_000;
        config.max_output_octave = 200_000_000;
        assert_eq!(position_to_semitone(50.0, 100.0, &config), -1);
    }

    #[test]
    fn update_is_silent_when_inactive() {
        let config = Config::default();
        let mut state = PlayState::default();
        let ev = update_pitch(600.0, 800.0, &config, &mut state, 0.06);
        assert_eq!(ev, None);
        // State still tracks the pointer even without a glide.
        assert_eq!(state.semitone, 18);
    }

    #[test]
    fn update_is_silent_when_note_is_unchanged() {
        let config = Config::default();
        let mut state = PlayState { active: true, ..PlayState::default() };
        let first = update_pitch(400.0, 800.0, &config, &mut state, 0.06);
        assert!(first.is_some());
        let again = update_pitch(400.0, 800.0, &config, &mut state, 0.06);
        assert_eq!(again, None);
    }

    #[test]
    fn update_glides_on_change_while_active() {
        let config = Config::default();
        let mut state = PlayState { active: true, ..PlayState::default() };
        let ev = update_pitch(799.0, 800.0, &config, &mut state, 0.25)
            .expect("pitch change while active must glide");
        assert!(close(ev.frequency, state.frequency));
        assert!((ev.seconds - 0.25).abs() < f32::EPSILON);
    }
}
