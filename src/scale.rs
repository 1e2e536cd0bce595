// ── Pitch classes ─────────────────────────────────────────────────────────────

/// Pitch class names, indexed the same way as `Config::scale`.
/// Semitone 0 = A4 (440 Hz), so the cycle starts at A.
pub const PITCH_CLASS_NAMES: [&str; 12] =
    ["A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#"];

/// Normalize any signed semitone to its pitch class in [0, 11].
/// `%` truncates toward zero, so the negative side needs the `+ 12` fixup.
pub fn pitch_class(semitone: i32) -> usize {
    (((semitone % 12) + 12) % 12) as usize
}

// ── Quantizer ─────────────────────────────────────────────────────────────────

/// Snap `semitone` to the nearest semitone whose pitch class is enabled.
///
/// The search alternates left then right at each growing distance, so on a
/// tie the lower neighbor wins.  It stays inside the [0, 11] pitch-class
/// window and never wraps past A or G#: a disabled class near a window edge
/// may resolve to a far neighbor on its own side even when a closer one
/// exists across the octave boundary.  When nothing is reachable (an
/// all-off scale), the input comes back unchanged.
pub fn nearest_in_scale(semitone: i32, scale: &[bool; 12]) -> i32 {
    let class = pitch_class(semitone) as i32;
    if scale[class as usize] {
        return semitone;
    }
    for distance in 1..12 {
        let left = class - distance;
        if left >= 0 && scale[left as usize] {
            return semitone.saturating_sub(distance);
        }
        let right = class + distance;
        if right <= 11 && scale[right as usize] {
            return semitone.saturating_add(distance);
        }
    }
    semitone
}

/// Display name for a semitone, e.g. 0 → "A4", 3 → "C5", -12 → "A3".
/// The scientific octave number increments at C, three semitones above A.
pub fn note_name(semitone: i32) -> String {
    let octave = 5 + (semitone - 3).div_euclid(12);
    format!("{}{}", PITCH_CLASS_NAMES[pitch_class(semitone)], octave)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn only(classes: &[usize]) -> [bool; 12] {
        let mut scale = [false; 12];
        for &c in classes {
            scale[c] = true;
        }
        scale
    }

    #[test]
    fn pitch_class_is_total_over_negatives() {
        assert_eq!(pitch_class(0), 0);
        assert_eq!(pitch_class(11), 11);
        assert_eq!(pitch_class(12), 0);
        assert_eq!(pitch_class(-1), 11);
        assert_eq!(pitch_class(-12), 0);
        assert_eq!(pitch_class(-13), 11);
    }

    #[test]
    fn enabled_semitones_pass_through_unchanged() {
        let scale = [true; 12];
        for s in -48..=48 {
            assert_eq!(nearest_in_scale(s, &scale), s);
        }
    }

    #[test]
    fn quantizing_is_idempotent() {
        let configs = [
            only(&[0]),
            only(&[0, 3, 7]),
            only(&[11]),
            only(&[2, 5, 9]),
            [false; 12],
        ];
        for scale in &configs {
            for s in -48..=48 {
                let once = nearest_in_scale(s, scale);
                assert_eq!(
                    nearest_in_scale(once, scale),
                    once,
                    "not idempotent for semitone {s}"
                );
            }
        }
    }

    #[test]
    fn result_is_enabled_when_reachable() {
        let scale = only(&[0, 3, 7]);
        for s in -48..=48 {
            let q = nearest_in_scale(s, &scale);
            assert!(scale[pitch_class(q)], "semitone {s} resolved to disabled {q}");
        }
    }

    #[test]
    fn left_wins_on_equal_distance() {
        // Class 5 disabled, classes 3 and 7 both at distance 2.
        let scale = only(&[3, 7]);
        assert_eq!(nearest_in_scale(5, &scale), 3);
        assert_eq!(nearest_in_scale(5 - 12, &scale), 3 - 12);
    }

    #[test]
    fn search_does_not_wrap_past_window_edges() {
        // Class 0 with only class 11 enabled: the one-step wrap downward is
        // out of bounds, so the match is found 11 steps up instead.
        let scale = only(&[11]);
        assert_eq!(nearest_in_scale(0, &scale), 11);
        assert_eq!(nearest_in_scale(-12, &scale), -1);
        // Mirror case at the top of the window.
        let scale = only(&[0]);
        assert_eq!(nearest_in_scale(11, &scale), 0);
    }

    #[test]
    fn only_a_enabled_pulls_d_down_to_a() {
        // Class 5 (D) with only class 0 (A) enabled: distance 5 to the left,
        // no enabled candidate to the right inside the window.
        let scale = only(&[0]);
        assert_eq!(nearest_in_scale(5, &scale), 0);
    }

    #[test]
    fn all_off_scale_is_identity() {
        let scale = [false; 12];
        for s in -48..=48 {
            assert_eq!(nearest_in_scale(s, &scale), s);
        }
    }

    #[test]
    fn note_names_track_the_c_octave_break() {
        assert_eq!(note_name(0), "A4");
        assert_eq!(note_name(2), "B4");
        assert_eq!(note_name(3), "C5");
        assert_eq!(note_name(12), "A5");
        assert_eq!(note_name(-12), "A3");
        assert_eq!(note_name(-9), "C4");
        assert_eq!(note_name(-10), "B3");
    }
}
