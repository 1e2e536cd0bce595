use crate::synth::WaveType;

// ── Scale + range ─────────────────────────────────────────────────────────────

/// Shared instrument configuration.  Owned by the `App`, written only by the
/// settings panel, and passed by reference into every pitch / render
/// operation — no ambient globals.
#[derive(Clone, Debug)]
pub struct Config {
    /// Lower octave bound; octave 0 contains semitone 0 = A4 (440 Hz).
    pub min_output_octave: i32,
    /// Upper octave bound, exclusive for the mapped range.
    pub max_output_octave: i32,
    /// Enabled pitch classes, indexed A, A#, B, C, C#, D, D#, E, F, F#, G, G#.
    /// Nothing forces at least one `true`; an all-off scale simply leaves
    /// quantization without effect.
    pub scale: [bool; 12],
    pub instrument: InstrumentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_output_octave: -3,
            max_output_octave: 3,
            scale: [true; 12],
            instrument: InstrumentConfig::default(),
        }
    }
}

// ── Instrument settings ───────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct InstrumentConfig {
    /// Glide time between notes while the gesture is held, seconds.
    pub portamento: f32,
    pub volume: f32,
    pub envelope: EnvelopeConfig,
    pub oscillator: WaveType,
    pub effect: EffectConfig,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            portamento: 0.06,
            volume: 0.5,
            envelope: EnvelopeConfig::default(),
            oscillator: WaveType::Triangle,
            effect: EffectConfig::default(),
        }
    }
}

/// ADSR amplitude envelope, all segment times in seconds.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.02,
            decay: 0.1,
            sustain: 0.8,
            release: 0.5,
        }
    }
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default)]
pub struct EffectConfig {
    pub delay: DelayConfig,
    pub reverb: ReverbConfig,
}

#[derive(Clone, Copy, Debug)]
pub struct DelayConfig {
    /// Delay time, seconds.
    pub time: f32,
    /// 0 to 1, portion of the delayed signal fed back into the line.
    pub feedback: f32,
    /// 0 = fully dry, 1 = fully delayed.
    pub dry_wet: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            time: 0.25,
            feedback: 0.5,
            dry_wet: 0.4,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReverbConfig {
    /// Time before the tail ramps in, seconds.
    pub pre_delay: f32,
    /// Tail length, seconds.
    pub decay: f32,
    /// Wet level added onto the dry path.
    pub dry_wet: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            pre_delay: 0.0,
            decay: 30.0,
            dry_wet: 1.0,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
