use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::config::Config;
use crate::pitch::{self, PlayState};
use crate::scale;
use crate::synth::Synth;

const FALLBACK_RELEASE_THRESHOLD: Duration = Duration::from_millis(600);
const VOLUME_STEP: f32 = 0.05;
/// Octave bounds beyond this are clamped on commit; the semitone range must
/// stay far from i32 overflow for the mapping arithmetic.
const OCTAVE_LIMIT: i32 = 32;

// ── App mode ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    /// Pointer over the pad plays; arrows nudge the volume.
    Play,
    /// The settings panel has keyboard focus.
    Settings,
}

// ── Settings fields ───────────────────────────────────────────────────────────

/// One row of the settings panel.  Numeric fields edit as text and commit on
/// Enter; bool fields toggle; the oscillator cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    MinOctave,
    MaxOctave,
    PitchClass(usize),
    Portamento,
    Oscillator,
    Attack,
    Decay,
    Sustain,
    Release,
    DelayTime,
    DelayFeedback,
    DelayWet,
    ReverbPreDelay,
    ReverbDecay,
    ReverbWet,
}

impl Field {
    pub const COUNT: usize = 26;

    pub fn from_index(index: usize) -> Field {
        match index {
            0 => Self::MinOctave,
            1 => Self::MaxOctave,
            2..=13 => Self::PitchClass(index - 2),
            14 => Self::Portamento,
            15 => Self::Oscillator,
            16 => Self::Attack,
            17 => Self::Decay,
            18 => Self::Sustain,
            19 => Self::Release,
            20 => Self::DelayTime,
            21 => Self::DelayFeedback,
            22 => Self::DelayWet,
            23 => Self::ReverbPreDelay,
            24 => Self::ReverbDecay,
            _ => Self::ReverbWet,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::MinOctave => "Min octave".to_string(),
            Self::MaxOctave => "Max octave".to_string(),
            Self::PitchClass(i) => format!("Note {}", scale::PITCH_CLASS_NAMES[i]),
            Self::Portamento => "Portamento".to_string(),
            Self::Oscillator => "Oscillator".to_string(),
            Self::Attack => "Attack".to_string(),
            Self::Decay => "Decay".to_string(),
            Self::Sustain => "Sustain".to_string(),
            Self::Release => "Release".to_string(),
            Self::DelayTime => "Delay time".to_string(),
            Self::DelayFeedback => "Delay feedback".to_string(),
            Self::DelayWet => "Delay mix".to_string(),
            Self::ReverbPreDelay => "Rev pre-delay".to_string(),
            Self::ReverbDecay => "Rev decay".to_string(),
            Self::ReverbWet => "Rev mix".to_string(),
        }
    }

    /// Fields edited as text rather than toggled or cycled.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::PitchClass(_) | Self::Oscillator)
    }

    /// Does a commit need to be pushed down to the synthesizer?
    /// Octave bounds and the scale only affect the mapping layer.
    fn affects_instrument(self) -> bool {
        !matches!(self, Self::MinOctave | Self::MaxOctave | Self::PitchClass(_))
    }
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App {
    pub synth: Arc<Mutex<Synth>>,
    pub config: Config,
    pub state: PlayState,
    pub mode: AppMode,

    /// Last pointer position in screen coordinates.
    pub pointer: (u16, u16),
    /// Pad interior, recorded by the renderer each frame for hit-testing.
    pub pad_area: Rect,

    pub selected_field: usize,
    /// Text buffer while a numeric field is being edited.
    pub edit_buffer: Option<String>,

    space_held: bool,
    space_last_seen: Instant,
    pub status_msg: String,
}

impl App {
    pub fn new(synth: Arc<Mutex<Synth>>) -> Self {
        let config = Config::default();
        synth.lock().unwrap().apply_settings(&config.instrument);
        Self {
            synth,
            config,
            state: PlayState::default(),
            mode: AppMode::Play,
            pointer: (0, 0),
            pad_area: Rect::default(),
            selected_field: 0,
            edit_buffer: None,
            space_held: false,
            space_last_seen: Instant::now(),
            status_msg: String::new(),
        }
    }

    pub fn toggle_mode(&mut self) {
        self.cancel_edit();
        self.mode = match self.mode {
            AppMode::Play => AppMode::Settings,
            AppMode::Settings => AppMode::Play,
        };
        self.status_msg = match self.mode {
            AppMode::Play => "Focus: Pad".to_string(),
            AppMode::Settings => "Focus: Settings".to_string(),
        };
    }

    // ── Pointer / gesture handling ────────────────────────────────────────

    fn pad_contains(&self, column: u16, row: u16) -> bool {
        let pad = self.pad_area;
        column >= pad.x
            && column < pad.x + pad.width
            && row >= pad.y
            && row < pad.y + pad.height
    }

    /// Track the pointer; over the pad this retunes the voice, gliding if
    /// the gesture is held.
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        self.pointer = (column, row);
        if !self.pad_contains(column, row) {
            return;
        }
        let position = (column - self.pad_area.x) as f64;
        let width = self.pad_area.width as f64;
        let glide = self.config.instrument.portamento;
        if let Some(ev) = pitch::update_pitch(position, width, &self.config, &mut self.state, glide) {
            self.synth.lock().unwrap().glide_to(ev.frequency as f32, ev.seconds);
        }
    }

    pub fn pointer_down(&mut self, column: u16, row: u16) {
        if self.pad_contains(column, row) {
            self.pointer_moved(column, row);
            self.activate();
        }
    }

    pub fn pointer_up(&mut self) {
        self.deactivate();
    }

    fn activate(&mut self) {
        if self.state.active {
            return;
        }
        self.state.active = true;
        self.synth.lock().unwrap().trigger_on(self.state.frequency as f32);
    }

    fn deactivate(&mut self) {
        if !self.state.active {
            return;
        }
        self.state.active = false;
        self.synth.lock().unwrap().trigger_off();
    }

    // ── Space bar gesture ─────────────────────────────────────────────────

    pub fn space_press(&mut self) {
        if self.space_held {
            return;
        }
        self.space_held = true;
        self.activate();
    }

    pub fn space_release(&mut self) {
        if !self.space_held {
            return;
        }
        self.space_held = false;
        self.deactivate();
    }

    /// Terminals without key-release reporting deliver repeats instead;
    /// keep the gesture alive while they arrive.
    pub fn space_press_fallback(&mut self) {
        self.space_last_seen = Instant::now();
        if !self.space_held {
            self.space_held = true;
            self.activate();
        }
    }

    pub fn tick_fallback_release(&mut self) {
        if self.space_held
            && Instant::now().duration_since(self.space_last_seen) >= FALLBACK_RELEASE_THRESHOLD
        {
            self.space_release();
        }
    }

    pub fn release_all(&mut self) {
        self.space_held = false;
        self.deactivate();
    }

    // ── Play-mode controls ────────────────────────────────────────────────

    pub fn cycle_wave(&mut self) {
        self.config.instrument.oscillator = self.config.instrument.oscillator.next();
        self.apply_instrument();
        self.status_msg = format!("Wave: {}", self.config.instrument.oscillator.name());
    }

    pub fn volume_up(&mut self) {
        let v = (self.config.instrument.volume + VOLUME_STEP).min(1.0);
        self.config.instrument.volume = v;
        self.apply_instrument();
        self.status_msg = format!("Volume: {:.0}%", v * 100.0);
    }

    pub fn volume_down(&mut self) {
        let v = (self.config.instrument.volume - VOLUME_STEP).max(0.0);
        self.config.instrument.volume = v;
        self.apply_instrument();
        self.status_msg = format!("Volume: {:.0}%", v * 100.0);
    }

    fn apply_instrument(&mut self) {
        self.synth.lock().unwrap().apply_settings(&self.config.instrument);
    }

    // ── Settings panel ────────────────────────────────────────────────────

    pub fn selected(&self) -> Field {
        Field::from_index(self.selected_field)
    }

    pub fn field_up(&mut self) {
        self.cancel_edit();
        self.selected_field =
            if self.selected_field == 0 { Field::COUNT - 1 } else { self.selected_field - 1 };
    }

    pub fn field_down(&mut self) {
        self.cancel_edit();
        self.selected_field = (self.selected_field + 1) % Field::COUNT;
    }

    /// Enter on the selected field: toggle / cycle, or begin / commit a
    /// numeric edit.
    pub fn confirm_field(&mut self) {
        match self.selected() {
            Field::PitchClass(i) => {
                self.config.scale[i] = !self.config.scale[i];
                self.status_msg = format!(
                    "Note {}: {}",
                    scale::PITCH_CLASS_NAMES[i],
                    if self.config.scale[i] { "on" } else { "off" }
                );
            }
            Field::Oscillator => self.cycle_wave(),
            field => {
                if self.edit_buffer.is_some() {
                    self.commit_edit();
                } else {
                    self.edit_buffer = Some(self.field_value(field));
                }
            }
        }
    }

    /// Append a character to the edit buffer, starting an edit if one is not
    /// running.  Only characters that can appear in a number are accepted.
    pub fn input_char(&mut self, c: char) {
        if !self.selected().is_numeric() {
            return;
        }
        if !(c.is_ascii_digit() || c == '.' || c == '-') {
            return;
        }
        self.edit_buffer.get_or_insert_with(String::new).push(c);
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = &mut self.edit_buffer {
            buf.pop();
        }
    }

    /// Returns true when an edit was actually discarded.
    pub fn cancel_edit(&mut self) -> bool {
        self.edit_buffer.take().is_some()
    }

    /// Parse and store the edit buffer.  Input that fails to parse is
    /// ignored and the previous value stays in place; values outside a
    /// field's supported range are clamped into it.
    pub fn commit_edit(&mut self) {
        let Some(text) = self.edit_buffer.take() else { return };
        let text = text.trim();
        let field = self.selected();
        match field {
            Field::MinOctave => {
                if let Ok(v) = text.parse::<i32>() {
                    self.config.min_output_octave = v.clamp(-OCTAVE_LIMIT, OCTAVE_LIMIT);
                }
            }
            Field::MaxOctave => {
                if let Ok(v) = text.parse::<i32>() {
                    self.config.max_output_octave = v.clamp(-OCTAVE_LIMIT, OCTAVE_LIMIT);
                }
            }
            Field::Portamento => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.portamento = v.max(0.0);
                }
            }
            Field::Attack => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.envelope.attack = v.max(0.0);
                }
            }
            Field::Decay => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.envelope.decay = v.max(0.0);
                }
            }
            Field::Sustain => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.envelope.sustain = v.clamp(0.0, 1.0);
                }
            }
            Field::Release => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.envelope.release = v.max(0.0);
                }
            }
            Field::DelayTime => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.effect.delay.time = v.max(0.0);
                }
            }
            Field::DelayFeedback => {
                if let Ok(v) = text.parse() { self.config.instrument.effect.delay.feedback = v; }
            }
            Field::DelayWet => {
                if let Ok(v) = text.parse() { self.config.instrument.effect.delay.dry_wet = v; }
            }
            Field::ReverbPreDelay => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.effect.reverb.pre_delay = v.max(0.0);
                }
            }
            Field::ReverbDecay => {
                if let Ok(v) = text.parse::<f32>() {
                    self.config.instrument.effect.reverb.decay = v.max(0.0);
                }
            }
            Field::ReverbWet => {
                if let Ok(v) = text.parse() { self.config.instrument.effect.reverb.dry_wet = v; }
            }
            Field::PitchClass(_) | Field::Oscillator => {}
        }
        if field.affects_instrument() {
            self.apply_instrument();
        }
        self.status_msg = format!("{}: {}", field.label(), self.field_value(field));
    }

    /// Current value of a field, as shown (and as prefilled when editing).
    pub fn field_value(&self, field: Field) -> String {
        let inst = &self.config.instrument;
        match field {
            Field::MinOctave => self.config.min_output_octave.to_string(),
            Field::MaxOctave => self.config.max_output_octave.to_string(),
            Field::PitchClass(i) => {
                if self.config.scale[i] { "on".to_string() } else { "off".to_string() }
            }
            Field::Portamento => inst.portamento.to_string(),
            Field::Oscillator => inst.oscillator.name().to_string(),
            Field::Attack => inst.envelope.attack.to_string(),
            Field::Decay => inst.envelope.decay.to_string(),
            Field::Sustain => inst.envelope.sustain.to_string(),
            Field::Release => inst.envelope.release.to_string(),
            Field::DelayTime => inst.effect.delay.time.to_string(),
            Field::DelayFeedback => inst.effect.delay.feedback.to_string(),
            Field::DelayWet => inst.effect.delay.dry_wet.to_string(),
            Field::ReverbPreDelay => inst.effect.reverb.pre_delay.to_string(),
            Field::ReverbDecay => inst.effect.reverb.decay.to_string(),
            Field::ReverbWet => inst.effect.reverb.dry_wet.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
