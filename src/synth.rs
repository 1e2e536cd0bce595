use std::f32::consts::PI;

use crate::config::{EffectConfig, InstrumentConfig};
use crate::effects::{EffectChain, FeedbackDelay, Reverb};

// ── Waveform ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaveType { Sine, Square, Sawtooth, Triangle }

impl WaveType {
    pub fn next(self) -> Self {
        match self {
            Self::Sine => Self::Square, Self::Square => Self::Sawtooth,
            Self::Sawtooth => Self::Triangle, Self::Triangle => Self::Sine,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Self::Sine => "Sine", Self::Square => "Square",
            Self::Sawtooth => "Sawtooth", Self::Triangle => "Triangle",
        }
    }
}

// ── ADSR envelope ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeStage { Attack, Decay, Sustain, Release, Off }

// ── Synth ─────────────────────────────────────────────────────────────────────

/// Monophonic glide voice.  The UI thread drives it through four entry
/// points (`trigger_on`, `trigger_off`, `glide_to`, `apply_settings`); the
/// audio callback pulls samples with `generate_sample`.
pub struct Synth {
    pub sample_rate: f32,
    pub wave_type: WaveType,
    pub volume: f32,
    pub attack:  f32,
    pub decay:   f32,
    pub sustain: f32,
    pub release: f32,

    pub frequency: f32,
    glide_target:    f32,
    glide_step:      f32,
    glide_remaining: u32,

    phase: f32,
    pub stage: EnvelopeStage,
    pub level: f32,
    release_level: f32,

    effect: EffectConfig,
    /// Insert effects applied to the voice output.
    pub fx: EffectChain,
}

impl Synth {
    pub fn new(sample_rate: f32) -> Self {
        let settings = InstrumentConfig::default();
        let mut fx = EffectChain::new();
        fx.effects.push(Box::new(FeedbackDelay::new(sample_rate)));
        fx.effects.push(Box::new(Reverb::new(sample_rate)));

        let mut synth = Self {
            sample_rate,
            wave_type: settings.oscillator,
            volume: settings.volume,
            attack: 0.0, decay: 0.0, sustain: 0.0, release: 0.0,
            frequency: 440.0,
            glide_target: 440.0,
            glide_step: 0.0,
            glide_remaining: 0,
            phase: 0.0,
            stage: EnvelopeStage::Off,
            level: 0.0,
            release_level: 0.0,
            effect: settings.effect,
            fx,
        };
        synth.apply_settings(&settings);
        synth
    }

    /// Called once the output device reports its real rate; resizes the
    /// effect buffers to match.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.fx.configure_all(&self.effect, sample_rate);
    }

    pub fn apply_settings(&mut self, settings: &InstrumentConfig) {
        self.wave_type = settings.oscillator;
        self.volume = settings.volume;
        self.attack = settings.envelope.attack;
        self.decay = settings.envelope.decay;
        self.sustain = settings.envelope.sustain;
        self.release = settings.envelope.release;
        self.effect = settings.effect;
        self.fx.configure_all(&self.effect, self.sample_rate);
    }

    /// Start sounding at `frequency`.  The envelope restarts from the
    /// current level, so re-pressing during the release tail does not click.
    pub fn trigger_on(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.glide_remaining = 0;
        self.stage = EnvelopeStage::Attack;
    }

    pub fn trigger_off(&mut self) {
        if self.stage != EnvelopeStage::Off {
            self.release_level = self.level;
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Linear per-sample frequency ramp to `frequency` over `seconds`.
    pub fn glide_to(&mut self, frequency: f32, seconds: f32) {
        let samples = (seconds * self.sample_rate) as u32;
        if samples == 0 {
            self.frequency = frequency;
            self.glide_remaining = 0;
            return;
        }
        self.glide_target = frequency;
        self.glide_step = (frequency - self.frequency) / samples as f32;
        self.glide_remaining = samples;
    }

    pub fn generate_sample(&mut self) -> f32 {
        if self.glide_remaining > 0 {
            self.frequency += self.glide_step;
            self.glide_remaining -= 1;
            if self.glide_remaining == 0 {
                self.frequency = self.glide_target;
            }
        }

        let dt = 1.0 / self.sample_rate;
        match self.stage {
            EnvelopeStage::Attack => {
                self.level += dt / self.attack;
                if self.level >= 1.0 { self.level = 1.0; self.stage = EnvelopeStage::Decay; }
            }
            EnvelopeStage::Decay => {
                self.level -= dt * (1.0 - self.sustain) / self.decay;
                if self.level <= self.sustain { self.level = self.sustain; self.stage = EnvelopeStage::Sustain; }
            }
            EnvelopeStage::Sustain => { self.level = self.sustain; }
            EnvelopeStage::Release => {
                self.level -= dt * self.release_level / self.release;
                if self.level <= 0.0 { self.level = 0.0; self.stage = EnvelopeStage::Off; }
            }
            // Keep feeding the effects so delay and reverb tails ring out.
            EnvelopeStage::Off => return self.fx.process(0.0).tanh(),
        }

        let sample = match self.wave_type {
            WaveType::Sine     => (self.phase * 2.0 * PI).sin(),
            WaveType::Square   => if (self.phase * 2.0 * PI).sin() >= 0.0 { 1.0 } else { -1.0 },
            WaveType::Sawtooth => 2.0 * self.phase - 1.0,
            WaveType::Triangle => {
                if self.phase < 0.5 { 4.0 * self.phase - 1.0 } else { 3.0 - 4.0 * self.phase }
            }
        };

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 { self.phase -= 1.0; }

        let dry = sample * self.level * self.volume;
        self.fx.process(dry).tanh()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvelopeConfig;

    fn quiet_synth(sample_rate: f32) -> Synth {
        let mut synth = Synth::new(sample_rate);
        // Strip the effect sends so envelope and glide behavior is observable
        // directly on the output.
        synth.fx = EffectChain::new();
        synth
    }

    #[test]
    fn glide_ramp_reaches_target_within_the_configured_time() {
        let mut synth = quiet_synth(1000.0);
        synth.trigger_on(440.0);
        synth.glide_to(880.0, 0.1); // 100 samples
        for _ in 0..50 {
            synth.generate_sample();
        }
        assert!(synth.frequency > 440.0 && synth.frequency < 880.0);
        for _ in 50..100 {
            synth.generate_sample();
        }
        assert!((synth.frequency - 880.0).abs() < 1e-3);
        // And it stays put afterwards.
        synth.generate_sample();
        assert!((synth.frequency - 880.0).abs() < 1e-3);
    }

    #[test]
    fn zero_length_glide_jumps_immediately() {
        let mut synth = quiet_synth(1000.0);
        synth.trigger_on(440.0);
        synth.glide_to(660.0, 0.0);
        assert_eq!(synth.frequency, 660.0);
    }

    #[test]
    fn envelope_walks_attack_decay_sustain() {
        let mut synth = quiet_synth(1000.0);
        let mut settings = InstrumentConfig::default();
        settings.envelope = EnvelopeConfig { attack: 0.02, decay: 0.01, sustain: 0.5, release: 0.1 };
        synth.apply_settings(&settings);

        synth.trigger_on(440.0);
        assert_eq!(synth.stage, EnvelopeStage::Attack);
        for _ in 0..20 {
            synth.generate_sample(); // 20 samples = full attack at 1 kHz
        }
        assert_eq!(synth.stage, EnvelopeStage::Decay);
        for _ in 0..10 {
            synth.generate_sample();
        }
        assert_eq!(synth.stage, EnvelopeStage::Sustain);
        assert!((synth.level - 0.5).abs() < 1e-6);
    }

    #[test]
    fn trigger_off_releases_to_silence() {
        let mut synth = quiet_synth(1000.0);
        let mut settings = InstrumentConfig::default();
        settings.envelope = EnvelopeConfig { attack: 0.001, decay: 0.001, sustain: 0.8, release: 0.05 };
        synth.apply_settings(&settings);

        synth.trigger_on(440.0);
        for _ in 0..100 {
            synth.generate_sample();
        }
        synth.trigger_off();
        assert_eq!(synth.stage, EnvelopeStage::Release);
        for _ in 0..100 {
            synth.generate_sample(); // 50 samples would do at 1 kHz
        }
        assert_eq!(synth.stage, EnvelopeStage::Off);
        assert_eq!(synth.generate_sample(), 0.0);
    }

    #[test]
    fn retrigger_keeps_the_current_level() {
        let mut synth = quiet_synth(1000.0);
        synth.trigger_on(440.0);
        for _ in 0..200 {
            synth.generate_sample();
        }
        synth.trigger_off();
        synth.generate_sample();
        let mid_release = synth.level;
        assert!(mid_release > 0.0);
        synth.trigger_on(550.0);
        assert_eq!(synth.stage, EnvelopeStage::Attack);
        assert!(synth.level >= mid_release - 1e-6);
    }

    #[test]
    fn output_is_soft_capped() {
        let mut synth = quiet_synth(1000.0);
        synth.volume = 10.0;
        synth.trigger_on(440.0);
        for _ in 0..1000 {
            let s = synth.generate_sample();
            assert!(s.abs() <= 1.0, "sample escaped the soft cap: {s}");
        }
    }
}
