use crate::config::EffectConfig;

/// Mono audio effect: one sample in, one sample out.
///
/// All implementations must be `Send` so they can live inside the audio thread
/// (behind `Arc<Mutex<Synth>>`).
pub trait AudioEffect: Send {
    fn process(&mut self, sample: f32) -> f32;
    fn name(&self) -> &'static str;
    /// Reset all internal state (clear delay lines, reset filters).
    fn reset(&mut self);
    /// Re-read this effect's parameters from the shared effect settings.
    /// Buffers are resized only when the timing parameters actually change,
    /// so a settings commit does not cut running tails short.
    fn configure(&mut self, settings: &EffectConfig, sample_rate: f32);
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// A serial chain of effects applied to a mono signal.
///
/// When the chain is empty the audio passes through completely unchanged.
pub struct EffectChain {
    pub effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self { effects: Vec::new() }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        if self.effects.is_empty() {
            return sample;
        }
        self.effects.iter_mut().fold(sample, |s, fx| fx.process(s))
    }

    pub fn configure_all(&mut self, settings: &EffectConfig, sample_rate: f32) {
        for fx in &mut self.effects {
            fx.configure(settings, sample_rate);
        }
    }

    #[allow(dead_code)]
    pub fn reset_all(&mut self) {
        for fx in &mut self.effects {
            fx.reset();
        }
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

// ── Feedback delay ────────────────────────────────────────────────────────────

/// Single-tap delay line with feedback and a dry/wet crossfade.
pub struct FeedbackDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    feedback: f32,
    wet: f32,
}

impl FeedbackDelay {
    pub fn new(sample_rate: f32) -> Self {
        let mut fx = Self {
            buffer: vec![0.0; 2],
            write_pos: 0,
            delay_samples: 1,
            feedback: 0.0,
            wet: 0.0,
        };
        fx.configure(&EffectConfig::default(), sample_rate);
        fx
    }
}

impl AudioEffect for FeedbackDelay {
    fn process(&mut self, sample: f32) -> f32 {
        let len = self.buffer.len();
        let read_pos = (self.write_pos + len - self.delay_samples) % len;
        let delayed = self.buffer[read_pos];
        self.buffer[self.write_pos] = sample + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % len;
        sample * (1.0 - self.wet) + delayed * self.wet
    }

    fn name(&self) -> &'static str {
        "Feedback Delay"
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    fn configure(&mut self, settings: &EffectConfig, sample_rate: f32) {
        let delay = &settings.delay;
        let samples = ((delay.time * sample_rate) as usize).max(1);
        if samples != self.delay_samples || samples + 1 != self.buffer.len() {
            self.buffer = vec![0.0; samples + 1];
            self.write_pos = 0;
            self.delay_samples = samples;
        }
        self.feedback = delay.feedback.clamp(0.0, 0.95);
        self.wet = delay.dry_wet.clamp(0.0, 1.0);
    }
}

// ── Reverb ────────────────────────────────────────────────────────────────────

// Schroeder tunings in samples at 44.1 kHz, scaled to the actual rate.
const COMB_TUNINGS: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNINGS: [usize; 2] = [556, 441];
const INPUT_GAIN: f32 = 0.015;

struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
}

impl Comb {
    fn new(size: usize) -> Self {
        Self { buffer: vec![0.0; size.max(1)], pos: 0, feedback: 0.0 }
    }

    fn process(&mut self, input: f32) -> f32 {
        let out = self.buffer[self.pos];
        self.buffer[self.pos] = input + out * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(size: usize) -> Self {
        Self { buffer: vec![0.0; size.max(1)], pos: 0 }
    }

    fn process(&mut self, input: f32) -> f32 {
        let buf_out = self.buffer[self.pos];
        let output = buf_out - input;
        self.buffer[self.pos] = input + buf_out * 0.5;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// Schroeder reverb: pre-delay, parallel combs, serial allpasses.  Comb
/// feedback follows the RT60 relation for the configured decay time.  The
/// wet tail is added onto the dry path rather than crossfaded, so a wet
/// level of 1.0 keeps the instrument itself fully audible.
pub struct Reverb {
    sample_rate: f32,
    pre: Vec<f32>,
    pre_pos: usize,
    pre_samples: usize,
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
    wet: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let mut fx = Self {
            sample_rate: 0.0,
            pre: vec![0.0; 1],
            pre_pos: 0,
            pre_samples: 0,
            combs: Vec::new(),
            allpasses: Vec::new(),
            wet: 0.0,
        };
        fx.configure(&EffectConfig::default(), sample_rate);
        fx
    }
}

impl AudioEffect for Reverb {
    fn process(&mut self, sample: f32) -> f32 {
        let input = if self.pre_samples == 0 {
            sample
        } else {
            let len = self.pre.len();
            let read_pos = (self.pre_pos + len - self.pre_samples) % len;
            let delayed = self.pre[read_pos];
            self.pre[self.pre_pos] = sample;
            self.pre_pos = (self.pre_pos + 1) % len;
            delayed
        };

        let attenuated = input * INPUT_GAIN;
        let mut tail = 0.0;
        for comb in &mut self.combs {
            tail += comb.process(attenuated);
        }
        for allpass in &mut self.allpasses {
            tail = allpass.process(tail);
        }

        sample + tail * self.wet
    }

    fn name(&self) -> &'static str {
        "Reverb"
    }

    fn reset(&mut self) {
        self.pre.fill(0.0);
        self.pre_pos = 0;
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }

    fn configure(&mut self, settings: &EffectConfig, sample_rate: f32) {
        let reverb = &settings.reverb;

        if sample_rate != self.sample_rate {
            let scale = sample_rate / 44100.0;
            self.combs = COMB_TUNINGS
                .iter()
                .map(|&size| Comb::new((size as f32 * scale) as usize))
                .collect();
            self.allpasses = ALLPASS_TUNINGS
                .iter()
                .map(|&size| Allpass::new((size as f32 * scale) as usize))
                .collect();
            self.sample_rate = sample_rate;
        }

        let pre_samples = (reverb.pre_delay.max(0.0) * sample_rate) as usize;
        if pre_samples != self.pre_samples {
            self.pre = vec![0.0; pre_samples.max(1) + 1];
            self.pre_pos = 0;
            self.pre_samples = pre_samples;
        }

        // Feedback for a 60 dB decay over `reverb.decay` seconds, capped
        // below the point where the comb bank stops converging.
        for comb in &mut self.combs {
            let loop_secs = comb.buffer.len() as f32 / sample_rate;
            comb.feedback = if reverb.decay > 0.0 {
                0.001f32.powf(loop_secs / reverb.decay).min(0.98)
            } else {
                0.0
            };
        }

        self.wet = reverb.dry_wet.max(0.0);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
