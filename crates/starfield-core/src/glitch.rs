//! Film grain parameters and the glitch-burst scheduler.
//!
//! [`GlitchController`] owns the Idle/Glitching state machine;
//! [`FilmGrainConfig`] owns one [`Provider`] per shader parameter and is
//! sampled once per frame into a [`FilmGrainUniforms`] block.

use crate::constants::*;
use crate::derive_rng;
use crate::provider::Provider;
use rand::rngs::StdRng;
use rand::Rng;

/// Chroma aberration bounds used while a glitch is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromaPulse {
    pub min: f32,
    pub max: f32,
    pub cycles: f32,
}

impl Default for ChromaPulse {
    fn default() -> Self {
        Self {
            min: CHROMA_PULSE_MIN,
            max: CHROMA_PULSE_MAX,
            cycles: CHROMA_PULSE_CYCLES,
        }
    }
}

impl ChromaPulse {
    /// Chroma amount at `fraction` (0..1) of the way through a glitch.
    pub fn at(&self, fraction: f32) -> f32 {
        let pulse = (fraction * std::f32::consts::PI * self.cycles).sin() * 0.5 + 0.5;
        self.min + (self.max - self.min) * pulse
    }
}

/// Every tunable of the film grain pass, each independently replaceable.
#[derive(Debug)]
pub struct FilmGrainConfig {
    pub noise_intensity: Provider,
    pub scanline_intensity: Provider,
    pub scanline_count: Provider,
    pub vignette: Provider,
    /// Chroma amount outside glitches.
    pub chroma: Provider,
    pub jitter: Provider,
    pub glitch_interval_seconds: Provider,
    pub glitch_duration_seconds: Provider,
    pub glitch_strength: Provider,
    pub glitch_band_height: Provider,
    pub glitch_scroll_speed: Provider,
    pub chroma_pulse: ChromaPulse,
}

impl FilmGrainConfig {
    /// Randomized defaults; each dynamic provider gets its own RNG stream.
    pub fn seeded(seed: u64) -> Self {
        let rng = |stream: u64| derive_rng(seed, 0x100 + stream);
        Self {
            noise_intensity: Provider::uniform(0.04, 0.08, rng(0)),
            scanline_intensity: Provider::constant(0.0),
            scanline_count: Provider::constant(720.0),
            vignette: Provider::constant(0.5),
            chroma: Provider::constant(CHROMA_IDLE),
            jitter: Provider::constant(0.0),
            glitch_interval_seconds: Provider::uniform(
                GLITCH_INTERVAL_MIN_SEC,
                GLITCH_INTERVAL_MAX_SEC,
                rng(1),
            ),
            glitch_duration_seconds: Provider::uniform(
                GLITCH_DURATION_MIN_SEC,
                GLITCH_DURATION_MAX_SEC,
                rng(2),
            ),
            glitch_strength: Provider::uniform(0.008, 0.02, rng(3)),
            glitch_band_height: Provider::uniform(0.015, 0.06, rng(4)),
            glitch_scroll_speed: Provider::uniform(0.7, 1.1, rng(5)),
            chroma_pulse: ChromaPulse::default(),
        }
    }

    /// Fixed values for every parameter (the pass's own baseline look).
    pub fn constant() -> Self {
        Self {
            noise_intensity: 0.15.into(),
            scanline_intensity: 0.08.into(),
            scanline_count: 800.0.into(),
            vignette: 0.4.into(),
            chroma: 0.0015.into(),
            jitter: 0.001.into(),
            glitch_interval_seconds: 5.0.into(),
            glitch_duration_seconds: 0.12.into(),
            glitch_strength: 0.02.into(),
            glitch_band_height: 0.01.into(),
            glitch_scroll_speed: 0.25.into(),
            chroma_pulse: ChromaPulse::default(),
        }
    }

    fn interval_ms(&mut self) -> f64 {
        self.glitch_interval_seconds.value_non_negative() as f64 * 1000.0
    }

    fn duration_ms(&mut self) -> f64 {
        self.glitch_duration_seconds.value_non_negative() as f64 * 1000.0
    }

    /// Evaluate every per-frame provider once and pack the uniform block.
    pub fn sample(&mut self, now_ms: f64, glitch: &GlitchController) -> FilmGrainUniforms {
        let idle_chroma = self.chroma.value();
        let chroma = glitch.chroma(now_ms, idle_chroma, &self.chroma_pulse);
        let (active, seed, count) = match glitch.state() {
            GlitchState::Glitching(s) => (1.0, s.seed, s.band_count as f32),
            GlitchState::Idle => (0.0, 0.0, 0.0),
        };
        FilmGrainUniforms {
            time: (now_ms * FILM_TIME_SCALE) as f32,
            noise_intensity: self.noise_intensity.value(),
            scanline_intensity: self.scanline_intensity.value(),
            scanline_count: self.scanline_count.value(),
            vignette: self.vignette.value(),
            chroma,
            jitter: self.jitter.value(),
            glitch_strength: self.glitch_strength.value(),
            glitch_band_height: self.glitch_band_height.value_non_negative(),
            glitch_active: active,
            glitch_seed: seed,
            glitch_scroll_speed: self.glitch_scroll_speed.value(),
            glitch_count: count,
            _pad: [0.0; 3],
        }
    }
}

impl Default for FilmGrainConfig {
    fn default() -> Self {
        Self::seeded(rand::random())
    }
}

/// Uniform block consumed by `film_grain.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FilmGrainUniforms {
    pub time: f32,
    pub noise_intensity: f32,
    pub scanline_intensity: f32,
    pub scanline_count: f32,
    pub vignette: f32,
    pub chroma: f32,
    pub jitter: f32,
    pub glitch_strength: f32,
    pub glitch_band_height: f32,
    pub glitch_active: f32,
    pub glitch_seed: f32,
    pub glitch_scroll_speed: f32,
    pub glitch_count: f32,
    pub _pad: [f32; 3],
}

/// One glitch burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchSession {
    pub started_at_ms: f64,
    pub duration_ms: f64,
    pub seed: f32,
    pub band_count: u32,
}

impl GlitchSession {
    pub fn ends_at_ms(&self) -> f64 {
        self.started_at_ms + self.duration_ms
    }

    /// Progress through the burst in `[0, 1]`; a zero-length burst is done.
    pub fn elapsed_fraction(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_at_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlitchState {
    Idle,
    Glitching(GlitchSession),
}

/// What happened during one [`GlitchController::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlitchTransition {
    None,
    Started,
    Ended,
    /// The previous burst ended and the next was already due.
    Restarted,
}

#[derive(Clone, Debug)]
pub struct GlitchController {
    state: GlitchState,
    next_at_ms: f64,
    rng: StdRng,
}

impl GlitchController {
    /// Schedule the first burst one interval after `now_ms`.
    pub fn new(now_ms: f64, config: &mut FilmGrainConfig, rng: StdRng) -> Self {
        let next_at_ms = now_ms + config.interval_ms();
        Self {
            state: GlitchState::Idle,
            next_at_ms,
            rng,
        }
    }

    pub fn state(&self) -> &GlitchState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GlitchState::Glitching(_))
    }

    pub fn next_at_ms(&self) -> f64 {
        self.next_at_ms
    }

    /// Elapsed fraction of the current burst, if any.
    pub fn elapsed_fraction(&self, now_ms: f64) -> Option<f32> {
        match &self.state {
            GlitchState::Glitching(s) => Some(s.elapsed_fraction(now_ms)),
            GlitchState::Idle => None,
        }
    }

    /// Chroma aberration for this frame: `idle` outside bursts, the pulse
    /// curve inside one.
    pub fn chroma(&self, now_ms: f64, idle: f32, pulse: &ChromaPulse) -> f32 {
        match self.elapsed_fraction(now_ms) {
            Some(fraction) => pulse.at(fraction),
            None => idle,
        }
    }

    /// Advance the state machine to `now_ms`.
    ///
    /// Activation triggers that arrive while a burst is running are held until
    /// it ends; sessions never overlap.
    pub fn update(&mut self, now_ms: f64, config: &mut FilmGrainConfig) -> GlitchTransition {
        let mut ended = false;
        if let GlitchState::Glitching(session) = self.state {
            if now_ms >= session.ends_at_ms() {
                self.state = GlitchState::Idle;
                ended = true;
                log::debug!("[glitch] end at {:.0}ms", now_ms);
            }
        }

        if matches!(self.state, GlitchState::Idle) && now_ms >= self.next_at_ms {
            let session = GlitchSession {
                started_at_ms: now_ms,
                duration_ms: config.duration_ms(),
                seed: self.rng.gen::<f32>() * GLITCH_SEED_RANGE,
                band_count: self.rng.gen_range(1..=GLITCH_MAX_BANDS),
            };
            self.next_at_ms = now_ms + config.interval_ms();
            self.state = GlitchState::Glitching(session);
            log::debug!(
                "[glitch] start at {:.0}ms for {:.0}ms, {} bands, next at {:.0}ms",
                now_ms,
                session.duration_ms,
                session.band_count,
                self.next_at_ms
            );
            return if ended {
                GlitchTransition::Restarted
            } else {
                GlitchTransition::Started
            };
        }

        if ended {
            GlitchTransition::Ended
        } else {
            GlitchTransition::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fixed(interval_s: f32, duration_s: f32) -> FilmGrainConfig {
        FilmGrainConfig {
            glitch_interval_seconds: interval_s.into(),
            glitch_duration_seconds: duration_s.into(),
            ..FilmGrainConfig::constant()
        }
    }

    #[test]
    fn burst_starts_and_ends_on_schedule() {
        let mut cfg = fixed(1.0, 0.1);
        let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(1));
        assert_eq!(g.next_at_ms(), 1000.0);
        assert_eq!(g.update(999.0, &mut cfg), GlitchTransition::None);
        assert_eq!(g.update(1000.0, &mut cfg), GlitchTransition::Started);
        assert_eq!(g.next_at_ms(), 2000.0);
        assert_eq!(g.elapsed_fraction(1050.0), Some(0.5));
        assert_eq!(g.update(1100.0, &mut cfg), GlitchTransition::Ended);
        assert!(!g.is_active());
    }

    #[test]
    fn band_count_and_seed_are_in_range() {
        let mut cfg = fixed(0.0, 0.0);
        let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(9));
        for i in 0..200 {
            g.update(i as f64, &mut cfg);
            if let GlitchState::Glitching(s) = g.state() {
                assert!((1..=5).contains(&s.band_count));
                assert!((0.0..1000.0).contains(&s.seed));
            }
        }
    }

    #[test]
    fn negative_timings_are_clamped() {
        let mut cfg = fixed(-3.0, -1.0);
        let mut g = GlitchController::new(500.0, &mut cfg, StdRng::seed_from_u64(2));
        assert_eq!(g.next_at_ms(), 500.0);
        g.update(500.0, &mut cfg);
        match g.state() {
            GlitchState::Glitching(s) => assert_eq!(s.duration_ms, 0.0),
            GlitchState::Idle => panic!("expected a burst"),
        }
    }

    #[test]
    fn due_trigger_waits_for_running_burst() {
        let mut cfg = fixed(0.05, 0.2);
        let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(4));
        assert_eq!(g.update(50.0, &mut cfg), GlitchTransition::Started);
        // next is due at 100ms but the burst runs until 250ms
        assert_eq!(g.update(120.0, &mut cfg), GlitchTransition::None);
        assert!(g.is_active());
        assert_eq!(g.update(250.0, &mut cfg), GlitchTransition::Restarted);
    }

    #[test]
    fn chroma_pulses_only_while_glitching() {
        let mut cfg = FilmGrainConfig {
            chroma: 0.0055.into(),
            ..fixed(1.0, 0.1)
        };
        let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(5));
        let idle = cfg.sample(10.0, &g);
        assert_eq!(idle.chroma, 0.0055);
        assert_eq!(idle.glitch_active, 0.0);

        g.update(1000.0, &mut cfg);
        let u = cfg.sample(1000.0, &g);
        assert_eq!(u.glitch_active, 1.0);
        assert!((u.chroma - 0.015).abs() < 1e-6, "sin(0) sits mid-range");
        for step in 0..=100 {
            let u = cfg.sample(1000.0 + step as f64, &g);
            assert!((0.01..=0.02).contains(&u.chroma));
        }
    }

    #[test]
    fn every_provider_is_called_once_per_sample() {
        use std::cell::Cell;
        use std::rc::Rc;
        let calls = Rc::new(Cell::new(0u32));
        let counting = || {
            let c = calls.clone();
            Provider::dynamic(move || {
                c.set(c.get() + 1);
                0.5
            })
        };
        let mut cfg = FilmGrainConfig {
            noise_intensity: counting(),
            scanline_intensity: counting(),
            scanline_count: counting(),
            vignette: counting(),
            chroma: counting(),
            jitter: counting(),
            glitch_strength: counting(),
            glitch_band_height: counting(),
            glitch_scroll_speed: counting(),
            ..fixed(10.0, 0.1)
        };
        let g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(6));
        cfg.sample(0.0, &g);
        assert_eq!(calls.get(), 9);
        cfg.sample(16.0, &g);
        assert_eq!(calls.get(), 18);
    }

    #[test]
    fn uniform_block_is_sixty_four_bytes() {
        assert_eq!(std::mem::size_of::<FilmGrainUniforms>(), 64);
    }
}
