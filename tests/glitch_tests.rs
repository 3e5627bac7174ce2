// Host-side tests for the glitch scheduler and film grain sampling.
// The main crate is wasm-only, so these drive the pure-Rust core directly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starfield_core::{
    FilmGrainConfig, GlitchController, GlitchState, GlitchTransition, Provider,
};

fn scheduled(interval_s: f32, duration_s: f32) -> FilmGrainConfig {
    FilmGrainConfig {
        glitch_interval_seconds: interval_s.into(),
        glitch_duration_seconds: duration_s.into(),
        ..FilmGrainConfig::constant()
    }
}

#[test]
fn burst_at_one_second_lasts_one_hundred_ms() {
    let mut cfg = scheduled(1.0, 0.1);
    let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(1));
    assert_eq!(g.update(999.0, &mut cfg), GlitchTransition::None);
    assert!(!g.is_active());

    assert_eq!(g.update(1000.0, &mut cfg), GlitchTransition::Started);
    assert_eq!(g.update(1050.0, &mut cfg), GlitchTransition::None);
    assert!(g.is_active());
    assert_eq!(g.elapsed_fraction(1050.0), Some(0.5));

    assert_eq!(g.update(1100.0, &mut cfg), GlitchTransition::Ended);
    assert_eq!(*g.state(), GlitchState::Idle);
    assert_eq!(g.elapsed_fraction(1100.0), None);
}

#[test]
fn sessions_never_overlap_under_hostile_providers() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut junk = StdRng::seed_from_u64(100);
    let mut cfg = FilmGrainConfig {
        glitch_interval_seconds: Provider::dynamic(move || match junk.gen_range(0..4) {
            0 => f32::NAN,
            1 => -3.0,
            _ => junk.gen_range(0.0..0.5),
        }),
        glitch_duration_seconds: Provider::uniform(-0.05, 0.2, StdRng::seed_from_u64(101)),
        ..FilmGrainConfig::constant()
    };
    let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(102));

    let mut now = 0.0;
    let mut current_end: Option<f64> = None;
    for _ in 0..5000 {
        now += rng.gen_range(0.0..40.0);
        let t = g.update(now, &mut cfg);
        match t {
            GlitchTransition::Started => assert!(current_end.is_none()),
            GlitchTransition::Restarted => assert!(current_end.is_some_and(|e| e <= now)),
            GlitchTransition::Ended => {
                assert!(current_end.is_some_and(|e| e <= now));
            }
            GlitchTransition::None => {}
        }
        current_end = match g.state() {
            GlitchState::Glitching(s) => {
                assert!(s.duration_ms >= 0.0);
                assert!((1..=5).contains(&s.band_count));
                assert!(g.next_at_ms() >= s.started_at_ms);
                Some(s.ends_at_ms())
            }
            GlitchState::Idle => None,
        };
        let f = g.elapsed_fraction(now);
        assert!(f.map_or(true, |f| (0.0..=1.0).contains(&f)));
        let u = cfg.sample(now, &g);
        assert_eq!(u.glitch_active == 1.0, g.is_active());
    }
}

#[test]
fn sample_reports_the_running_burst() {
    let mut cfg = scheduled(0.5, 0.2);
    let mut g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(5));
    g.update(500.0, &mut cfg);
    let u = cfg.sample(550.0, &g);
    let GlitchState::Glitching(s) = *g.state() else {
        panic!("expected an active burst");
    };
    assert_eq!(u.glitch_active, 1.0);
    assert_eq!(u.glitch_seed, s.seed);
    assert_eq!(u.glitch_count, s.band_count as f32);
    assert!((0.01..=0.02).contains(&u.chroma));
    assert!((u.time - 0.55).abs() < 1e-6);

    g.update(700.0, &mut cfg);
    let idle = cfg.sample(710.0, &g);
    assert_eq!(idle.glitch_active, 0.0);
    assert_eq!(idle.glitch_count, 0.0);
    assert!((idle.chroma - 0.0015).abs() < 1e-7);
}

#[test]
fn seeded_defaults_stay_in_their_ranges() {
    let mut cfg = FilmGrainConfig::seeded(42);
    let g = GlitchController::new(0.0, &mut cfg, StdRng::seed_from_u64(42));
    assert!((1000.0..=5000.0).contains(&g.next_at_ms()));
    for i in 0..200 {
        let u = cfg.sample(i as f64 * 16.0, &g);
        assert!((0.04..=0.08).contains(&u.noise_intensity));
        assert!((0.008..=0.02).contains(&u.glitch_strength));
        assert!((0.015..=0.06).contains(&u.glitch_band_height));
        assert!((0.7..=1.1).contains(&u.glitch_scroll_speed));
        assert_eq!(u.scanline_count, 720.0);
        assert_eq!(u.vignette, 0.5);
    }
}
