// Host-side tests for the camera motion state machine.
// The main crate is wasm-only, so these drive the pure-Rust core directly.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starfield_core::constants::{DRAG_SENSITIVITY, EASING_FACTOR, TARGET_EPSILON};
use starfield_core::{CameraController, CameraMode, Rotation};
use std::f32::consts::FRAC_PI_2;

fn scripted() -> CameraController {
    CameraController::new(Rotation::new(0.0001, -0.00008), Vec3::ZERO)
}

#[test]
fn pitch_stays_clamped_under_random_input() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for run in 0..20 {
        let mut cam = CameraController::from_rng(&mut rng);
        let (mut x, mut y) = (0.0f32, 0.0f32);
        for _ in 0..2000 {
            match rng.gen_range(0..6) {
                0 => cam.pointer_down(x, y),
                1 | 2 => {
                    x += rng.gen_range(-2000.0..2000.0);
                    y += rng.gen_range(-8000.0..8000.0);
                    cam.pointer_move(x, y);
                }
                3 => cam.pointer_up(),
                4 => cam.wheel(rng.gen_range(-3000.0..3000.0)),
                _ => cam.update(),
            }
            let pitch = cam.rotation().pitch;
            assert!(
                (-FRAC_PI_2..=FRAC_PI_2).contains(&pitch),
                "run {run}: pitch {pitch}"
            );
            assert!((-FRAC_PI_2..=FRAC_PI_2).contains(&cam.target().pitch));
        }
    }
}

#[test]
fn zoom_converges_monotonically_within_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut cam = scripted();
    for _ in 0..50 {
        for _ in 0..rng.gen_range(1..5) {
            cam.wheel(rng.gen_range(-20_000.0..20_000.0));
        }
        let target = cam.zoom().target;
        assert!((100.0..=5000.0).contains(&target));
        let mut gap = (cam.zoom().distance - target).abs();
        for _ in 0..120 {
            cam.update();
            let z = cam.zoom();
            assert_eq!(z.target, target);
            assert!((100.0..=5000.0).contains(&z.distance), "{}", z.distance);
            let next_gap = (z.distance - target).abs();
            assert!(next_gap <= gap, "{next_gap} > {gap}");
            gap = next_gap;
        }
    }
}

#[test]
fn wheel_clamps_to_range() {
    let mut cam = scripted();
    cam.wheel(1.0e9);
    assert_eq!(cam.zoom().target, 5000.0);
    cam.wheel(-1.0e9);
    assert_eq!(cam.zoom().target, 100.0);
}

#[test]
fn drag_locks_direction_then_drifts() {
    let mut cam = scripted();
    cam.pointer_down(0.0, 0.0);
    cam.pointer_move(50.0, -20.0);
    cam.pointer_up();

    assert_eq!(cam.mode(), CameraMode::Completing);
    let locked = cam.locked_drift().expect("direction locked on release");
    assert_eq!(locked, Rotation::new(-0.0001, 0.00008));

    // Exponential approach: the larger axis gap shrinks by (1 - EASING_FACTOR)
    // per frame until it is inside TARGET_EPSILON; allow the other axis to
    // catch up for a couple of frames.
    let gap = 50.0 * DRAG_SENSITIVITY;
    let bound = ((TARGET_EPSILON / gap).ln() / (1.0 - EASING_FACTOR).ln()).ceil() as u32 + 2;
    let mut frames = 0;
    while cam.mode() != CameraMode::Autonomous {
        cam.update();
        frames += 1;
        assert!(frames <= bound, "still completing after {frames} frames (bound {bound})");
    }
    assert!(frames + 5 >= bound, "converged implausibly fast: {frames}");

    for _ in 0..10 {
        let before = cam.rotation();
        cam.update();
        let after = cam.rotation();
        assert!((after.pitch - before.pitch - locked.pitch).abs() < 1e-7);
        assert!((after.yaw - before.yaw - locked.yaw).abs() < 1e-7);
    }
}

#[test]
fn multi_touch_is_ignored() {
    let mut cam = scripted();
    cam.touch_start(2, 10.0, 10.0);
    assert_eq!(cam.mode(), CameraMode::Autonomous);
    cam.touch_start(1, 10.0, 10.0);
    cam.touch_move(2, 500.0, 500.0);
    assert_eq!(cam.target(), cam.rotation());
    cam.touch_move(1, 30.0, 10.0);
    assert!(cam.target().yaw > cam.rotation().yaw);
    cam.touch_end();
    assert_eq!(cam.mode(), CameraMode::Completing);
}
