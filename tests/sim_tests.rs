// Host-side tests for the per-frame simulation tick.
// The main crate is wasm-only, so these drive the pure-Rust core directly.

use glam::Vec3;
use starfield_core::{
    CameraController, CameraMode, FilmGrainConfig, GlitchTransition, InputEvent, Rotation,
    SimulationState, Viewport,
};

fn sim() -> SimulationState {
    let camera = CameraController::new(Rotation::new(0.0001, -0.00008), Vec3::ZERO);
    SimulationState::with_camera(
        0.0,
        11,
        FilmGrainConfig::constant(),
        Viewport::new(800, 600).unwrap(),
        camera,
    )
}

#[test]
fn tick_advances_every_subsystem() {
    let mut s = sim();
    let f = s.tick(4000.0);
    assert!((f.nebula_time - 0.2).abs() < 1e-6);
    assert_eq!(f.glitch, GlitchTransition::None);
    assert_eq!(f.film_grain.glitch_active, 0.0);
    assert!((s.camera().rotation().pitch - 0.0001).abs() < 1e-9);

    // constant config schedules the first burst five seconds in
    let f = s.tick(5000.0);
    assert_eq!(f.glitch, GlitchTransition::Started);
    assert_eq!(f.film_grain.glitch_active, 1.0);
    assert_eq!(s.frame_count(), 2);
}

#[test]
fn shooting_stars_reach_the_frame() {
    let mut s = sim();
    let due = s.stars().next_spawn_at_ms();
    assert!(s.tick(due - 1.0).shooting_stars.is_empty());
    let f = s.tick(due);
    assert_eq!(f.shooting_stars.len(), 1);
    assert_eq!(s.stars().active().len(), 1);
}

#[test]
fn input_between_ticks_drives_the_camera() {
    let mut s = sim();
    s.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
    s.handle_input(InputEvent::PointerMove { x: 200.0, y: 0.0 });
    assert_eq!(s.camera().mode(), CameraMode::UserControlling);
    let f = s.tick(16.0);
    assert!(s.camera().rotation().yaw > 0.0);
    assert_eq!(f.eye, s.camera().eye());
    s.handle_input(InputEvent::PointerUp);
    assert_eq!(s.camera().mode(), CameraMode::Completing);
}

#[test]
fn frame_basis_is_orthonormal() {
    let mut s = sim();
    s.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
    s.handle_input(InputEvent::PointerMove { x: 300.0, y: -150.0 });
    for i in 0..30 {
        let f = s.tick(i as f64 * 16.0);
        assert!((f.camera_right.length() - 1.0).abs() < 1e-4);
        assert!((f.camera_up.length() - 1.0).abs() < 1e-4);
        assert!(f.camera_right.dot(f.camera_up).abs() < 1e-4);
        assert_eq!(f.view_proj, f.projection * f.view);
    }
}
